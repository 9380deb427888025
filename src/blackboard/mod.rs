//! The Blackboard (§3–§6): the shared fact database every reasoning module
//! reads from and writes to.
//!
//! Split the way the spec's component table breaks the core down:
//! `term_table` owns the indexed-term registry (§4.2), `tracker` owns the
//! per-subscriber update sets (§4.6), `assert` owns the assertion engine
//! (§4.4), and `query` owns the query engine (§4.3, §4.5). This module ties
//! them together behind the single `Blackboard` struct and exposes the
//! public facade of §6.

mod assert;
mod query;
mod term_table;
mod tracker;

pub use tracker::UpdateKey;

use crate::error::{PolyaError, PolyaResult};
use crate::geometry::Halfplane;
use crate::rational::Rat;
use crate::term::comparison::{Clause, Comp, Literal, TermComparison};
use crate::term::term::Term;
use ahash::{AHashMap, AHashSet};
use num_traits::Zero;
use smallvec::SmallVec;
use tracker::Tracker;

/// The shared fact database (§3). One instance per problem; owns every
/// indexed term and every comparison known between them.
pub struct Blackboard {
    pub(crate) num_terms: usize,
    pub(crate) term_defs: Vec<Term>,
    pub(crate) terms: Vec<Term>,
    pub(crate) term_names: AHashMap<String, usize>,

    pub(crate) zero_inequalities: AHashMap<usize, Comp>,
    pub(crate) zero_equalities: AHashSet<usize>,
    pub(crate) zero_disequalities: AHashSet<usize>,
    pub(crate) equalities: AHashMap<(usize, usize), Rat>,
    pub(crate) inequalities: AHashMap<(usize, usize), SmallVec<[Halfplane; 2]>>,
    pub(crate) disequalities: AHashMap<(usize, usize), AHashSet<Rat>>,
    pub(crate) clauses: Vec<Clause>,

    tracker: Tracker,
}

impl Default for Blackboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Blackboard {
    /// A fresh Blackboard with just index 0 (the constant `1`) registered,
    /// known positive.
    pub fn new() -> Self {
        let mut term_names = AHashMap::default();
        term_names.insert(Term::One.key(), 0);
        let mut zero_inequalities = AHashMap::default();
        zero_inequalities.insert(0, Comp::Gt);

        Blackboard {
            num_terms: 1,
            term_defs: vec![Term::One],
            terms: vec![Term::One],
            term_names,
            zero_inequalities,
            zero_equalities: AHashSet::default(),
            zero_disequalities: AHashSet::default(),
            equalities: AHashMap::default(),
            inequalities: AHashMap::default(),
            disequalities: AHashMap::default(),
            clauses: Vec::new(),
            tracker: Tracker::new(),
        }
    }

    /// The number of indexed terms, including index 0.
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    /// The fully expanded term at index `i`, for display.
    pub fn expanded(&self, i: usize) -> &Term {
        &self.terms[i]
    }

    // -- Tracker facade (§4.6, §6) -----------------------------------

    /// Register a new subscriber and return its identifier.
    pub fn identify(&mut self) -> usize {
        self.tracker.identify()
    }

    pub fn has_new_info(&self, module: usize) -> bool {
        self.tracker.has_new_info(module)
    }

    pub fn get_new_info(&mut self, module: usize) -> AHashSet<UpdateKey> {
        self.tracker.get_new_info(module)
    }

    // -- Enumeration (§6) ---------------------------------------------

    /// Every known comparison `t_i <> c*t_j` or `t_i <> 0`.
    pub fn get_inequalities(&self) -> Vec<TermComparison> {
        let mut out = Vec::new();
        for (&i, &comp) in &self.zero_inequalities {
            out.push(TermComparison::new(
                Term::ivar(i),
                comp,
                crate::term::term::STerm::new(crate::rational::zero(), Term::One),
            ));
        }
        for (&(i, j), hps) in &self.inequalities {
            for hp in hps {
                if !hp.a.is_zero() && !hp.b.is_zero() {
                    out.push(hp.to_comp(Term::ivar(i), Term::ivar(j)));
                }
            }
        }
        out
    }

    /// Every known equality `t_i == c*t_j` or `t_i == 0` (not definitional
    /// equalities between an index and its own definition).
    pub fn get_equalities(&self) -> Vec<TermComparison> {
        let mut out = Vec::new();
        for &i in &self.zero_equalities {
            out.push(TermComparison::new(
                Term::ivar(i),
                Comp::Eq,
                crate::term::term::STerm::new(crate::rational::zero(), Term::One),
            ));
        }
        for (&(i, j), c) in &self.equalities {
            out.push(TermComparison::new(Term::ivar(i), Comp::Eq, crate::term::term::STerm::new(c.clone(), Term::ivar(j))));
        }
        out
    }

    /// Every known disequality `t_i != c*t_j` or `t_i != 0`.
    pub fn get_disequalities(&self) -> Vec<TermComparison> {
        let mut out = Vec::new();
        for &i in &self.zero_disequalities {
            out.push(TermComparison::new(
                Term::ivar(i),
                Comp::Ne,
                crate::term::term::STerm::new(crate::rational::zero(), Term::One),
            ));
        }
        for (&(i, j), coeffs) in &self.disequalities {
            for c in coeffs {
                out.push(TermComparison::new(Term::ivar(i), Comp::Ne, crate::term::term::STerm::new(c.clone(), Term::ivar(j))));
            }
        }
        out
    }

    /// Assert every comparison in `cs`, stopping at the first Contradiction.
    pub fn add(&mut self, cs: &[TermComparison]) -> PolyaResult<()> {
        for c in cs {
            self.assert_comparison(c)?;
        }
        Ok(())
    }

    /// Alias for [`Blackboard::add`].
    pub fn assume(&mut self, cs: &[TermComparison]) -> PolyaResult<()> {
        self.add(cs)
    }

    /// A human-readable dump of everything known, for debugging (§6).
    pub fn info_dump(&self) -> String {
        use std::fmt::Write;
        let mut st = String::from("\n******\n");
        for i in 0..self.num_terms {
            let _ = writeln!(st, "t{} := {}", i, self.term_defs[i]);
        }
        for &i in &self.zero_equalities {
            let _ = writeln!(st, "t{} = 0", i);
        }
        let mut zi: Vec<_> = self.zero_inequalities.iter().collect();
        zi.sort_by_key(|(&i, _)| i);
        for (&i, &comp) in zi {
            let _ = writeln!(st, "t{} {} 0", i, comp);
        }
        for &i in &self.zero_disequalities {
            let _ = writeln!(st, "t{} != 0", i);
        }
        let mut eqs: Vec<_> = self.equalities.iter().collect();
        eqs.sort_by_key(|(&(i, j), _)| (i, j));
        for (&(i, j), c) in eqs {
            let _ = writeln!(st, "t{} = {}*t{}", i, c, j);
        }
        let mut ineqs: Vec<_> = self.inequalities.iter().collect();
        ineqs.sort_by_key(|(&(i, j), _)| (i, j));
        for (&(i, j), hps) in ineqs {
            for hp in hps {
                if !hp.a.is_zero() && !hp.b.is_zero() {
                    let _ = writeln!(st, "{}", hp.to_comp(Term::ivar(i), Term::ivar(j)));
                }
            }
        }
        let mut diseqs: Vec<_> = self.disequalities.iter().collect();
        diseqs.sort_by_key(|(&(i, j), _)| (i, j));
        for (&(i, j), coeffs) in diseqs {
            for c in coeffs {
                let _ = writeln!(st, "t{} != {}*t{}", i, c, j);
            }
        }
        st.push_str("\n******\n");
        st
    }

    pub(crate) fn contradiction_pair(&self, i: usize, comp: Comp, coeff: &Rat, j: usize) -> PolyaError {
        let surface = TermComparison::new(Term::ivar(i), comp, crate::term::term::STerm::new(coeff.clone(), Term::ivar(j)));
        let expanded = TermComparison::new(
            self.terms[i].clone(),
            comp,
            crate::term::term::STerm::new(coeff.clone(), self.terms[j].clone()),
        );
        PolyaError::contradiction(format!("{}\n  := {}", surface, expanded))
    }

    pub(crate) fn contradiction_zero(&self, i: usize, comp: Comp) -> PolyaError {
        let surface = TermComparison::new(Term::ivar(i), comp, crate::term::term::STerm::new(crate::rational::zero(), Term::One));
        let expanded = TermComparison::new(
            self.terms[i].clone(),
            comp,
            crate::term::term::STerm::new(crate::rational::zero(), Term::One),
        );
        PolyaError::contradiction(format!("{}\n  := {}", surface, expanded))
    }
}

/// Normalize `(i, comp, coeff, j)` (with `coeff != 0`) to the `i <= j` form
/// every table entry is keyed by, flipping the comparison and inverting the
/// coefficient when the operands arrive in the other order. This is an
/// implementation-level invariant, not spelled out by the original source
/// (which relies on an upstream `terms.py` canonization we don't have): see
/// `DESIGN.md`.
pub(crate) fn canonical_pair(i: usize, comp: Comp, coeff: Rat, j: usize) -> (usize, Comp, Rat, usize) {
    if i <= j {
        (i, comp, coeff, j)
    } else {
        let new_comp = crate::term::comparison::swap_sides(comp, &coeff);
        (j, new_comp, crate::rational::recip(&coeff), i)
    }
}

impl crate::term::comparison::ImpliesQuery for Blackboard {
    fn implies_literal(&self, l: &Literal) -> bool {
        if l.coeff.is_zero() {
            self.implies_zero_comparison(l.i, l.comp)
        } else {
            self.implies(l.i, l.comp, &l.coeff, l.j)
        }
    }
}

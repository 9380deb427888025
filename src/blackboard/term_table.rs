//! The indexed-term registry (§3 "Indexed term table", §4.2).
//!
//! Every term a reasoning module builds gets reduced to a small integer
//! index before it's stored in any comparison table; `term_name` is the
//! only place new indices are minted, and it mints them in increasing
//! order so that `term_defs[i]` only ever references indices below `i`
//! (invariant I1).

use super::Blackboard;
use crate::term::term::{MulPair, STerm, Term};
use smallvec::SmallVec;

impl Blackboard {
    /// Substitute every `IVar` leaf of `t` with its full definition,
    /// recursively. `self.terms[i]` already holds the fully expanded form
    /// of index `i`, so an `IVar` leaf expands in one lookup rather than by
    /// re-walking its definition.
    pub(crate) fn expand_term(&self, t: &Term) -> Term {
        match t {
            Term::One => Term::One,
            Term::Var(name) => Term::Var(name.clone()),
            Term::IVar(i) => self.terms[*i].clone(),
            Term::AddTerm(args) => Term::AddTerm(
                args.iter()
                    .map(|a| STerm::new(a.coeff.clone(), self.expand_term(&a.term)))
                    .collect(),
            ),
            Term::MulTerm(args) => Term::MulTerm(
                args.iter()
                    .map(|a| MulPair::new(self.expand_term(&a.term), a.exponent))
                    .collect(),
            ),
            Term::FuncTerm(name, args) => Term::FuncTerm(
                name.clone(),
                args.iter()
                    .map(|a| STerm::new(a.coeff.clone(), self.expand_term(&a.term)))
                    .collect(),
            ),
        }
    }

    /// Look up the index of `t` (a coefficient-1, already-canonized term)
    /// without registering it.
    pub(crate) fn has_name(&self, t: &Term) -> Option<usize> {
        match t {
            Term::IVar(i) => Some(*i),
            Term::One => Some(0),
            other => {
                let expanded = self.expand_term(other);
                self.term_names.get(&expanded.key()).copied()
            }
        }
    }

    /// Return the index of `t` (a coefficient-1, already-canonized term),
    /// registering it (and, recursively, any unregistered immediate
    /// subterm) if it isn't known yet (§4.2, invariants I1/I4).
    ///
    /// Baseline half-planes against terms of known sign are not stored
    /// here: invariant I2 requires any origin-passing half-plane implied
    /// by `zero_inequalities` to be absent from `inequalities`, and
    /// `get_halfplane_comparisons` folds those zero-sign facts in lazily at
    /// query time (see `DESIGN.md`), so storing them eagerly here would
    /// just be redundant bookkeeping this table immediately has to undo.
    pub(crate) fn term_name(&mut self, t: &Term) -> usize {
        if let Some(i) = self.has_name(t) {
            return i;
        }
        let def = match t {
            Term::Var(_) => t.clone(),
            Term::AddTerm(args) => {
                let mut named: SmallVec<[STerm; 4]> = SmallVec::new();
                for a in args {
                    let idx = self.term_name(&a.term);
                    named.push(STerm::new(a.coeff.clone(), Term::IVar(idx)));
                }
                Term::AddTerm(named)
            }
            Term::MulTerm(args) => {
                let mut named: SmallVec<[MulPair; 4]> = SmallVec::new();
                for a in args {
                    let idx = self.term_name(&a.term);
                    named.push(MulPair::new(Term::IVar(idx), a.exponent));
                }
                Term::MulTerm(named)
            }
            Term::FuncTerm(name, args) => {
                let mut named: SmallVec<[STerm; 4]> = SmallVec::new();
                for a in args {
                    let idx = self.term_name(&a.term);
                    named.push(STerm::new(a.coeff.clone(), Term::IVar(idx)));
                }
                Term::FuncTerm(name.clone(), named)
            }
            Term::One | Term::IVar(_) => unreachable!("handled by has_name above"),
        };

        let idx = self.num_terms;
        self.num_terms += 1;
        let expanded = self.expand_term(&def);
        let key = expanded.key();
        self.term_defs.push(def);
        self.terms.push(expanded);
        self.term_names.insert(key, idx);
        idx
    }

    /// Intern `t`, registering any new subterms, without asserting
    /// anything about it (§6 `add_term`).
    pub fn add_term(&mut self, t: &Term) -> usize {
        let canon = t.canonize();
        self.term_name(&canon.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::rat;

    #[test]
    fn repeated_var_gets_same_index() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let i1 = bb.add_term(&x);
        let i2 = bb.add_term(&x);
        assert_eq!(i1, i2);
    }

    #[test]
    fn distinct_vars_get_distinct_indices() {
        let mut bb = Blackboard::new();
        let i1 = bb.add_term(&Term::var("x"));
        let i2 = bb.add_term(&Term::var("y"));
        assert_ne!(i1, i2);
    }

    #[test]
    fn sum_reuses_subterm_indices() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let y = Term::var("y");
        let ix = bb.add_term(&x);
        let sum = Term::AddTerm(vec![STerm::new(rat(1, 1), x), STerm::new(rat(1, 1), y)].into_iter().collect());
        let isum = bb.add_term(&sum);
        match &bb.term_defs[isum] {
            Term::AddTerm(args) => {
                assert!(args.iter().any(|a| a.term == Term::IVar(ix)));
            }
            other => panic!("expected AddTerm, got {:?}", other),
        }
    }

    #[test]
    fn expand_term_recovers_original_shape() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let y = Term::var("y");
        let sum = Term::AddTerm(vec![STerm::new(rat(1, 1), x.clone()), STerm::new(rat(1, 1), y.clone())].into_iter().collect());
        let i = bb.add_term(&sum);
        assert_eq!(bb.terms[i].key(), sum.key());
    }
}

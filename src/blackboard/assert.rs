//! The assertion engine (§4.4): `assert_comparison` and the per-shape
//! handlers that keep invariants I2/I3 intact as new facts arrive.
//!
//! `assert_comparison` (and the handlers it dispatches to) are re-entrant:
//! clause unit-propagation, zero-inequality fan-out, and equality collapse
//! all recurse back into this module. Termination follows from §5's
//! observation that every successful assertion strictly strengthens a
//! finite lattice of tables.

use super::{canonical_pair, Blackboard, UpdateKey};
use crate::error::PolyaResult;
use crate::geometry::{add_halfplane_comparison, Halfplane};
use crate::rational::{one, Rat};
use crate::term::comparison::{comp_negate, comp_reverse, comp_weaken, Clause, ClauseState, Comp, Literal, TermComparison};
use ahash::AHashSet;
use num_traits::{Signed, Zero};

impl Blackboard {
    /// Assert `c`, registering any new terms it mentions. Fast-exits if
    /// already known; raises `Contradiction` if its negation already holds
    /// (§4.4).
    pub fn assert_comparison(&mut self, c: &TermComparison) -> PolyaResult<()> {
        let canon = c.canonize();
        let i = self.term_name(&canon.term1);
        let j = self.term_name(&canon.term2.term);
        self.assert_comparison_indexed(i, canon.comp, canon.term2.coeff, j)
    }

    pub(crate) fn assert_comparison_indexed(&mut self, i: usize, comp: Comp, coeff: Rat, j: usize) -> PolyaResult<()> {
        if coeff.is_zero() {
            return self.assert_comparison_zero(i, comp);
        }
        if i == j {
            let k = &one() - &coeff;
            if k.is_zero() {
                return if matches!(comp, Comp::Le | Comp::Ge | Comp::Eq) {
                    Ok(())
                } else {
                    Err(self.contradiction_pair(i, comp, &coeff, j))
                };
            }
            let adj = if k.is_negative() { comp_reverse(comp) } else { comp };
            return self.assert_comparison_zero(i, adj);
        }

        let (i, comp, coeff, j) = canonical_pair(i, comp, coeff, j);
        if self.implies(i, comp, &coeff, j) {
            return Ok(());
        }
        if self.implies(i, comp_negate(comp), &coeff, j) {
            return Err(self.contradiction_pair(i, comp, &coeff, j));
        }
        match comp {
            Comp::Eq => self.assert_equality(i, &coeff, j),
            Comp::Ne => self.assert_disequality(i, &coeff, j),
            Comp::Lt | Comp::Le | Comp::Gt | Comp::Ge => self.assert_inequality(i, comp, &coeff, j),
        }
    }

    pub(crate) fn assert_comparison_zero(&mut self, i: usize, comp: Comp) -> PolyaResult<()> {
        if self.implies_zero_comparison(i, comp) {
            return Ok(());
        }
        if self.implies_zero_comparison(i, comp_negate(comp)) {
            return Err(self.contradiction_zero(i, comp));
        }
        match comp {
            Comp::Eq => self.assert_zero_equality(i),
            Comp::Ne => self.assert_zero_disequality(i),
            Comp::Lt | Comp::Le | Comp::Gt | Comp::Ge => self.assert_zero_inequality(i, comp),
        }
    }

    /// §4.4.1. `i < j`, `coeff != 0`.
    fn assert_inequality(&mut self, i: usize, comp: Comp, coeff: &Rat, j: usize) -> PolyaResult<()> {
        let q = Halfplane::of_comp(comp, coeff);
        let old = self.inequalities.get(&(i, j)).cloned().unwrap_or_default();

        for h in &old {
            if h.opp_dir(&q) {
                if h.strong || q.strong {
                    // The caller's fast-exit (`implies`/`implies(negate)`) already
                    // rules this out; fall back to a Contradiction rather than
                    // panic if that invariant is ever violated.
                    return Err(self.contradiction_pair(i, comp, coeff, j));
                }
                self.inequalities.remove(&(i, j));
                self.disequalities.remove(&(i, j));
                return self.assert_equality(i, coeff, j);
            }
        }

        // A strict bound colinear with nothing already stored, but whose
        // weak form the cone already implies, only rules out the single
        // point where the cone's two boundaries meet. Recording it as a
        // boundary would synthesize strictness that was never directly
        // asserted, so it degrades to the disjunction `ti != 0 or tj != 0`
        // instead.
        if q.strong && !old.iter().any(|h| h.eq_dir(&q)) {
            let w_comp = comp_weaken(comp);
            if self.implies(i, w_comp, coeff, j) {
                return self.assert_clause(vec![
                    Literal::new(i, Comp::Ne, crate::rational::zero(), 0),
                    Literal::new(j, Comp::Ne, crate::rational::zero(), 0),
                ]);
            }
        }

        let new_list = add_halfplane_comparison(q, &old);
        self.inequalities.insert((i, j), new_list);
        self.tracker.update(UpdateKey::Pair(i, j));
        self.purge_redundant_disequalities(i, j);

        if i == 0 && matches!(comp, Comp::Lt | Comp::Le) {
            let jcomp = if coeff.is_positive() { Comp::Gt } else { Comp::Lt };
            self.assert_comparison_zero(j, jcomp)?;
        }

        self.update_clauses()
    }

    /// §4.4.2.
    fn assert_zero_inequality(&mut self, i: usize, comp: Comp) -> PolyaResult<()> {
        let existing = self.zero_inequalities.get(&i).copied();
        match (existing, comp) {
            (Some(Comp::Ge), Comp::Le) | (Some(Comp::Le), Comp::Ge) => {
                self.zero_inequalities.remove(&i);
                return self.assert_zero_equality(i);
            }
            _ => {
                self.zero_inequalities.insert(i, comp);
                self.zero_disequalities.remove(&i);
            }
        }
        self.tracker.update(UpdateKey::Zero(i));

        let others: Vec<usize> = (0..self.num_terms).filter(|&k| k != i).collect();
        let mut new_zero_ineqs: Vec<(usize, Comp)> = Vec::new();
        for j in others {
            let (lo, hi) = if i < j { (i, j) } else { (j, i) };
            let hp = if i < j { Halfplane::of_comp(comp, &crate::rational::zero()) } else { Halfplane::of_comp(comp, &crate::rational::zero()).flip() };
            let old = self.inequalities.get(&(lo, hi)).cloned().unwrap_or_default();
            let new_list = add_halfplane_comparison(hp, &old);
            self.inequalities.insert((lo, hi), new_list.clone());
            self.tracker.update(UpdateKey::Pair(lo, hi));
            self.purge_redundant_disequalities(lo, hi);

            // Folding this boundary in may have closed the (lo, hi) cone to
            // two extremal half-planes. If j's own sign is still unknown
            // and those two boundaries now sandwich j's axis, j's sign is
            // pinned too — queue the new zero-fact and flush once the fold
            // loop is done, so later iterations still see the pre-fold
            // tables rather than racing ahead of them.
            if new_list.len() == 2 && self.sign(j) == 0 {
                let j_g_0 = if i < j {
                    Halfplane::new(crate::rational::zero(), one(), true)
                } else {
                    Halfplane::new(one(), crate::rational::zero(), true)
                };
                let cw_a = j_g_0.compare_hp(&new_list[0]);
                let cw_b = j_g_0.compare_hp(&new_list[1]);
                let both_strong = new_list[0].strong && new_list[1].strong;
                if cw_a > 0 && cw_b < 0 {
                    new_zero_ineqs.push((j, if both_strong { Comp::Gt } else { Comp::Ge }));
                } else if cw_a < 0 && cw_b > 0 {
                    new_zero_ineqs.push((j, Comp::Lt));
                }
            }
        }

        for (j, jcomp) in new_zero_ineqs {
            self.assert_comparison_zero(j, jcomp)?;
        }

        self.update_clauses()
    }

    /// §4.4.3. `i < j`.
    fn assert_equality(&mut self, i: usize, coeff: &Rat, j: usize) -> PolyaResult<()> {
        self.equalities.insert((i, j), coeff.clone());
        self.inequalities.remove(&(i, j));
        self.disequalities.remove(&(i, j));
        self.tracker.update(UpdateKey::Pair(i, j));
        self.update_clauses()
    }

    /// §4.4.4.
    fn assert_zero_equality(&mut self, i: usize) -> PolyaResult<()> {
        self.zero_equalities.insert(i);
        self.zero_inequalities.remove(&i);
        self.zero_disequalities.remove(&i);

        let stale_eq: Vec<(usize, usize)> = self.equalities.keys().filter(|&&(a, b)| a == i || b == i).cloned().collect();
        for k in stale_eq {
            self.equalities.remove(&k);
        }
        let stale_ineq: Vec<(usize, usize)> = self.inequalities.keys().filter(|&&(a, b)| a == i || b == i).cloned().collect();
        for k in stale_ineq {
            self.inequalities.remove(&k);
        }
        let stale_diseq: Vec<(usize, usize)> = self.disequalities.keys().filter(|&&(a, b)| a == i || b == i).cloned().collect();
        for k in stale_diseq {
            self.disequalities.remove(&k);
        }

        self.tracker.update(UpdateKey::Zero(i));
        self.update_clauses()
    }

    /// §4.4.5, pair form. `i < j`.
    fn assert_disequality(&mut self, i: usize, coeff: &Rat, j: usize) -> PolyaResult<()> {
        let old = self.inequalities.get(&(i, j)).cloned().unwrap_or_default();
        let ge_dir = Halfplane::of_comp(Comp::Ge, coeff);
        let le_dir = Halfplane::of_comp(Comp::Le, coeff);

        for h in &old {
            if !h.strong && (h.eq_dir(&ge_dir) || h.eq_dir(&le_dir)) {
                let mut new_list = old.clone();
                for e in new_list.iter_mut() {
                    if e.eq_dir(h) {
                        e.strong = true;
                    }
                }
                self.inequalities.insert((i, j), new_list);
                self.tracker.update(UpdateKey::Pair(i, j));
                return self.update_clauses();
            }
        }

        self.disequalities.entry((i, j)).or_insert_with(AHashSet::default).insert(coeff.clone());
        self.tracker.update(UpdateKey::Pair(i, j));
        self.update_clauses()
    }

    /// §4.4.5, zero form.
    fn assert_zero_disequality(&mut self, i: usize) -> PolyaResult<()> {
        match self.zero_inequalities.get(&i).copied() {
            Some(Comp::Ge) => {
                self.zero_inequalities.insert(i, Comp::Gt);
            }
            Some(Comp::Le) => {
                self.zero_inequalities.insert(i, Comp::Lt);
            }
            _ => {
                self.zero_disequalities.insert(i);
            }
        }
        self.tracker.update(UpdateKey::Zero(i));
        self.update_clauses()
    }

    /// Drop disequality entries now implied by a strict inequality, without
    /// re-entering through the `disequalities` table lookup in `implies`
    /// (which would be circular for entries we're in the middle of
    /// re-examining).
    fn purge_redundant_disequalities(&mut self, i: usize, j: usize) {
        let Some(set) = self.disequalities.get(&(i, j)).cloned() else { return };
        let kept: AHashSet<Rat> = set.into_iter().filter(|c| !self.ne_implied_by_strict_inequality(i, j, c)).collect();
        if kept.is_empty() {
            self.disequalities.remove(&(i, j));
        } else {
            self.disequalities.insert((i, j), kept);
        }
    }

    /// §4.4.6. Assert a disjunction of literals.
    pub fn assert_clause(&mut self, literals: Vec<Literal>) -> PolyaResult<()> {
        let mut clause = Clause::new(literals);
        if self.has_clause(&clause) {
            return Ok(());
        }
        match clause.update(&*self) {
            ClauseState::Satisfied => Ok(()),
            ClauseState::Contradiction => Err(crate::error::PolyaError::contradiction(format!(
                "clause {} has no live literals",
                clause
            ))),
            ClauseState::Unit => {
                let lit = clause.first();
                self.assert_comparison_indexed(lit.i, lit.comp, lit.coeff, lit.j)
            }
            ClauseState::Open => {
                self.clauses.push(clause);
                Ok(())
            }
        }
    }

    /// Re-evaluate every stored clause against the current tables. Collects
    /// every clause's outcome in a first pass, then acts on unit clauses in
    /// a second — mutating `self.clauses` while iterating it would leave
    /// iteration order undefined (§9 open question).
    pub(crate) fn update_clauses(&mut self) -> PolyaResult<()> {
        let clauses = std::mem::take(&mut self.clauses);
        let mut kept = Vec::with_capacity(clauses.len());
        let mut units = Vec::new();

        for mut cl in clauses {
            match cl.update(&*self) {
                ClauseState::Satisfied => {}
                ClauseState::Contradiction => {
                    self.clauses = kept;
                    return Err(crate::error::PolyaError::contradiction(format!(
                        "clause {} has no live literals",
                        cl
                    )));
                }
                ClauseState::Unit => units.push(cl.first()),
                ClauseState::Open => kept.push(cl),
            }
        }
        self.clauses = kept;

        for lit in units {
            self.assert_comparison_indexed(lit.i, lit.comp, lit.coeff, lit.j)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::Blackboard;
    use crate::rational::rat;
    use crate::term::comparison::BuildComparison;
    use crate::term::term::{STerm, Term};

    fn zero_term() -> STerm {
        STerm::new(crate::rational::zero(), Term::One)
    }

    #[test]
    fn positive_plus_positive_is_positive_contradicts_negative_sum() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let y = Term::var("y");
        bb.assert_comparison(&x.clone().gt(zero_term())).unwrap();
        bb.assert_comparison(&y.clone().gt(zero_term())).unwrap();
        let sum = x + y;
        let res = bb.assert_comparison(&sum.lt(zero_term()));
        assert!(res.is_err());
        assert!(res.unwrap_err().is_contradiction());
    }

    #[test]
    fn contradictory_bounds_on_same_var() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        bb.assert_comparison(&x.clone().gt(STerm::new(rat(1, 1), Term::One))).unwrap();
        let res = bb.assert_comparison(&x.lt(zero_term()));
        assert!(res.unwrap_err().is_contradiction());
    }

    #[test]
    fn zero_sign_fact_folds_into_an_existing_pair_cone() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let y = Term::var("y");
        let ix = bb.add_term(&x);
        let iy = bb.add_term(&y);
        bb.assert_comparison(&x.clone().ge(STerm::new(rat(3, 1), y.clone()))).unwrap();
        assert_eq!(bb.get_halfplane_comparisons(ix, iy).len(), 1);
        bb.assert_comparison(&y.gt(zero_term())).unwrap();
        // y > 0 folds in as a second boundary of the (x, y) cone at query
        // time; it doesn't register a direct zero-sign fact on x itself.
        assert_eq!(bb.get_halfplane_comparisons(ix, iy).len(), 2);
        assert!(bb.implies(ix, Comp::Ge, &rat(3, 1), iy));
        assert!(!bb.implies_zero_comparison(ix, Comp::Gt));
    }

    #[test]
    fn equal_applications_of_same_function_transfer_facts() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let y = Term::var("y");
        let fx = Term::func("f", vec![STerm::from(x.clone())]);
        let fy = Term::func("f", vec![STerm::from(y.clone())]);
        bb.assert_comparison(&fx.clone().term_eq(STerm::new(rat(1, 1), Term::One))).unwrap();
        bb.assert_comparison(&fx.term_eq(fy.clone())).unwrap();
        assert!(bb.implies_comparison(&fy.term_eq(STerm::new(rat(1, 1), Term::One))));
    }

    #[test]
    fn mutual_inequalities_collapse_to_equality() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let y = Term::var("y");
        let ix = bb.add_term(&x);
        let iy = bb.add_term(&y);
        bb.assert_comparison(&x.clone().le(y.clone())).unwrap();
        bb.assert_comparison(&y.clone().le(x.clone())).unwrap();
        let (lo, hi) = if ix < iy { (ix, iy) } else { (iy, ix) };
        assert!(bb.equalities.contains_key(&(lo, hi)));
        assert!(!bb.inequalities.contains_key(&(lo, hi)));
    }

    #[test]
    fn clause_asserted_then_zero_equality_contradicts() {
        let mut bb = Blackboard::new();
        let x = Term::var("x");
        let ix = bb.add_term(&x);
        let gt = Literal::new(ix, Comp::Gt, crate::rational::zero(), 0);
        let lt = Literal::new(ix, Comp::Lt, crate::rational::zero(), 0);
        bb.assert_clause(vec![gt, lt]).unwrap();
        let res = bb.assert_comparison(&x.term_eq(zero_term()));
        assert!(res.unwrap_err().is_contradiction());
    }
}

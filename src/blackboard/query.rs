//! The query engine (§4.3, §4.5): `implies`/`implies_comparison`, sign
//! queries, half-plane enumeration, and the parametric coefficient-range
//! queries.
//!
//! None of these mutate the Blackboard; they only ever read the tables.

use super::Blackboard;
use crate::geometry::{add_halfplane_comparison, ComparisonRange, Halfplane};
use crate::rational::{one, zero, Extended, Rat};
use crate::term::comparison::{comp_reverse, swap_sides, Comp, TermComparison};
use num_traits::{Signed, Zero};
use smallvec::SmallVec;

impl Blackboard {
    /// The strict sign of `t_i`: `1`/`-1` only when a strict fact (`Gt`,
    /// `Lt`) or an exact zero is known; `0` otherwise (including when only
    /// a weak bound like `Ge` is known — use [`Blackboard::weak_sign`] for
    /// that).
    pub fn sign(&self, i: usize) -> i32 {
        if self.zero_equalities.contains(&i) {
            return 0;
        }
        match self.zero_inequalities.get(&i) {
            Some(Comp::Gt) => 1,
            Some(Comp::Lt) => -1,
            _ => 0,
        }
    }

    /// The sign of `t_i` including weak bounds: `1` for `Gt`/`Ge`, `-1` for
    /// `Lt`/`Le`, `0` for an exact zero or a totally unknown sign.
    pub fn weak_sign(&self, i: usize) -> i32 {
        if self.zero_equalities.contains(&i) {
            return 0;
        }
        match self.zero_inequalities.get(&i) {
            Some(Comp::Gt) | Some(Comp::Ge) => 1,
            Some(Comp::Lt) | Some(Comp::Le) => -1,
            _ => 0,
        }
    }

    /// Whether `t_i comp 0` is already known.
    pub fn implies_zero_comparison(&self, i: usize, comp: Comp) -> bool {
        if self.zero_equalities.contains(&i) {
            return matches!(comp, Comp::Le | Comp::Ge | Comp::Eq);
        }
        if comp == Comp::Ne && self.zero_disequalities.contains(&i) {
            return true;
        }
        match self.zero_inequalities.get(&i) {
            Some(Comp::Gt) => matches!(comp, Comp::Gt | Comp::Ge | Comp::Ne),
            Some(Comp::Ge) => matches!(comp, Comp::Ge),
            Some(Comp::Lt) => matches!(comp, Comp::Lt | Comp::Le | Comp::Ne),
            Some(Comp::Le) => matches!(comp, Comp::Le),
            _ => false,
        }
    }

    /// Whether `t_i comp coeff * t_j` is already known (§4.3). Robust to
    /// `i > j` — normalizes internally rather than requiring the caller to
    /// pre-sort.
    pub fn implies(&self, i: usize, comp: Comp, coeff: &Rat, j: usize) -> bool {
        if coeff.is_zero() {
            return self.implies_zero_comparison(i, comp);
        }
        let (i, comp, coeff, j) = if i <= j {
            (i, comp, coeff.clone(), j)
        } else {
            (j, swap_sides(comp, coeff), crate::rational::recip(coeff), i)
        };

        if i == j {
            let k = &one() - &coeff;
            if k.is_zero() {
                return matches!(comp, Comp::Le | Comp::Ge | Comp::Eq);
            }
            let adj = if k.is_negative() { comp_reverse(comp) } else { comp };
            return self.implies_zero_comparison(i, adj);
        }
        if self.zero_equalities.contains(&j) {
            return self.implies_zero_comparison(i, comp);
        }
        if self.zero_equalities.contains(&i) {
            let comp_for_j = if coeff.is_positive() { comp_reverse(comp) } else { comp };
            return self.implies_zero_comparison(j, comp_for_j);
        }
        if let Some(e) = self.equalities.get(&(i, j)) {
            if e == &coeff {
                return matches!(comp, Comp::Le | Comp::Ge | Comp::Eq);
            }
            let diff = e - &coeff;
            let comp_for_j = if diff.is_negative() { comp_reverse(comp) } else { comp };
            return self.implies_zero_comparison(j, comp_for_j);
        }

        match comp {
            Comp::Eq => false,
            Comp::Ne => {
                if let Some(set) = self.disequalities.get(&(i, j)) {
                    if set.contains(&coeff) {
                        return true;
                    }
                }
                self.ne_implied_by_strict_inequality(i, j, &coeff)
            }
            _ => self.implies_halfplane(i, j, &Halfplane::of_comp(comp, &coeff)),
        }
    }

    /// Whether `t_i != c*t_j` follows from a strict half-plane bound alone
    /// (`t_i > c*t_j` or `t_i < c*t_j`), without consulting the
    /// `disequalities` table — used both by `implies`'s `Ne` branch and by
    /// `assert`'s disequality-purge step, which would otherwise recurse into
    /// the very table entry it's re-examining.
    pub(crate) fn ne_implied_by_strict_inequality(&self, i: usize, j: usize, coeff: &Rat) -> bool {
        self.implies_halfplane(i, j, &Halfplane::of_comp(Comp::Gt, coeff))
            || self.implies_halfplane(i, j, &Halfplane::of_comp(Comp::Lt, coeff))
    }

    /// Whether a registered clause already rules out the single touching
    /// point of two boundary half-planes by recording `{t_i != 0, t_j != 0}`
    /// (in either literal order) — the clause-based escape hatch `implies`
    /// falls back to alongside a direct `NE` zero-fact, per the original's
    /// `has_clause(IVar(i) != 0, IVar(j) != 0)` check.
    fn has_ne_zero_clause(&self, i: usize, j: usize) -> bool {
        let lit = |k: usize| crate::term::comparison::Literal::new(k, Comp::Ne, crate::rational::zero(), 0);
        let a = crate::term::comparison::Clause::new(vec![lit(i), lit(j)]);
        let b = crate::term::comparison::Clause::new(vec![lit(j), lit(i)]);
        self.has_clause(&a) || self.has_clause(&b)
    }

    /// Whether the cone described by `get_halfplane_comparisons(i, j)`
    /// (already including the folded-in zero-sign facts) contains `q`.
    pub(crate) fn implies_halfplane(&self, i: usize, j: usize, q: &Halfplane) -> bool {
        let escape = self.zero_disequalities.contains(&i)
            || self.zero_disequalities.contains(&j)
            || self.has_ne_zero_clause(i, j);
        let l = self.get_halfplane_comparisons(i, j);
        match l.len() {
            0 => false,
            1 => {
                let h1 = &l[0];
                if !h1.eq_dir(q) {
                    return false;
                }
                !q.strong || h1.strong || escape
            }
            _ => {
                let h1 = &l[0];
                let h2 = &l[1];
                let c1 = h1.compare_hp(q);
                let c2 = q.compare_hp(h2);
                if c1 > 0 || c2 > 0 {
                    return false;
                }
                if q.strong {
                    if c1 == 0 && !h1.strong && !escape {
                        return false;
                    }
                    if c2 == 0 && !h2.strong && !escape {
                        return false;
                    }
                }
                true
            }
        }
    }

    /// Whether the surface-level comparison `c` is already known. Never
    /// registers new terms — an unregistered operand means nothing is
    /// known about it yet, so this reports `false`.
    pub fn implies_comparison(&self, c: &TermComparison) -> bool {
        let canon = c.canonize();
        let i = match self.has_name(&canon.term1) {
            Some(i) => i,
            None => return false,
        };
        let j = match self.has_name(&canon.term2.term) {
            Some(j) => j,
            None => return false,
        };
        if canon.term2.coeff.is_zero() {
            self.implies_zero_comparison(i, canon.comp)
        } else {
            self.implies(i, canon.comp, &canon.term2.coeff, j)
        }
    }

    /// Whether an equivalent clause has already been recorded.
    pub(crate) fn has_clause(&self, clause: &crate::term::comparison::Clause) -> bool {
        self.clauses.contains(clause)
    }

    /// The 0–2 strongest half-planes pertinent to `(t_i, t_j)`, folding in
    /// zero-sign facts on `i` and `j` as axis-aligned half-planes (§4.5).
    /// Robust to `i > j`.
    pub fn get_halfplane_comparisons(&self, i: usize, j: usize) -> SmallVec<[Halfplane; 2]> {
        if i > j {
            let mut swapped = self.get_halfplane_comparisons(j, i);
            swapped.reverse();
            return swapped.iter().map(Halfplane::flip).collect();
        }
        let mut l: SmallVec<[Halfplane; 2]> = self.inequalities.get(&(i, j)).cloned().unwrap_or_default();
        if let Some(&ci) = self.zero_inequalities.get(&i) {
            let hp = Halfplane::of_comp(ci, &zero());
            l = add_halfplane_comparison(hp, &l);
        }
        if let Some(&cj) = self.zero_inequalities.get(&j) {
            let hp = Halfplane::of_comp(cj, &zero()).flip();
            l = add_halfplane_comparison(hp, &l);
        }
        l
    }

    fn get_equality(&self, i: usize, j: usize) -> Option<Rat> {
        if i == j {
            return Some(one());
        }
        if i < j {
            self.equalities.get(&(i, j)).cloned()
        } else {
            self.equalities.get(&(j, i)).map(|e| crate::rational::recip(e))
        }
    }

    /// The range of `c` for which `t_i <= c*t_j` is known (§4.5).
    pub fn get_le_range(&self, i: usize, j: usize) -> ComparisonRange {
        self.coeff_range(i, j, true)
    }

    /// The range of `c` for which `t_i >= c*t_j` is known (§4.5).
    pub fn get_ge_range(&self, i: usize, j: usize) -> ComparisonRange {
        self.coeff_range(i, j, false)
    }

    /// The common shape of `get_le_range`/`get_ge_range` at a pivot value
    /// `coeff` (`1` for `i == j`, the known equality coefficient otherwise):
    /// a half-line from `coeff` whose open end is unbounded and whose
    /// strictness (both the bound and `interior_strong`) comes from whether
    /// the comparison against zero is already strict, or the degenerate
    /// single point `{coeff}` when the sign is entirely unknown.
    fn pivot_range(coeff: &Rat, wsign: i32, strict: bool, le: bool) -> ComparisonRange {
        if wsign == 0 {
            return ComparisonRange::new(Extended::finite(coeff.clone()), Extended::finite(coeff.clone()), false, false, false);
        }
        let upward = if le { wsign == 1 } else { wsign == -1 };
        if upward {
            ComparisonRange::new(Extended::finite(coeff.clone()), Extended::Infty, false, strict, strict)
        } else {
            ComparisonRange::new(Extended::NegInfty, Extended::finite(coeff.clone()), strict, strict, false)
        }
    }

    fn reflexive_range(&self, i: usize, le: bool) -> ComparisonRange {
        if self.zero_equalities.contains(&i) {
            return ComparisonRange::new(Extended::NegInfty, Extended::Infty, false, false, false);
        }
        Self::pivot_range(&one(), self.weak_sign(i), self.sign(i) != 0, le)
    }

    /// Known equality `t_i = e*t_j`; the range pivots on `e` by the sign of
    /// `t_j`. When `t_j` is known exactly zero, `t_i` is forced zero too, so
    /// every coefficient trivially satisfies the comparison (`0 <> c*0`) —
    /// the whole line, not the degenerate `{e}` a naive sign lookup would
    /// produce.
    fn equality_pivot_range(&self, e: &Rat, j: usize, le: bool) -> ComparisonRange {
        if self.zero_equalities.contains(&j) {
            return ComparisonRange::new(Extended::NegInfty, Extended::Infty, false, false, false);
        }
        Self::pivot_range(e, self.weak_sign(j), self.sign(j) != 0, le)
    }

    /// Shared implementation of [`Blackboard::get_le_range`] and
    /// [`Blackboard::get_ge_range`]; `le` selects which one. `interior_strong`
    /// is driven by whether either operand is already known nonzero (an `NE`
    /// fact rules out the single boundary point the two half-planes meet
    /// at), matching the original's `implies_zero_comparison(_, NE)` check;
    /// each endpoint's own strictness bit comes directly from the boundary
    /// half-plane that produced it, not a blanket `false` (§8 property 6:
    /// the endpoint's strictness must be witnessed, not just the range's
    /// membership).
    fn coeff_range(&self, i: usize, j: usize, le: bool) -> ComparisonRange {
        if i == j {
            return self.reflexive_range(i, le);
        }
        if let Some(e) = self.get_equality(i, j) {
            return self.equality_pivot_range(&e, j, le);
        }

        let hps = self.get_halfplane_comparisons(i, j);
        match hps.len() {
            0 => ComparisonRange::empty(),
            1 => {
                let h = &hps[0];
                let q_dir_a_negative = le; // of_comp(Le,_).a == -1; of_comp(Ge,_).a == 1
                let compatible = if q_dir_a_negative { h.a.is_negative() } else { h.a.is_positive() };
                if h.a.is_zero() || !compatible {
                    return ComparisonRange::empty();
                }
                let c0 = -(&h.b) / &h.a;
                ComparisonRange::new(Extended::finite(c0.clone()), Extended::finite(c0), h.strong, h.strong, h.strong)
            }
            _ => {
                let interior_strong = self.implies_zero_comparison(i, Comp::Ne) || self.implies_zero_comparison(j, Comp::Ne);
                let mut range = ComparisonRange::new(Extended::NegInfty, Extended::Infty, false, interior_strong, false);
                for h in [&hps[0], &hps[1]] {
                    if h.a.is_zero() {
                        continue;
                    }
                    let c0 = -(&h.b) / &h.a;
                    let bound_is_upper = if le { h.a.is_positive() } else { h.a.is_negative() };
                    let side = if bound_is_upper {
                        ComparisonRange::new(Extended::NegInfty, Extended::finite(c0), false, interior_strong, h.strong)
                    } else {
                        ComparisonRange::new(Extended::finite(c0), Extended::Infty, h.strong, interior_strong, false)
                    };
                    range = range.intersect(&side);
                }
                range
            }
        }
    }

    /// The range of `c` for which `c*t_i <= coeff*t_j` is known (§4.5). For
    /// `coeff == 0` this inspects `i`'s own zero-sign facts directly rather
    /// than delegating to `get_ge_range`/`get_le_range` — per the original's
    /// `if coeff == 0:` branch, which never reaches either. For nonzero
    /// `coeff`, scaling `get_ge_range(j, i)` by a negative multiplier would
    /// answer a different question (a `>=` cone, merely flipped) than
    /// scaling `get_le_range(j, i)` by that same multiplier, so the sign of
    /// `coeff` selects which one — matching the original's `coeff > 0` /
    /// `coeff < 0` split.
    pub fn le_coeff_range(&self, i: usize, j: usize, coeff: &Rat) -> ComparisonRange {
        if coeff.is_zero() {
            if self.zero_equalities.contains(&i) {
                return ComparisonRange::new(Extended::NegInfty, Extended::Infty, false, false, false);
            }
            return match self.zero_inequalities.get(&i) {
                Some(Comp::Gt) => ComparisonRange::new(Extended::NegInfty, Extended::Infty, true, true, true),
                Some(Comp::Ge) => ComparisonRange::new(Extended::NegInfty, Extended::Infty, false, false, false),
                _ => ComparisonRange::empty(),
            };
        }
        if coeff.is_positive() {
            self.get_ge_range(j, i).scale(coeff)
        } else {
            self.get_le_range(j, i).scale(coeff)
        }
    }
}

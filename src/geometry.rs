//! The geometry kernel (§4.1): half-planes over a pair of indexed terms,
//! rotational (clockwise) ordering between them, and the `ComparisonRange`
//! value type used by the coefficient-range queries.
//!
//! A `Halfplane` never canonicalizes its direction vector's magnitude — only
//! its *direction* matters, so every comparison here (`eq_dir`, `opp_dir`,
//! `compare_hp`) is built to be magnitude-independent.

use crate::rational::{one, zero, Extended, Rat};
use crate::term::comparison::{Comp, TermComparison};
use crate::term::term::{STerm, Term};
use num_traits::{Signed, Zero};
use smallvec::SmallVec;

/// The closed (or, if `strong`, open) half-plane `{(x, y) : a*x + b*y >= 0}`
/// (`> 0` when `strong`). `(a, b)` is always nonzero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halfplane {
    pub a: Rat,
    pub b: Rat,
    pub strong: bool,
}

impl Halfplane {
    pub fn new(a: Rat, b: Rat, strong: bool) -> Self {
        debug_assert!(!(a.is_zero() && b.is_zero()), "half-plane direction vector must be nonzero");
        Halfplane { a, b, strong }
    }

    /// Build the half-plane equivalent of `x comp c*y`. Only `Lt`/`Le`/`Gt`/`Ge`
    /// are meaningful here; `Eq`/`Ne` have no half-plane representation.
    pub fn of_comp(comp: Comp, c: &Rat) -> Halfplane {
        match comp {
            Comp::Le => Halfplane::new(-one(), c.clone(), false),
            Comp::Lt => Halfplane::new(-one(), c.clone(), true),
            Comp::Ge => Halfplane::new(one(), -c, false),
            Comp::Gt => Halfplane::new(one(), -c, true),
            _ => panic!("Halfplane::of_comp: comp must be one of <,<=,>,>=, got {:?}", comp),
        }
    }

    /// Same direction (parallel, same orientation): collinear and the dot
    /// product of direction vectors is positive.
    pub fn eq_dir(&self, other: &Halfplane) -> bool {
        let cross = &self.a * &other.b - &self.b * &other.a;
        let dot = &self.a * &other.a + &self.b * &other.b;
        cross.is_zero() && dot.is_positive()
    }

    /// Parallel, opposite orientation.
    pub fn opp_dir(&self, other: &Halfplane) -> bool {
        let cross = &self.a * &other.b - &self.b * &other.a;
        let dot = &self.a * &other.a + &self.b * &other.b;
        cross.is_zero() && dot.is_negative()
    }

    /// Sign of the oriented cross product of direction vectors: positive
    /// iff `other` is counter-clockwise of `self`. Ties (collinear
    /// direction vectors) return 0, whether same or opposite orientation.
    pub fn compare_hp(&self, other: &Halfplane) -> i32 {
        let cross = &self.a * &other.b - &self.b * &other.a;
        if cross.is_zero() {
            0
        } else if cross.is_positive() {
            1
        } else {
            -1
        }
    }

    /// Reconstruct `ti comp c*tj` from this half-plane. Assumes `a != 0`,
    /// which holds for every entry actually stored in
    /// `Blackboard::inequalities` — the degenerate `a == 0` half-planes
    /// built while folding in zero-sign facts (`get_halfplane_comparisons`)
    /// never reach this method.
    pub fn to_comp(&self, ti: Term, tj: Term) -> TermComparison {
        if self.a.is_zero() {
            let comp = if self.b.is_positive() {
                if self.strong { Comp::Gt } else { Comp::Ge }
            } else if self.strong {
                Comp::Lt
            } else {
                Comp::Le
            };
            return TermComparison::new(tj, comp, STerm::new(zero(), Term::One));
        }
        let c = -(&self.b) / &self.a;
        let comp = if self.a.is_positive() {
            if self.strong { Comp::Gt } else { Comp::Ge }
        } else if self.strong {
            Comp::Lt
        } else {
            Comp::Le
        };
        TermComparison::new(ti, comp, STerm::new(c, tj))
    }

    /// Swap the roles of x and y: `a*x + b*y` becomes `b*x + a*y`. Used when
    /// a fact known about `t_i` in `(i, j)` order is needed in `(j, i)`
    /// order, or vice versa.
    pub fn flip(&self) -> Halfplane {
        Halfplane::new(self.b.clone(), self.a.clone(), self.strong)
    }
}

/// Fold `new_hp` into the 0–2 half-planes of `old`, keeping only the two
/// extremal boundaries of the resulting convex cone, clockwise-ordered. This
/// is the non-assertive counterpart of `Blackboard::assert_inequality`'s
/// cone bookkeeping: it never raises, never learns an equality, and is used
/// only to prepare a query-time view (`get_halfplane_comparisons`) — so a
/// collinear-opposite pair (which `assert_inequality` would turn into a
/// learned equality) is left as the weaker of the two non-strict bounds
/// intersected, represented here simply by keeping whichever was already
/// present since that case cannot arise from sound input.
pub fn add_halfplane_comparison(new_hp: Halfplane, old: &[Halfplane]) -> SmallVec<[Halfplane; 2]> {
    for c in old {
        if c.eq_dir(&new_hp) {
            let mut result: SmallVec<[Halfplane; 2]> = old.iter().cloned().collect();
            if new_hp.strong {
                for e in result.iter_mut() {
                    if e.eq_dir(&new_hp) {
                        e.strong = true;
                    }
                }
            }
            return result;
        }
    }
    match old.len() {
        0 => {
            let mut v = SmallVec::new();
            v.push(new_hp);
            v
        }
        1 => {
            let existing = old[0].clone();
            if existing.compare_hp(&new_hp) > 0 {
                let mut v = SmallVec::new();
                v.push(new_hp);
                v.push(existing);
                v
            } else {
                let mut v = SmallVec::new();
                v.push(existing);
                v.push(new_hp);
                v
            }
        }
        _ => {
            let a_cw_n = old[0].compare_hp(&new_hp);
            let b_cw_n = old[1].compare_hp(&new_hp);
            let mut v = SmallVec::new();
            if a_cw_n > 0 && b_cw_n > 0 {
                v.push(new_hp);
                v.push(old[1].clone());
            } else if a_cw_n < 0 && b_cw_n < 0 {
                v.push(old[0].clone());
                v.push(new_hp);
            } else {
                v.push(old[0].clone());
                v.push(old[1].clone());
            }
            v
        }
    }
}

/// A range of coefficients `c` for which some parametric comparison
/// (`t_i <= c*t_j`, `t_i >= c*t_j`, ...) is known to hold, plus the three
/// strictness bits downstream modules need to know whether the extreme
/// coefficients themselves are achievable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRange {
    pub lower: Extended,
    pub upper: Extended,
    /// The comparison is strict at `lower` (`c = lower` is excluded).
    pub lower_strict: bool,
    /// The comparison is strict in the interior of the range (away from
    /// its endpoints) — distinct from the endpoint bits because a range
    /// can be closed at both ends yet still only admit strict inequality
    /// everywhere in between (e.g. when `t_i`/`t_j` are known nonzero).
    pub interior_strong: bool,
    /// The comparison is strict at `upper`.
    pub upper_strict: bool,
}

impl ComparisonRange {
    pub fn new(
        lower: Extended,
        upper: Extended,
        lower_strict: bool,
        interior_strong: bool,
        upper_strict: bool,
    ) -> Self {
        ComparisonRange { lower, upper, lower_strict, interior_strong, upper_strict }
    }

    /// The distinguished empty range: no coefficient satisfies the query.
    pub fn empty() -> Self {
        ComparisonRange::new(Extended::Infty, Extended::NegInfty, false, false, false)
    }

    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    /// Multiply both endpoints by `k`, swapping them (and their strictness
    /// bits) when `k < 0` so `lower <= upper` is preserved.
    pub fn scale(&self, k: &Rat) -> ComparisonRange {
        if self.is_empty() {
            return self.clone();
        }
        let new_lower = self.lower.scale(k);
        let new_upper = self.upper.scale(k);
        if k.is_negative() {
            ComparisonRange::new(new_upper, new_lower, self.upper_strict, self.interior_strong, self.lower_strict)
        } else {
            ComparisonRange::new(new_lower, new_upper, self.lower_strict, self.interior_strong, self.upper_strict)
        }
    }

    /// Componentwise intersection: the narrower of the two bounds at each
    /// end, and — conservatively — a strictness bit set whenever either
    /// input already demanded it, since intersecting with a stricter
    /// constraint can never make a bound more permissive.
    pub fn intersect(&self, other: &ComparisonRange) -> ComparisonRange {
        if self.is_empty() || other.is_empty() {
            return ComparisonRange::empty();
        }
        let (lower, lower_strict) = match self.lower.cmp(&other.lower) {
            std::cmp::Ordering::Greater => (self.lower.clone(), self.lower_strict),
            std::cmp::Ordering::Less => (other.lower.clone(), other.lower_strict),
            std::cmp::Ordering::Equal => (self.lower.clone(), self.lower_strict || other.lower_strict),
        };
        let (upper, upper_strict) = match self.upper.cmp(&other.upper) {
            std::cmp::Ordering::Less => (self.upper.clone(), self.upper_strict),
            std::cmp::Ordering::Greater => (other.upper.clone(), other.upper_strict),
            std::cmp::Ordering::Equal => (self.upper.clone(), self.upper_strict || other.upper_strict),
        };
        let interior_strong = self.interior_strong || other.interior_strong;
        let result = ComparisonRange::new(lower, upper, lower_strict, interior_strong, upper_strict);
        if result.is_empty() {
            ComparisonRange::empty()
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::rat;

    #[test]
    fn of_comp_round_trips_through_to_comp() {
        for comp in [Comp::Lt, Comp::Le, Comp::Gt, Comp::Ge] {
            let c = rat(3, 2);
            let hp = Halfplane::of_comp(comp, &c);
            let back = hp.to_comp(Term::ivar(1), Term::ivar(2));
            assert_eq!(back.comp, comp);
            assert_eq!(back.term2.coeff, c);
        }
    }

    #[test]
    fn eq_dir_is_reflexive_and_scale_invariant() {
        let h = Halfplane::new(rat(1, 1), rat(-2, 1), false);
        let h2 = Halfplane::new(rat(2, 1), rat(-4, 1), true);
        assert!(h.eq_dir(&h2));
        assert!(!h.opp_dir(&h2));
    }

    #[test]
    fn opp_dir_detects_reversed_direction() {
        let h = Halfplane::new(rat(1, 1), rat(0, 1), false);
        let h2 = Halfplane::new(rat(-1, 1), rat(0, 1), false);
        assert!(h.opp_dir(&h2));
        assert!(!h.eq_dir(&h2));
    }

    #[test]
    fn compare_hp_is_antisymmetric() {
        let h = Halfplane::new(one(), zero(), false);
        let h2 = Halfplane::new(zero(), one(), false);
        assert_eq!(h.compare_hp(&h2), -h2.compare_hp(&h));
    }

    #[test]
    fn flip_swaps_a_and_b() {
        let h = Halfplane::new(rat(3, 1), rat(-5, 1), true);
        let f = h.flip();
        assert_eq!(f.a, rat(-5, 1));
        assert_eq!(f.b, rat(3, 1));
    }

    #[test]
    fn comparison_range_scale_by_negative_swaps_and_flips_strictness() {
        let r = ComparisonRange::new(Extended::finite(rat(1, 1)), Extended::finite(rat(2, 1)), true, false, false);
        let s = r.scale(&rat(-1, 1));
        assert_eq!(s.lower, Extended::finite(rat(-2, 1)));
        assert_eq!(s.upper, Extended::finite(rat(-1, 1)));
        assert!(s.upper_strict);
        assert!(!s.lower_strict);
    }

    #[test]
    fn intersect_narrows_to_tighter_bounds() {
        let a = ComparisonRange::new(Extended::NegInfty, Extended::finite(rat(5, 1)), false, false, false);
        let b = ComparisonRange::new(Extended::finite(rat(1, 1)), Extended::Infty, false, false, false);
        let i = a.intersect(&b);
        assert_eq!(i.lower, Extended::finite(rat(1, 1)));
        assert_eq!(i.upper, Extended::finite(rat(5, 1)));
    }

    #[test]
    fn intersect_with_empty_is_empty() {
        let a = ComparisonRange::new(Extended::finite(rat(1, 1)), Extended::finite(rat(5, 1)), false, false, false);
        assert!(a.intersect(&ComparisonRange::empty()).is_empty());
    }
}

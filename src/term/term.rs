//! The pure term algebra (§3): a closed five-shape term, its canonical key, and
//! canonization/substitution over it.
//!
//! Terms are values, not arena handles — the indexed DAG that gives `IVar`
//! indices their meaning lives on the Blackboard (`blackboard::term_table`),
//! not here. This module only knows how to build, key, canonize, and
//! substitute into terms.

use crate::rational::{one, zero, Rat};
use num_traits::Zero;
use smallvec::SmallVec;
use std::fmt;

/// A deterministic structural identifier: equal iff two terms are syntactically
/// equal after canonization (constant folding, sum/product factors ordered by
/// subterm key, coefficients absorbed).
pub type TermKey = String;

/// A term: the distinguished constant `1`, an uninterpreted variable, a
/// reference to an indexed Blackboard term, a sum, a product, or an
/// application of an uninterpreted function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    One,
    Var(String),
    IVar(usize),
    AddTerm(SmallVec<[STerm; 4]>),
    MulTerm(SmallVec<[MulPair; 4]>),
    FuncTerm(String, SmallVec<[STerm; 4]>),
}

/// A scaled subterm: `coeff * term`, the summand shape used by `AddTerm` and
/// the argument shape used by `FuncTerm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct STerm {
    pub coeff: Rat,
    pub term: Term,
}

/// A factor raised to an integer power, the shape used by `MulTerm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MulPair {
    pub term: Term,
    pub exponent: i64,
}

impl STerm {
    pub fn new(coeff: Rat, term: Term) -> Self {
        STerm { coeff, term }
    }

    pub fn key(&self) -> TermKey {
        format!("{}*{}", self.coeff, self.term.key())
    }

    /// `k * self`.
    pub fn scale(&self, k: &Rat) -> STerm {
        STerm::new(&self.coeff * k, self.term.clone())
    }

    pub fn canonize(&self) -> STerm {
        let c = self.term.canonize();
        STerm::new(&self.coeff * &c.coeff, c.term)
    }
}

impl From<Term> for STerm {
    fn from(term: Term) -> Self {
        STerm::new(one(), term)
    }
}

impl MulPair {
    pub fn new(term: Term, exponent: i64) -> Self {
        MulPair { term, exponent }
    }

    pub fn key(&self) -> TermKey {
        format!("{}^{}", self.term.key(), self.exponent)
    }
}

impl Term {
    pub fn var(name: impl Into<String>) -> Term {
        Term::Var(name.into())
    }

    pub fn ivar(i: usize) -> Term {
        Term::IVar(i)
    }

    pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = STerm>) -> Term {
        Term::FuncTerm(name.into(), args.into_iter().collect())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Term::One)
    }

    pub fn is_ivar(&self) -> bool {
        matches!(self, Term::IVar(_))
    }

    /// The index of this term if it is an `IVar`.
    pub fn as_ivar(&self) -> Option<usize> {
        match self {
            Term::IVar(i) => Some(*i),
            _ => None,
        }
    }

    /// The deterministic structural identifier described at the module level.
    /// Does not canonize first — callers that need key equality to track
    /// semantic equality must canonize before keying.
    pub fn key(&self) -> TermKey {
        match self {
            Term::One => "1".to_string(),
            Term::Var(name) => format!("v:{}", name),
            Term::IVar(i) => format!("i:{}", i),
            Term::AddTerm(args) => {
                let mut parts: Vec<TermKey> = args.iter().map(STerm::key).collect();
                parts.sort();
                format!("(+{})", parts.join(","))
            }
            Term::MulTerm(args) => {
                let mut parts: Vec<TermKey> = args.iter().map(MulPair::key).collect();
                parts.sort();
                format!("(*{})", parts.join(","))
            }
            Term::FuncTerm(name, args) => {
                let parts: Vec<TermKey> = args.iter().map(STerm::key).collect();
                format!("{}({})", name, parts.join(","))
            }
        }
    }

    /// Fold constants, flatten nested sums/products, combine like subterms by
    /// key, drop zero coefficients/exponents, and order the remaining factors
    /// by key. Returns the canonized term wrapped in its leading coefficient
    /// (1 for anything that isn't itself a pure scalar).
    pub fn canonize(&self) -> STerm {
        match self {
            Term::One => STerm::new(one(), Term::One),
            Term::Var(_) | Term::IVar(_) => STerm::new(one(), self.clone()),
            Term::AddTerm(args) => canonize_add(args),
            Term::MulTerm(args) => canonize_mul(args),
            Term::FuncTerm(name, args) => {
                let canon_args: SmallVec<[STerm; 4]> = args.iter().map(STerm::canonize).collect();
                STerm::new(one(), Term::FuncTerm(name.clone(), canon_args))
            }
        }
    }

    /// Replace every leaf whose key appears in `subs`. Used by
    /// `blackboard::expand_term` to substitute `IVar(i)` leaves with their
    /// full definitions.
    pub fn substitute(&self, subs: &ahash::AHashMap<TermKey, Term>) -> Term {
        match self {
            Term::One => Term::One,
            Term::Var(_) | Term::IVar(_) => {
                subs.get(&self.key()).cloned().unwrap_or_else(|| self.clone())
            }
            Term::AddTerm(args) => Term::AddTerm(
                args.iter()
                    .map(|a| STerm::new(a.coeff.clone(), a.term.substitute(subs)))
                    .collect(),
            ),
            Term::MulTerm(args) => Term::MulTerm(
                args.iter()
                    .map(|a| MulPair::new(a.term.substitute(subs), a.exponent))
                    .collect(),
            ),
            Term::FuncTerm(name, args) => Term::FuncTerm(
                name.clone(),
                args.iter()
                    .map(|a| STerm::new(a.coeff.clone(), a.term.substitute(subs)))
                    .collect(),
            ),
        }
    }
}

fn pow_rat(r: &Rat, exponent: i64) -> Rat {
    if exponent == 0 {
        return one();
    }
    let mut result = one();
    for _ in 0..exponent.unsigned_abs() {
        result = &result * r;
    }
    if exponent < 0 {
        crate::rational::recip(&result)
    } else {
        result
    }
}

fn canonize_add(args: &[STerm]) -> STerm {
    let mut constant = zero();
    let mut terms: Vec<(TermKey, Rat, Term)> = Vec::new();

    let mut fold = |coeff: Rat, term: Term, terms: &mut Vec<(TermKey, Rat, Term)>| {
        if term.is_one() {
            constant = &constant + &coeff;
            return;
        }
        let key = term.key();
        if let Some(slot) = terms.iter_mut().find(|(k, _, _)| *k == key) {
            slot.1 = &slot.1 + &coeff;
        } else {
            terms.push((key, coeff, term));
        }
    };

    for a in args {
        let c = a.term.canonize();
        let coeff = &a.coeff * &c.coeff;
        match c.term {
            Term::AddTerm(inner) => {
                for it in inner {
                    fold(&coeff * &it.coeff, it.term, &mut terms);
                }
            }
            other => fold(coeff, other, &mut terms),
        }
    }

    terms.retain(|(_, c, _)| !c.is_zero());
    terms.sort_by(|a, b| a.0.cmp(&b.0));

    if terms.is_empty() {
        return STerm::new(constant, Term::One);
    }
    if terms.len() == 1 && constant.is_zero() {
        let (_, coeff, term) = terms.into_iter().next().unwrap();
        return STerm::new(coeff, term);
    }
    let mut sterms: SmallVec<[STerm; 4]> =
        terms.into_iter().map(|(_, c, t)| STerm::new(c, t)).collect();
    if !constant.is_zero() {
        sterms.push(STerm::new(constant, Term::One));
        sterms.sort_by(|a, b| a.key().cmp(&b.key()));
    }
    STerm::new(one(), Term::AddTerm(sterms))
}

fn canonize_mul(args: &[MulPair]) -> STerm {
    let mut overall_coeff = one();
    let mut factors: Vec<(TermKey, i64, Term)> = Vec::new();

    let mut fold = |exponent: i64, term: Term, factors: &mut Vec<(TermKey, i64, Term)>| {
        if term.is_one() {
            return;
        }
        let key = term.key();
        if let Some(slot) = factors.iter_mut().find(|(k, _, _)| *k == key) {
            slot.1 += exponent;
        } else {
            factors.push((key, exponent, term));
        }
    };

    for m in args {
        let c = m.term.canonize();
        overall_coeff = &overall_coeff * &pow_rat(&c.coeff, m.exponent);
        match c.term {
            Term::MulTerm(inner) => {
                for it in inner {
                    fold(it.exponent * m.exponent, it.term, &mut factors);
                }
            }
            other => fold(m.exponent, other, &mut factors),
        }
    }

    factors.retain(|(_, e, _)| *e != 0);
    factors.sort_by(|a, b| a.0.cmp(&b.0));

    if factors.is_empty() {
        return STerm::new(overall_coeff, Term::One);
    }
    if factors.len() == 1 && factors[0].1 == 1 {
        let (_, _, term) = factors.into_iter().next().unwrap();
        return STerm::new(overall_coeff, term);
    }
    let pairs: SmallVec<[MulPair; 4]> =
        factors.into_iter().map(|(_, e, t)| MulPair::new(t, e)).collect();
    STerm::new(overall_coeff, Term::MulTerm(pairs))
}

impl std::ops::Add for Term {
    type Output = Term;
    fn add(self, rhs: Term) -> Term {
        let mut args: SmallVec<[STerm; 4]> = SmallVec::new();
        args.push(STerm::from(self));
        args.push(STerm::from(rhs));
        Term::AddTerm(args)
    }
}

impl std::ops::Mul<Rat> for Term {
    type Output = STerm;
    fn mul(self, rhs: Rat) -> STerm {
        STerm::new(rhs, self)
    }
}

impl std::ops::Mul<&Rat> for Term {
    type Output = STerm;
    fn mul(self, rhs: &Rat) -> STerm {
        STerm::new(rhs.clone(), self)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::One => write!(f, "1"),
            Term::Var(name) => write!(f, "{}", name),
            Term::IVar(i) => write!(f, "t{}", i),
            Term::AddTerm(args) => {
                write!(f, "(")?;
                for (k, a) in args.iter().enumerate() {
                    if k > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Term::MulTerm(args) => {
                write!(f, "(")?;
                for (k, a) in args.iter().enumerate() {
                    if k > 0 {
                        write!(f, " * ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Term::FuncTerm(name, args) => {
                write!(f, "{}(", name)?;
                for (k, a) in args.iter().enumerate() {
                    if k > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for STerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coeff == one() {
            write!(f, "{}", self.term)
        } else {
            write!(f, "{}*{}", self.coeff, self.term)
        }
    }
}

impl fmt::Display for MulPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 1 {
            write!(f, "{}", self.term)
        } else {
            write!(f, "{}^{}", self.term, self.exponent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> Rat {
        crate::rational::rat(n, d)
    }

    #[test]
    fn canonize_folds_duplicate_summands() {
        let x = Term::var("x");
        let sum = Term::AddTerm(
            vec![STerm::new(rat(1, 1), x.clone()), STerm::new(rat(2, 1), x.clone())]
                .into_iter()
                .collect(),
        );
        let c = sum.canonize();
        assert_eq!(c.coeff, rat(3, 1));
        assert_eq!(c.term, x);
    }

    #[test]
    fn canonize_drops_zero_summand() {
        let x = Term::var("x");
        let y = Term::var("y");
        let sum = Term::AddTerm(
            vec![STerm::new(rat(0, 1), y), STerm::new(rat(1, 1), x.clone())]
                .into_iter()
                .collect(),
        );
        let c = sum.canonize();
        assert_eq!(c.term, x);
        assert_eq!(c.coeff, rat(1, 1));
    }

    #[test]
    fn canonize_is_order_independent() {
        let x = Term::var("x");
        let y = Term::var("y");
        let a = Term::AddTerm(
            vec![STerm::from(x.clone()), STerm::from(y.clone())].into_iter().collect(),
        );
        let b = Term::AddTerm(vec![STerm::from(y), STerm::from(x)].into_iter().collect());
        assert_eq!(a.canonize().term.key(), b.canonize().term.key());
    }

    #[test]
    fn canonize_combines_mul_exponents() {
        let x = Term::var("x");
        let prod = Term::MulTerm(
            vec![MulPair::new(x.clone(), 2), MulPair::new(x.clone(), -1)]
                .into_iter()
                .collect(),
        );
        let c = prod.canonize();
        assert_eq!(c.term, x);
        assert_eq!(c.coeff, rat(1, 1));
    }

    #[test]
    fn substitute_replaces_ivar_leaves() {
        let mut subs = ahash::AHashMap::default();
        subs.insert(Term::IVar(0).key(), Term::var("x"));
        let t = Term::AddTerm(vec![STerm::from(Term::IVar(0))].into_iter().collect());
        let s = t.substitute(&subs);
        assert_eq!(s, Term::AddTerm(vec![STerm::from(Term::var("x"))].into_iter().collect()));
    }
}

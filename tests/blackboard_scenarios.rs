use polya::prelude::*;
use polya::term::comparison::Literal;

fn zero_term() -> STerm {
    STerm::new(polya::rational::zero(), Term::One)
}

fn one_term() -> STerm {
    STerm::new(polya::rational::one(), Term::One)
}

#[test]
fn positive_plus_positive_cannot_be_negative() {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    bb.add(&[x.clone().gt(zero_term()), y.clone().gt(zero_term())]).unwrap();
    let sum = x + y;
    let res = bb.add(&[sum.lt(zero_term())]);
    assert!(res.unwrap_err().is_contradiction());
}

#[test]
fn disjoint_bounds_on_same_variable_contradict() {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    bb.add(&[x.clone().gt(one_term())]).unwrap();
    let res = bb.add(&[x.lt(zero_term())]);
    assert!(res.unwrap_err().is_contradiction());
}

#[test]
fn disequality_stays_implied_once_a_strict_inequality_subsumes_it() {
    // Once x > y is known, the explicit "x != y" entry becomes redundant
    // and is purged from the disequalities table, but it must still be
    // implied (via the strict inequality itself) rather than forgotten.
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    bb.add(&[x.clone().term_ne(y.clone())]).unwrap();
    bb.add(&[x.clone().gt(y.clone())]).unwrap();
    assert!(bb.implies_comparison(&x.term_ne(y)));
}

#[test]
fn equal_function_applications_transfer_known_value() {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    let fx = Term::func("f", vec![STerm::from(x.clone())]);
    let fy = Term::func("f", vec![STerm::from(y.clone())]);
    bb.add(&[fx.clone().term_eq(one_term())]).unwrap();
    bb.add(&[fx.term_eq(fy.clone())]).unwrap();
    assert!(bb.implies_comparison(&fy.term_eq(one_term())));
}

#[test]
fn mutual_non_strict_bounds_register_as_equality_not_inequality() {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    let ix = bb.add_term(&x);
    let iy = bb.add_term(&y);
    bb.add(&[x.clone().le(y.clone()), y.clone().le(x.clone())]).unwrap();
    let (lo, hi) = if ix < iy { (ix, iy) } else { (iy, ix) };
    assert!(bb.implies(lo, Comp::Eq, &rat(1, 1), hi));
    assert!(bb.get_halfplane_comparisons(lo, hi).is_empty());
}

#[test]
fn falsifying_one_clause_literal_forces_the_other_as_unit() {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    let ix = bb.add_term(&x);
    let iy = bb.add_term(&y);
    let x_pos = Literal::new(ix, Comp::Gt, polya::rational::zero(), 0);
    let y_pos = Literal::new(iy, Comp::Gt, polya::rational::zero(), 0);
    bb.assert_clause(vec![x_pos, y_pos]).unwrap();

    // Ruling out x > 0 leaves y > 0 as the clause's only live literal, which
    // must then be asserted outright rather than merely noted as pending.
    bb.add(&[x.le(zero_term())]).unwrap();
    assert!(bb.implies_zero_comparison(iy, Comp::Gt));
}

#[test]
fn contradiction_is_reached_without_ever_needing_retraction() {
    // Monotone saturation: every assertion before the final, contradictory
    // one must stick (no error) since there is no backtracking mechanism.
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    let z = Term::var("z");
    assert!(bb.add(&[x.clone().gt(zero_term())]).is_ok());
    assert!(bb.add(&[y.clone().gt(zero_term())]).is_ok());
    assert!(bb.add(&[z.clone().term_eq(STerm::new(rat(1, 1), x.clone()))]).is_ok());
    assert!(bb.add(&[z.clone().gt(STerm::new(rat(2, 1), y.clone()))]).is_ok());
    let res = bb.add(&[z.le(STerm::new(rat(2, 1), y))]);
    assert!(res.unwrap_err().is_contradiction());
}

#[test]
fn sandwiched_zero_sign_fact_propagates_to_the_other_variable() {
    // x >= 2y and y >= 3x together force 2y <= x <= y/3; once x > 0 is
    // known too, that wedge sandwiches y's own axis, so y < 0 is forced
    // even though no fact mentions y directly. Asserting y >= 0 afterward
    // must then contradict.
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    let iy = bb.add_term(&y);
    bb.add(&[x.clone().ge(STerm::new(rat(2, 1), y.clone())), y.clone().ge(STerm::new(rat(3, 1), x.clone()))]).unwrap();
    bb.add(&[x.gt(zero_term())]).unwrap();

    assert!(bb.implies_zero_comparison(iy, Comp::Lt));

    let res = bb.add(&[y.ge(zero_term())]);
    assert!(res.unwrap_err().is_contradiction());
}

#[test]
fn range_query_reports_known_coefficient_bounds() {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    let ix = bb.add_term(&x);
    let iy = bb.add_term(&y);
    bb.add(&[x.clone().le(STerm::new(rat(5, 1), y.clone())), y.gt(zero_term())]).unwrap();

    // x <= 5*y with y > 0 known: x <= c*y holds for every c >= 5 (a larger
    // multiplier only loosens the bound further), so the lower end of the
    // range is pinned at 5 and the upper end is unbounded.
    let range = bb.get_le_range(ix, iy);
    assert!(!range.is_empty());
    assert_eq!(range.lower.value().cloned(), Some(rat(5, 1)));
    assert!(!range.lower_strict);
    assert!(range.upper.is_infinite());
    assert!(range.interior_strong);
}

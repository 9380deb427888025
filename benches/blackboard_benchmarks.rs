use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polya::prelude::*;

fn zero_term() -> STerm {
    STerm::new(polya::rational::zero(), Term::One)
}

fn benchmark_term_registration(c: &mut Criterion) {
    c.bench_function("term_registration", |b| {
        b.iter(|| {
            let mut bb = Blackboard::new();
            for i in 0..50 {
                let v = Term::var(format!("x{i}"));
                black_box(bb.add_term(&v));
            }
        })
    });
}

fn benchmark_chained_inequalities(c: &mut Criterion) {
    c.bench_function("chained_inequalities", |b| {
        b.iter(|| {
            let mut bb = Blackboard::new();
            let vars: Vec<Term> = (0..20).map(|i| Term::var(format!("x{i}"))).collect();
            for pair in vars.windows(2) {
                bb.add(&[pair[0].clone().le(pair[1].clone())]).unwrap();
            }
            black_box(bb.num_terms());
        })
    });
}

fn benchmark_halfplane_cone_folding(c: &mut Criterion) {
    c.bench_function("halfplane_cone_folding", |b| {
        b.iter(|| {
            let mut bb = Blackboard::new();
            let x = Term::var("x");
            let y = Term::var("y");
            for k in 1..30 {
                let coeff = rat(k, 1);
                let _ = bb.add(&[x.clone().le(STerm::new(coeff, y.clone()))]);
            }
            let ix = bb.add_term(&x);
            let iy = bb.add_term(&y);
            black_box(bb.get_halfplane_comparisons(ix, iy));
        })
    });
}

fn benchmark_range_query(c: &mut Criterion) {
    let mut bb = Blackboard::new();
    let x = Term::var("x");
    let y = Term::var("y");
    bb.add(&[x.clone().le(STerm::new(rat(5, 1), y.clone())), y.clone().gt(zero_term())]).unwrap();
    let ix = bb.add_term(&x);
    let iy = bb.add_term(&y);

    c.bench_function("le_coeff_range_query", |b| {
        b.iter(|| black_box(bb.get_le_range(ix, iy)))
    });
}

criterion_group!(
    benches,
    benchmark_term_registration,
    benchmark_chained_inequalities,
    benchmark_halfplane_cone_folding,
    benchmark_range_query
);
criterion_main!(benches);

#[macro_use]
extern crate criterion;
extern crate mandelcalc;

use criterion::Criterion;
use mandelcalc::{
    BatchCalculator, LineCalculator, MandelCalculator, NaiveCalculator, ThreadedCalculator,
};

const SIZE: usize = 1024;
const LIMIT: u32 = 100;

fn line(c: &mut Criterion) {
    let mut calc = LineCalculator::new(SIZE, LIMIT).unwrap();
    c.bench_function("line 1024", move |b| b.iter(|| calc.calculate()[0]));
}

fn batch(c: &mut Criterion) {
    let mut calc = BatchCalculator::new(SIZE, LIMIT).unwrap();
    c.bench_function("batch 1024", move |b| b.iter(|| calc.calculate()[0]));
}

fn threaded(c: &mut Criterion) {
    let mut calc = ThreadedCalculator::new(SIZE, LIMIT).unwrap();
    c.bench_function("threaded 1024", move |b| b.iter(|| calc.calculate()[0]));
}

fn naive(c: &mut Criterion) {
    let mut calc = NaiveCalculator::new(SIZE / 4, LIMIT).unwrap();
    c.bench_function("naive 256", move |b| b.iter(|| calc.calculate()[0]));
}

criterion_group!(benches, line, batch, threaded, naive);
criterion_main!(benches);

#[macro_use]
extern crate criterion;

use criterion::{BenchmarkId, Criterion};
use hyperlog_bitfield::{Bitfield, Pager};

fn bench(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("Pager growth");
        let inputs = [1_000usize, 100_000, 1_000_000];
        for input in inputs.iter() {
            group.bench_with_input(BenchmarkId::new("pages", input), &input, |b, &&size| {
                b.iter(|| {
                    let mut pager = Pager::new(0);
                    pager.get_or_alloc(1);
                    pager.get_or_alloc(size);
                    pager
                });
            });
        }
    }

    c.bench_function("Bitfield set_bit sequential", |b| {
        b.iter(|| {
            let mut bitfield = Bitfield::new(0);
            for bit in 0..(1u64 << 16) {
                bitfield.set_bit(bit, true);
            }
            bitfield
        });
    });

    c.bench_function("Bitfield to_compressed", |b| {
        let mut bitfield = Bitfield::new(0);
        for bit in (0..(1u64 << 20)).step_by(3) {
            bitfield.set_bit(bit, true);
        }
        bitfield.set_byte(1 << 22, 1);
        b.iter(|| bitfield.to_compressed());
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench
);
criterion_main!(benches);

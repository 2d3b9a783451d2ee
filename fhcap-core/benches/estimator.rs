use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fhcap_core::{BufferedEstimator, NoBufferEstimator, Rate, SlotTrace};
use rand_chacha::ChaChaRng;
use rand_core::{Rng, SeedableRng as _};

fn unit_sample<R: Rng>(rng: &mut R) -> f64 {
    (rng.next_u64() as f64) / (u64::MAX as f64 + 1.0)
}

fn synthetic_trace(slots: usize) -> SlotTrace {
    let mut rng = ChaChaRng::seed_from_u64(97);
    let rates = (0..slots)
        .map(|_| {
            let u = unit_sample(&mut rng);
            // Mostly quiet with sporadic 10x bursts, the shape the
            // estimators are built for.
            if u < 0.1 { 200.0 * u } else { 2.0 * u }
        })
        .collect();
    SlotTrace::from_rates(rates).unwrap()
}

fn smoothing(c: &mut Criterion) {
    let trace = synthetic_trace(100_000);

    c.bench_function("smooth_100k_slots", |b| {
        b.iter(|| black_box(&trace).smoothed(black_box(20)))
    });
}

fn simulation_pass(c: &mut Criterion) {
    let estimator = BufferedEstimator::new();
    let trace = synthetic_trace(100_000);
    let capacity = Rate::new(2.0).unwrap();

    c.bench_function("loss_ratio_100k_slots", |b| {
        b.iter(|| estimator.loss_ratio(black_box(&trace), black_box(capacity)))
    });
}

fn full_estimates(c: &mut Criterion) {
    let trace = synthetic_trace(20_000);
    let no_buffer = NoBufferEstimator::new();
    let buffered = BufferedEstimator::new();

    c.bench_function("no_buffer_estimate_20k_slots", |b| {
        b.iter(|| no_buffer.estimate(black_box(&trace)))
    });
    c.bench_function("buffered_estimate_20k_slots", |b| {
        b.iter(|| buffered.estimate(black_box(&trace)))
    });
}

criterion_group!(benches, smoothing, simulation_pass, full_estimates);
criterion_main!(benches);

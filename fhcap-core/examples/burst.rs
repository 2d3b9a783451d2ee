//! Buffer sweep: how much capacity a bursty trace needs at different
//! buffer margins.
//!
//! Generates one synthetic bursty trace and prints the no-buffer
//! percentile bound next to the buffered requirement over a range of
//! buffer times. The larger the margin, the closer the requirement drops
//! toward the average rate.
//!
//! Run with:
//!   cargo run --example burst -p fhcap-core

use anyhow::Result;
use fhcap_core::{BufferedEstimator, NoBufferEstimator, SlotTrace};
use rand_chacha::ChaChaRng;
use rand_core::{Rng, SeedableRng as _};
use std::time::Duration;

fn unit_sample<R: Rng>(rng: &mut R) -> f64 {
    (rng.next_u64() as f64) / (u64::MAX as f64 + 1.0)
}

fn main() -> Result<()> {
    let mut rng = ChaChaRng::seed_from_u64(11);

    // 2 seconds of 500µs slots: around 2 Gbps with occasional bursts up
    // to ten times that.
    let rates = (0..4_000)
        .map(|_| {
            let u = unit_sample(&mut rng);
            if u < 0.1 { 200.0 * u } else { 2.0 * u }
        })
        .collect();
    let trace = SlotTrace::from_rates(rates)?;

    let no_buffer = NoBufferEstimator::new().estimate(&trace);
    println!("average traffic:    {}", no_buffer.average_traffic);
    println!("no-buffer capacity: {}", no_buffer.required_capacity);
    println!();

    println!("buffer margin    required capacity");
    for micros in [0, 50, 143, 250, 500, 1_000] {
        let estimate = BufferedEstimator::new()
            .with_buffer_time(Duration::from_micros(micros))
            .estimate(&trace);
        println!("{micros:>11}µs    {}", estimate.required_capacity);
    }

    Ok(())
}

//! End-to-end demo: synthesize a site worth of cells, recover the link
//! topology from their loss patterns and size every link.
//!
//! Each true link congests on its own schedule. Member cells inherit the
//! schedule in both their traffic and their loss, which is exactly the
//! correlation the topology inference keys on.
//!
//! Run with:
//!   cargo run --example plan -p fhcap

use std::collections::HashMap;

use anyhow::Result;
use clap::Parser;
use fhcap::{
    CapacityPlanner, CellId, CellSignal, LossLimit, SlotState, SlotTrace, TopologyInference,
};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

#[derive(Parser)]
struct Command {
    /// number of cells to synthesize
    #[arg(long, default_value = "24")]
    cells: usize,

    /// number of physical links behind the cells
    #[arg(long, default_value = "3")]
    links: usize,

    /// trace length in 500µs slots
    #[arg(long, default_value = "4000")]
    slots: usize,

    /// RNG seed, for reproducible runs
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cmd = Command::parse();

    let inference = TopologyInference::new().with_links(cmd.links)?;
    let mut rng = StdRng::seed_from_u64(cmd.seed);

    let mut signals = Vec::with_capacity(cmd.cells);
    let mut traces = HashMap::new();
    for index in 0..cmd.cells {
        let link = index % cmd.links;
        let cell = CellId::new(index as u64 + 1);

        let mut rates = Vec::with_capacity(cmd.slots);
        let mut losses = Vec::with_capacity(cmd.slots);
        for slot in 0..cmd.slots {
            let congested = (slot / 200) % cmd.links == link;
            let base: f64 = rng.gen_range(0.2..1.2);
            if congested {
                rates.push(base * 4.0);
                losses.push(rng.gen_range(0.02..0.3));
            } else {
                rates.push(base);
                losses.push(rng.gen_range(0.0..0.005));
            }
        }

        traces.insert(cell, SlotTrace::from_rates(rates)?);
        signals.push(CellSignal {
            cell,
            samples: losses,
        });
    }

    let limit = LossLimit::ONE_PERCENT;
    let lossy: usize = signals
        .iter()
        .map(|signal| {
            traces[&signal.cell]
                .as_slice()
                .iter()
                .zip(&signal.samples)
                .filter(|&(&rate, &loss)| SlotState::classify(rate, loss, limit) == SlotState::Lossy)
                .count()
        })
        .sum();
    println!(
        "{} cells over {} slots, {lossy} lossy slots in total",
        cmd.cells, cmd.slots
    );

    let groups = inference.infer(&signals)?;
    println!("\nrecovered topology:");
    for group in &groups {
        println!("  {group}");
    }

    let report = CapacityPlanner::new().plan_groups(&groups, &traces);
    println!("\n{report}");

    Ok(())
}

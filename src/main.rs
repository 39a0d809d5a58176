use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dmxp_simfifo::Core::{Kernel, StopReason};
use dmxp_simfifo::FIFO::{ChannelBuilder, Consumer, Producer};

/// Producer/consumer pair exchanging a counter through a bounded FIFO on a
/// simulated clock.
#[derive(Parser, Debug)]
#[command(name = "simfifo", version, about)]
struct Args {
    /// Number of slots in the channel.
    #[arg(long, default_value_t = 4)]
    capacity: usize,

    /// Logical delay before each write, in nanoseconds.
    #[arg(long, default_value_t = 1)]
    producer_period_ns: u64,

    /// Logical delay before each read, in nanoseconds.
    #[arg(long, default_value_t = 4)]
    consumer_period_ns: u64,

    /// Length of the simulated run in nanoseconds; 0 runs until Ctrl+C or until
    /// no task can make progress.
    #[arg(long, default_value_t = 100)]
    run_ns: u64,

    /// Stop producing after this many values.
    #[arg(long)]
    count: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let channel = Arc::new(
        ChannelBuilder::new()
            .with_capacity(args.capacity)
            .with_name("Channel1")
            .build::<u64>()?,
    );

    let mut producer = Producer::new(
        Arc::clone(&channel),
        Duration::from_nanos(args.producer_period_ns),
    )
    .on_emit(|now, value| println!("@{now} P: {value}"));
    if let Some(count) = args.count {
        producer = producer.with_limit(count);
    }

    let consumer = Consumer::new(
        Arc::clone(&channel),
        Duration::from_nanos(args.consumer_period_ns),
    )
    .on_consume(|now, value| println!("@{now} C: {value}"));

    let mut kernel = Kernel::new();
    kernel.spawn("Producer1", move || producer.run())?;
    kernel.spawn("Consumer1", move || consumer.run())?;

    let stop = kernel.stop_handle();
    ctrlc::set_handler(move || stop.stop())?;

    let summary = if args.run_ns == 0 {
        kernel.run()?
    } else {
        kernel.run_for(Duration::from_nanos(args.run_ns))?
    };

    log::info!(
        "simulation ended at @{} after {} activations ({:?}), {} value(s) left in {:?}",
        summary.now,
        summary.activations,
        summary.reason,
        channel.len(),
        channel.occupancy(),
    );
    if summary.reason == StopReason::Starved {
        eprintln!("simulation starved at @{}", summary.now);
    }

    kernel.shutdown();
    Ok(())
}

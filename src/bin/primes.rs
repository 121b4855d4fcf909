use std::env;

use tracing::level_filters::LevelFilter;
use tracing_forest::ForestLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use erato::count_primes;

fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        println!("Usage: {} <start> <stop>", args[0]);
        return;
    }
    let start: u64 = args[1].parse().expect("Failed to parse start");
    let stop: u64 = args[2].parse().expect("Failed to parse stop");

    match count_primes(start, stop) {
        Ok(count) => println!("{} primes in [{}, {}]", count, start, stop),
        Err(e) => eprintln!("error: {}", e),
    }
}

mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use cachemodel::config::{MappingConfig, SimulationConfig};
use cachemodel::io::read_trace;
use cachemodel::simulator::Simulator;
use cachemodel::util::{generate_addresses, parse_address_list};

#[derive(Parser, Debug)]
#[command(about = String::from("Step through a single level cache one address at a time"))]
struct Args {
    /// File path to the JSON configuration
    config: PathBuf,

    /// Addresses to use instead of the configured ones, e.g. "29, 15, 0x43"
    #[arg(short, long, conflicts_with_all = ["trace", "random"])]
    addresses: Option<String>,

    /// File path to a trace of addresses to use instead of the configured ones
    #[arg(short, long, conflicts_with = "random")]
    trace: Option<PathBuf>,

    /// Generate this many random addresses instead of using the configured ones
    #[arg(short, long)]
    random: Option<usize>,

    /// Seed for generated addresses and random replacement
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured mapping
    #[arg(short, long, value_enum)]
    mapping: Option<MappingConfig>,

    /// Override the configured replacement policy
    #[arg(long)]
    policy: Option<String>,

    /// Wait for enter between addresses, showing the cache after each one
    #[arg(short, long)]
    step: bool,

    /// Print the result as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    /// Log every access and eviction
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }
    let mut config = SimulationConfig::from_path(&args.config)
        .with_context(|| format!("couldn't load the config file at path {}", args.config.display()))?;
    if let Some(mapping) = args.mapping {
        config.cache.mapping = mapping;
    }
    if let Some(policy) = &args.policy {
        config.cache.replacement_policy = policy.as_str().into();
    }
    if let Some(seed) = args.seed {
        config.cache.seed = seed;
    }
    let addresses = select_addresses(&args, &config)?;
    if addresses.is_empty() {
        bail!("no addresses to simulate, give them in the config or with --addresses, --trace or --random");
    }
    log::info!("simulating {} addresses", addresses.len());
    let mut simulator = Simulator::new(&config.cache, addresses).context("couldn't build the cache")?;

    if args.json {
        let result = simulator.run()?;
        println!("{}", serde_json::to_string_pretty(result).context("couldn't serialise the output")?);
    } else if args.step {
        step_interactively(&mut simulator)?;
    } else {
        println!("{}\n", render::header(simulator.model()));
        while let Some(step) = simulator.step() {
            let access = *step?;
            println!("{}", render::access(simulator.model(), &access));
        }
        println!("\n{}\n\n{}", render::cache_table(simulator.model()), render::summary(simulator.model()));
    }

    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = Instant::now() - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    Ok(())
}

/// Picks the address source: command line list, then trace file, then random, then the config
fn select_addresses(args: &Args, config: &SimulationConfig) -> anyhow::Result<Vec<i64>> {
    if let Some(list) = &args.addresses {
        return Ok(parse_address_list(list)?);
    }
    if let Some(trace) = &args.trace {
        return read_trace(trace).with_context(|| format!("couldn't read the trace file at path {}", trace.display()));
    }
    if let Some(count) = args.random {
        let memory_size = u64::try_from(config.cache.memory_size).unwrap_or(0);
        let mut rng = ChaCha8Rng::seed_from_u64(config.cache.seed);
        return Ok(generate_addresses(memory_size, count, &mut rng));
    }
    Ok(config.addresses.clone())
}

fn step_interactively(simulator: &mut Simulator) -> anyhow::Result<()> {
    println!("{}", render::header(simulator.model()));
    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    while let Some(step) = simulator.step() {
        let access = *step?;
        println!("\n{}", render::access(simulator.model(), &access));
        println!("{}\n{}", render::cache_table(simulator.model()), render::summary(simulator.model()));
        if simulator.is_complete() {
            break;
        }
        print!("[{}/{}] enter for the next address, q to stop: ", simulator.position(), simulator.addresses().len());
        io::stdout().flush()?;
        let Some(line) = input.next() else {
            return Ok(());
        };
        if line?.trim() == "q" {
            return Ok(());
        }
    }
    println!("Simulation complete.");
    Ok(())
}

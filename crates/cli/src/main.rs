//! Cache hierarchy simulator CLI.
//!
//! This binary wires the library together for batch runs. It performs:
//! 1. **Argument parsing:** Positional geometry arguments in the classic
//!    `sim` order, or a JSON configuration file.
//! 2. **Simulation:** Streams the trace file through the hierarchy.
//! 3. **Reporting:** Prints the configuration banner, per-set contents, and
//!    the lettered measurements to stdout.

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachesim_core::config::LevelConfig;
use cachesim_core::stats::write_report;
use cachesim_core::{trace, Hierarchy, SimConfig};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    version,
    about = "Trace-driven two-level set-associative cache simulator",
    long_about = "Simulates a write-back, write-allocate (WBWA) cache hierarchy with LRU\n\
                  replacement, driven by a trace of read/write requests.\n\n\
                  Examples:\n  \
                  sim 32 8192 4 262144 8 0 0 gcc_trace.txt\n  \
                  sim --config l1_only.json gcc_trace.txt"
)]
struct Cli {
    /// JSON configuration file replacing the positional geometry arguments.
    #[arg(long)]
    config: Option<String>,

    /// BLOCKSIZE L1_SIZE L1_ASSOC L2_SIZE L2_ASSOC PREF_N PREF_M TRACE_FILE,
    /// or just TRACE_FILE when --config is given.
    args: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, trace_file) = resolve_config(&cli);

    print_configuration(&config, &trace_file);

    let mut hierarchy = Hierarchy::new(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let entries = trace::open(&trace_file).unwrap_or_else(|e| {
        eprintln!("Error: Unable to open file {trace_file}: {e}");
        process::exit(1);
    });

    if let Err(e) = hierarchy.run(entries) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let totals = hierarchy.totals();
    let mut report = String::new();
    if write_report(&mut report, hierarchy.l1(), hierarchy.l2(), &totals).is_err() {
        eprintln!("Error: failed to format report");
        process::exit(1);
    }
    print!("{report}");
}

/// Builds the simulation configuration from either the JSON file or the
/// eight positional arguments, and returns it with the trace file path.
fn resolve_config(cli: &Cli) -> (SimConfig, String) {
    if let Some(ref config_path) = cli.config {
        if cli.args.len() != 1 {
            eprintln!("Error: with --config, pass exactly one argument: TRACE_FILE");
            process::exit(1);
        }
        let text = fs::read_to_string(config_path).unwrap_or_else(|e| {
            eprintln!("Error: Unable to open file {config_path}: {e}");
            process::exit(1);
        });
        let config: SimConfig = serde_json::from_str(&text).unwrap_or_else(|e| {
            eprintln!("Error: invalid configuration {config_path}: {e}");
            process::exit(1);
        });
        return (config, cli.args[0].clone());
    }

    if cli.args.len() != 8 {
        eprintln!(
            "Error: Expected 8 command-line arguments but was provided {}.",
            cli.args.len()
        );
        eprintln!(
            "Usage: sim BLOCKSIZE L1_SIZE L1_ASSOC L2_SIZE L2_ASSOC PREF_N PREF_M TRACE_FILE"
        );
        process::exit(1);
    }

    let number = |index: usize, label: &str| -> u32 {
        cli.args[index].parse().unwrap_or_else(|_| {
            eprintln!(
                "Error: {label} must be an unsigned integer, got '{}'.",
                cli.args[index]
            );
            process::exit(1);
        })
    };

    let config = SimConfig {
        block_bytes: number(0, "BLOCKSIZE"),
        l1: LevelConfig {
            size_bytes: number(1, "L1_SIZE"),
            assoc: number(2, "L1_ASSOC"),
        },
        l2: LevelConfig {
            size_bytes: number(3, "L2_SIZE"),
            assoc: number(4, "L2_ASSOC"),
        },
        pref_n: number(5, "PREF_N"),
        pref_m: number(6, "PREF_M"),
    };
    (config, cli.args[7].clone())
}

/// Prints the configuration banner; the trace file appears as its final
/// path component only.
fn print_configuration(config: &SimConfig, trace_file: &str) {
    let basename = Path::new(trace_file).file_name().map_or_else(
        || trace_file.to_string(),
        |n| n.to_string_lossy().into_owned(),
    );

    println!("===== Simulator configuration =====");
    println!("BLOCKSIZE:  {}", config.block_bytes);
    println!("L1_SIZE:    {}", config.l1.size_bytes);
    println!("L1_ASSOC:   {}", config.l1.assoc);
    println!("L2_SIZE:    {}", config.l2.size_bytes);
    println!("L2_ASSOC:   {}", config.l2.assoc);
    println!("PREF_N:     {}", config.pref_n);
    println!("PREF_M:     {}", config.pref_m);
    println!("trace_file: {basename}");
    println!();
}

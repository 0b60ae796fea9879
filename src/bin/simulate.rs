//! Runner balance simulator CLI.
//!
//! Plays many headless sessions to check obstacle density and unlock pacing.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                      # Default: 100 runs with autopilot
//!   cargo run --bin simulate -- -n 20 --no-autopilot
//!   cargo run --bin simulate -- --seed 42         # Reproducible run

use banana_runner::simulator::{run_simulation, SimConfig};
use banana_runner::utils::logging::init_stderr_logging;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);
    init_stderr_logging(if config.verbosity >= 2 { "debug" } else { "warn" });

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              BANANA RUNNER BALANCE SIMULATOR                  ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:           {}", config.num_runs);
    println!("  Max Ticks:      {}", config.max_ticks_per_run);
    println!("  Autopilot:      {}", config.autopilot);
    println!(
        "  Puzzle Rate:    {:.0}%",
        config.puzzle_success_rate * 100.0
    );
    println!(
        "  Spawn Every:    {}ms",
        config.runner.spawn_interval_ms
    );
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = run_simulation(&config);

    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match std::fs::write(&filename, json) {
            Ok(()) => println!("JSON report saved to: {}", filename),
            Err(e) => {
                eprintln!("Failed to write JSON report: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-t" | "--ticks" => {
                if i + 1 < args.len() {
                    config.max_ticks_per_run = args[i + 1].parse().unwrap_or(37_500);
                    i += 1;
                }
            }
            "--spawn-ms" => {
                if i + 1 < args.len() {
                    if let Ok(ms) = args[i + 1].parse() {
                        config.runner.spawn_interval_ms = ms;
                    }
                    i += 1;
                }
            }
            "--puzzle-rate" => {
                if i + 1 < args.len() {
                    if let Ok(rate) = args[i + 1].parse::<f64>() {
                        config.puzzle_success_rate = rate.clamp(0.0, 1.0);
                    }
                    i += 1;
                }
            }
            "--autopilot" => {
                config.autopilot = true;
            }
            "--no-autopilot" => {
                config.autopilot = false;
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--quick" => {
                config = SimConfig::quick(config.seed.unwrap_or(42));
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Banana Runner Balance Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>        Number of simulated sessions (default: 100)");
    println!("    -s, --seed <S>        Random seed for reproducibility");
    println!("    -t, --ticks <T>       Max ticks per run (default: 37,500)");
    println!("    --spawn-ms <MS>       Override the obstacle spawn interval");
    println!("    --puzzle-rate <P>     Chance of solving each puzzle attempt (0.0-1.0)");
    println!("    --autopilot           Dodge obstacles (default)");
    println!("    --no-autopilot        Run straight ahead");
    println!("    -v, --verbose         Per-run output");
    println!("    --json                Save JSON report");
    println!("    --quick               Quick test (10 seeded runs)");
    println!("    -h, --help            Show this help");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run --bin simulate                       # Default run");
    println!("    cargo run --bin simulate -- --seed 42          # Reproducible");
    println!("    cargo run --bin simulate -- --puzzle-rate 0    # No extra lives");
}

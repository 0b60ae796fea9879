//! Smoke tests for the headless simulator.

use banana_runner::config::RunnerConfig;
use banana_runner::simulator::{run_simulation, simulate_single_run, SimConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        num_runs: 4,
        max_ticks_per_run: 4_000,
        verbosity: 0,
        ..SimConfig::quick(seed)
    }
}

#[test]
fn test_simulation_report_is_consistent() {
    let report = run_simulation(&small_config(11));

    assert_eq!(report.num_runs, 4);
    assert_eq!(report.run_stats.len(), 4);
    assert!(report.min_final_score <= report.median_final_score);
    assert!(report.median_final_score <= report.max_final_score);
    assert!(report.avg_seconds_alive > 0.0);
    for stats in &report.run_stats {
        assert!(stats.ticks <= 4_000);
        assert!(stats.obstacles_passed + stats.collisions <= stats.obstacles_spawned);
        assert!(stats.extra_lives <= stats.collisions);
    }

    let text = report.to_text();
    assert!(!text.is_empty());
    let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
    assert_eq!(json["num_runs"], 4);
}

#[test]
fn test_same_seed_same_report() {
    let a = run_simulation(&small_config(99));
    let b = run_simulation(&small_config(99));
    assert_eq!(a.run_stats, b.run_stats);
}

#[test]
fn test_autopilot_outlasts_straight_runner() {
    let runner = RunnerConfig {
        spawn_interval_ms: 1_000,
        ..RunnerConfig::default()
    };
    let base = SimConfig {
        max_ticks_per_run: 6_000,
        puzzle_success_rate: 0.0,
        runner,
        verbosity: 0,
        ..SimConfig::default()
    };
    let straight = SimConfig {
        autopilot: false,
        ..base.clone()
    };

    let mut total_auto = 0;
    let mut total_straight = 0;
    for seed in 0..5 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        total_auto += simulate_single_run(&base, &mut rng).ticks;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        total_straight += simulate_single_run(&straight, &mut rng).ticks;
    }
    assert!(total_auto >= total_straight);
}

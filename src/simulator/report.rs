//! Simulation report generation.

use crate::progression::Tier;
use serde::Serialize;

/// Statistics from a single simulated session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub final_score: u64,
    pub ticks: u64,
    pub collisions: u32,
    pub extra_lives: u32,
    pub obstacles_spawned: u32,
    pub obstacles_passed: u32,
    pub tiers_unlocked: Vec<Tier>,
    /// Hit the tick limit while still alive.
    pub timed_out: bool,
}

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub runs_timed_out: u32,

    pub avg_final_score: f64,
    pub min_final_score: u64,
    pub max_final_score: u64,
    pub median_final_score: u64,
    pub avg_collisions: f64,
    pub avg_extra_lives: f64,
    /// Share of collisions that ended in a solved puzzle.
    pub extra_life_rate: f64,
    pub avg_obstacles_passed: f64,
    /// Seconds of running per session, at 16ms per tick.
    pub avg_seconds_alive: f64,

    /// Runs that reached each tier, indexed like `Tier::ALL`.
    pub tier_reach: [u32; 4],

    #[serde(skip)]
    pub run_stats: Vec<RunStats>,
}

impl SimReport {
    pub fn from_runs(runs: Vec<RunStats>) -> Self {
        let num_runs = runs.len() as u32;
        let n = num_runs.max(1) as f64;
        let runs_timed_out = runs.iter().filter(|r| r.timed_out).count() as u32;

        let avg = |f: &dyn Fn(&RunStats) -> f64| runs.iter().map(f).sum::<f64>() / n;
        let avg_final_score = avg(&|r| r.final_score as f64);
        let avg_collisions = avg(&|r| r.collisions as f64);
        let avg_extra_lives = avg(&|r| r.extra_lives as f64);
        let avg_obstacles_passed = avg(&|r| r.obstacles_passed as f64);
        let avg_seconds_alive = avg(&|r| r.ticks as f64 * 0.016);

        let total_collisions: u32 = runs.iter().map(|r| r.collisions).sum();
        let total_lives: u32 = runs.iter().map(|r| r.extra_lives).sum();
        let extra_life_rate = if total_collisions > 0 {
            total_lives as f64 / total_collisions as f64
        } else {
            0.0
        };

        let mut scores: Vec<u64> = runs.iter().map(|r| r.final_score).collect();
        scores.sort_unstable();
        let min_final_score = scores.first().copied().unwrap_or(0);
        let max_final_score = scores.last().copied().unwrap_or(0);
        let median_final_score = scores.get(scores.len() / 2).copied().unwrap_or(0);

        let mut tier_reach = [0u32; 4];
        for run in &runs {
            for tier in &run.tiers_unlocked {
                tier_reach[tier.index()] += 1;
            }
        }

        Self {
            num_runs,
            runs_timed_out,
            avg_final_score,
            min_final_score,
            max_final_score,
            median_final_score,
            avg_collisions,
            avg_extra_lives,
            extra_life_rate,
            avg_obstacles_passed,
            avg_seconds_alive,
            tier_reach,
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} still alive at tick limit\n\n",
            self.num_runs, self.runs_timed_out
        ));

        report.push_str("── SCORE ────────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Final Score:   {:.1}\n", self.avg_final_score));
        report.push_str(&format!("  Min Final Score:   {}\n", self.min_final_score));
        report.push_str(&format!("  Median Score:      {}\n", self.median_final_score));
        report.push_str(&format!("  Max Final Score:   {}\n", self.max_final_score));
        report.push_str(&format!(
            "  Avg Time Alive:    {:.0}s\n\n",
            self.avg_seconds_alive
        ));

        report.push_str("── OBSTACLES ────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Passed:        {:.1}\n",
            self.avg_obstacles_passed
        ));
        report.push_str(&format!("  Avg Collisions:    {:.2}\n", self.avg_collisions));
        report.push_str(&format!("  Avg Extra Lives:   {:.2}\n", self.avg_extra_lives));
        report.push_str(&format!(
            "  Puzzle Save Rate:  {:.1}%\n\n",
            self.extra_life_rate * 100.0
        ));

        report.push_str("── CHARACTER TIERS REACHED ──────────────────────────────────────\n");
        for tier in Tier::ALL {
            let reached = self.tier_reach[tier.index()];
            let pct = (reached as f64 / self.num_runs.max(1) as f64) * 100.0;
            let bar: String = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!(
                "  {:<7} ({:>3}): {:>5.1}% {}\n",
                tier.name(),
                tier.threshold(),
                pct,
                bar
            ));
        }
        report.push('\n');

        report.push_str("── PACING ───────────────────────────────────────────────────────\n");
        let rating = if self.avg_final_score < Tier::Green.threshold() as f64 {
            "TOO HARD - Most runs end before the first unlock"
        } else if self.avg_final_score < Tier::Red.threshold() as f64 {
            "GOOD - Unlocks arrive over several runs"
        } else {
            "TOO EASY - Every tier in a single run"
        };
        report.push_str(&format!("  Unlock Pacing:     {}\n", rating));
        if self.runs_timed_out * 2 > self.num_runs {
            report.push_str("  ⚠️  Most runs survived to the tick limit - obstacles too sparse?\n");
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64, collisions: u32, extra_lives: u32, tiers: &[Tier]) -> RunStats {
        RunStats {
            final_score: score,
            ticks: score * 63,
            collisions,
            extra_lives,
            obstacles_spawned: 10,
            obstacles_passed: 8,
            tiers_unlocked: tiers.to_vec(),
            timed_out: false,
        }
    }

    #[test]
    fn test_report_generation() {
        let runs = vec![
            run(40, 2, 1, &[Tier::Yellow]),
            run(120, 4, 3, &[Tier::Yellow, Tier::Green, Tier::Blue]),
        ];

        let report = SimReport::from_runs(runs);
        assert_eq!(report.num_runs, 2);
        assert!((report.avg_final_score - 80.0).abs() < 0.01);
        assert_eq!(report.min_final_score, 40);
        assert_eq!(report.max_final_score, 120);
        assert!((report.extra_life_rate - 4.0 / 6.0).abs() < 1e-9);
        assert_eq!(report.tier_reach, [2, 1, 1, 0]);
        assert!(report.to_text().contains("SIMULATION REPORT"));
    }

    #[test]
    fn test_empty_report_has_no_nans() {
        let report = SimReport::from_runs(Vec::new());
        assert_eq!(report.avg_final_score, 0.0);
        assert_eq!(report.extra_life_rate, 0.0);
        assert!(report.to_json().contains("\"num_runs\": 0"));
    }
}

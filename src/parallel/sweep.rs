//! Seed sweep: replay one matchup under many derived seeds to estimate outcome odds, e.g. for a
//! preview of a fleet that has not been committed to a mission yet.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{simulate_battle, BattleError, BattleInput, BattleResult, BattleSeed, Winner};
use crate::data::UnitRegistry;
use crate::parallel::pool::{PoolError, WorkerPool};

pub const DEFAULT_SWEEP_RUNS: u32 = 100;
/// Upper bound on runs accepted from the CLI and HTTP surfaces.
pub const MAX_SWEEP_RUNS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Battle(#[from] BattleError),
    #[error("runs must be between 1 and {MAX_SWEEP_RUNS}, got {0}")]
    RunsOutOfRange(u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub runs: u32,
    pub attacker_wins: u32,
    pub defender_wins: u32,
    pub draws: u32,
    pub attacker_win_rate: f64,
    pub mean_rounds: f64,
    pub mean_salvage_primary: f64,
    pub mean_salvage_secondary: f64,
}

/// Integer totals over finished runs. Merging is commutative, so the result does not depend on
/// how rayon splits the work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    runs: u32,
    attacker_wins: u32,
    defender_wins: u32,
    draws: u32,
    rounds: u64,
    salvage_primary: u64,
    salvage_secondary: u64,
}

impl Tally {
    fn of(result: &BattleResult) -> Self {
        let mut tally = Self {
            runs: 1,
            rounds: result.rounds.len() as u64,
            salvage_primary: result.salvage.primary,
            salvage_secondary: result.salvage.secondary,
            ..Self::default()
        };
        match result.winner {
            Winner::Attacker => tally.attacker_wins = 1,
            Winner::Defender => tally.defender_wins = 1,
            Winner::Draw => tally.draws = 1,
        }
        tally
    }

    fn merge(self, other: Self) -> Self {
        Self {
            runs: self.runs + other.runs,
            attacker_wins: self.attacker_wins + other.attacker_wins,
            defender_wins: self.defender_wins + other.defender_wins,
            draws: self.draws + other.draws,
            rounds: self.rounds + other.rounds,
            salvage_primary: self.salvage_primary + other.salvage_primary,
            salvage_secondary: self.salvage_secondary + other.salvage_secondary,
        }
    }

    fn summary(self) -> SweepSummary {
        if self.runs == 0 {
            return SweepSummary::default();
        }
        let runs = f64::from(self.runs);
        SweepSummary {
            runs: self.runs,
            attacker_wins: self.attacker_wins,
            defender_wins: self.defender_wins,
            draws: self.draws,
            attacker_win_rate: f64::from(self.attacker_wins) / runs,
            mean_rounds: self.rounds as f64 / runs,
            mean_salvage_primary: self.salvage_primary as f64 / runs,
            mean_salvage_secondary: self.salvage_secondary as f64 / runs,
        }
    }
}

/// Seed for sweep run `run`: integer seeds are offset, text seeds get a `#run` suffix.
pub fn derive_seed(seed: &BattleSeed, run: u32) -> BattleSeed {
    match seed {
        BattleSeed::Number(value) => BattleSeed::Number(value.wrapping_add(i64::from(run))),
        BattleSeed::Text(text) => BattleSeed::Text(format!("{text}#{run}")),
    }
}

/// Accept a run count from an outer surface: 1..=[MAX_SWEEP_RUNS].
pub fn check_run_count(runs: u32) -> Result<u32, SweepError> {
    if runs == 0 || runs > MAX_SWEEP_RUNS {
        return Err(SweepError::RunsOutOfRange(runs));
    }
    Ok(runs)
}

/// Run `runs` battles of the same matchup with derived seeds. Outcomes are folded as they finish,
/// so memory does not grow with `runs`; the summary is independent of the worker count.
pub fn sweep_seeds(
    input: &BattleInput,
    runs: u32,
    registry: &UnitRegistry,
    pool: &WorkerPool,
) -> Result<SweepSummary, SweepError> {
    let tally = pool.install(|| {
        (0..runs)
            .into_par_iter()
            .map(|run| {
                let mut variant = input.clone();
                variant.context.seed = derive_seed(&input.context.seed, run);
                simulate_battle(&variant, registry).map(|result| Tally::of(&result))
            })
            .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))
    })??;
    Ok(tally.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{BattleContext, Fleet, FleetStack};
    use crate::data::tech::TechBonuses;

    fn matchup(seed: BattleSeed) -> BattleInput {
        let fleet = |id: &str, stacks: Vec<FleetStack>| Fleet {
            id: id.to_string(),
            owner_id: id.to_string(),
            stacks,
            tech: TechBonuses::default(),
        };
        BattleInput {
            attacker: fleet("a", vec![FleetStack::new("storm_frigate", 5)]),
            defender: fleet("d", vec![FleetStack::new("coal_freighter", 4)]),
            context: BattleContext::new(seed),
        }
    }

    #[test]
    fn derived_seeds_are_distinct() {
        assert_eq!(derive_seed(&BattleSeed::Number(10), 3), BattleSeed::Number(13));
        assert_eq!(
            derive_seed(&BattleSeed::from("raid"), 2),
            BattleSeed::from("raid#2")
        );
    }

    #[test]
    fn outcome_counts_add_up_and_ignore_worker_count() {
        let registry = UnitRegistry::builtin();
        let input = matchup(BattleSeed::from("sweep"));
        let single = sweep_seeds(&input, 40, &registry, &WorkerPool::with_workers(1)).unwrap();
        let many = sweep_seeds(&input, 40, &registry, &WorkerPool::with_workers(4)).unwrap();
        assert_eq!(single, many);
        assert_eq!(single.runs, 40);
        assert_eq!(single.attacker_wins + single.defender_wins + single.draws, 40);
        assert!((0.0..=1.0).contains(&single.attacker_win_rate));
        assert!(single.mean_rounds <= 6.0);
    }

    #[test]
    fn zero_runs_yield_empty_summary() {
        let registry = UnitRegistry::builtin();
        let summary =
            sweep_seeds(&matchup(BattleSeed::Number(1)), 0, &registry, &WorkerPool::default())
                .unwrap();
        assert_eq!(summary, SweepSummary::default());
    }

    #[test]
    fn run_count_bounds() {
        assert_eq!(check_run_count(1).unwrap(), 1);
        assert_eq!(check_run_count(MAX_SWEEP_RUNS).unwrap(), MAX_SWEEP_RUNS);
        assert!(matches!(check_run_count(0), Err(SweepError::RunsOutOfRange(0))));
        let err = check_run_count(MAX_SWEEP_RUNS + 1).unwrap_err();
        assert_eq!(err.to_string(), "runs must be between 1 and 10000, got 10001");
    }

    #[test]
    fn tally_merge_is_order_independent() {
        let a = Tally {
            runs: 2,
            attacker_wins: 1,
            draws: 1,
            rounds: 9,
            salvage_primary: 550,
            ..Tally::default()
        };
        let b = Tally {
            runs: 1,
            defender_wins: 1,
            rounds: 3,
            salvage_secondary: 200,
            ..Tally::default()
        };
        assert_eq!(a.merge(b), b.merge(a));
        assert_eq!(a.merge(Tally::default()), a);
        assert_eq!(a.merge(b).summary().mean_rounds, 4.0);
    }

    #[test]
    fn invalid_matchup_is_reported() {
        let registry = UnitRegistry::builtin();
        let mut input = matchup(BattleSeed::Number(1));
        input.defender.stacks[0].count = -1;
        let err = sweep_seeds(&input, 5, &registry, &WorkerPool::default()).unwrap_err();
        assert!(matches!(err, SweepError::Battle(BattleError::InvalidUnitCount { .. })));
    }
}

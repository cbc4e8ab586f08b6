//! Parallel resolution of independent battles (e.g. every attack mission arriving in one tick).
//!
//! Each battle owns its generator and stack state, so the batch needs no locks and its output is
//! identical to resolving the inputs one by one.

use rayon::prelude::*;

use crate::combat::{simulate_battle, BattleError, BattleInput, BattleResult};
use crate::data::UnitRegistry;
use crate::parallel::pool::{PoolError, WorkerPool};

/// Resolve every input in parallel. Output order matches input order.
pub fn resolve_batch(
    inputs: &[BattleInput],
    registry: &UnitRegistry,
    pool: &WorkerPool,
) -> Result<Vec<Result<BattleResult, BattleError>>, PoolError> {
    pool.install(|| {
        inputs
            .par_iter()
            .map(|input| simulate_battle(input, registry))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{BattleContext, Fleet, FleetStack};
    use crate::data::tech::TechBonuses;

    fn fleet(id: &str, type_id: &str, count: i64) -> Fleet {
        Fleet {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            stacks: vec![FleetStack::new(type_id, count)],
            tech: TechBonuses::default(),
        }
    }

    #[test]
    fn batch_matches_sequential_resolution_in_order() {
        let registry = UnitRegistry::builtin();
        let inputs: Vec<BattleInput> = (0..12i64)
            .map(|i| BattleInput {
                attacker: fleet("a", "storm_frigate", 2 + i % 4),
                defender: fleet("d", "coal_freighter", 3),
                context: BattleContext::new(i),
            })
            .collect();
        let batch = resolve_batch(&inputs, &registry, &WorkerPool::with_workers(3)).unwrap();
        assert_eq!(batch.len(), inputs.len());
        for (input, result) in inputs.iter().zip(&batch) {
            assert_eq!(result, &simulate_battle(input, &registry));
        }
    }

    #[test]
    fn invalid_inputs_fail_individually() {
        let registry = UnitRegistry::builtin();
        let inputs = vec![
            BattleInput {
                attacker: fleet("a", "storm_frigate", 2),
                defender: fleet("d", "storm_frigate", 2),
                context: BattleContext::new("ok"),
            },
            BattleInput {
                attacker: fleet("a", "zeppelin", 2),
                defender: fleet("d", "storm_frigate", 2),
                context: BattleContext::new("bad"),
            },
        ];
        let batch = resolve_batch(&inputs, &registry, &WorkerPool::default()).unwrap();
        assert!(batch[0].is_ok());
        assert!(matches!(batch[1], Err(BattleError::UnknownUnitType { .. })));
    }
}

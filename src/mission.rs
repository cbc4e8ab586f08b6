//! Mission bookkeeping around the battle engine: arrival ticks, attack resolution and stored reports.
//!
//! A mission whose fleet cannot be found, or whose battle input is rejected, is logged and closed
//! on its own; the rest of the tick carries on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::combat::{BattleContext, BattleInput, BattleResult, Fleet, FleetStack, DEFAULT_ROUND_LIMIT};
use crate::data::{TechBonuses, UnitRegistry};
use crate::parallel::{resolve_batch, PoolError, WorkerPool};

pub const GARRISON_FLEET_ID: &str = "npc-garrison";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Attack,
    Transport,
    Colonize,
    Spy,
    Reinforce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    EnRoute,
    Arrived,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub kind: MissionKind,
    pub fleet_id: String,
    /// Fleet to engage; attack missions without one fight the NPC garrison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fleet_id: Option<String>,
    /// Milliseconds since the epoch.
    pub depart_at: u64,
    pub arrive_at: u64,
    pub status: MissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub resolved: usize,
    pub battles: usize,
    pub skipped: usize,
}

/// The defending NPC fleet used when an attack mission names no target.
pub fn garrison_fleet() -> Fleet {
    Fleet {
        id: GARRISON_FLEET_ID.to_string(),
        owner_id: "npc".to_string(),
        stacks: vec![
            FleetStack::new("coal_freighter", 3),
            FleetStack::new("aether_carrier", 1),
        ],
        tech: TechBonuses {
            armor_bonus: 0.1,
            arc_bonus: 0.1,
            tesla_bonus: 0.05,
            aether_bonus: 0.05,
            evasion_bonus: 0.04,
            accuracy_bonus: 0.05,
            initiative_bonus: 0.5,
        },
    }
}

#[derive(Debug, Clone, Default)]
pub struct MissionBoard {
    fleets: BTreeMap<String, Fleet>,
    missions: Vec<Mission>,
    reports: BTreeMap<String, BattleResult>,
}

impl MissionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a fleet.
    pub fn add_fleet(&mut self, fleet: Fleet) {
        self.fleets.insert(fleet.id.clone(), fleet);
    }

    pub fn remove_fleet(&mut self, fleet_id: &str) -> Option<Fleet> {
        self.fleets.remove(fleet_id)
    }

    pub fn fleet(&self, fleet_id: &str) -> Option<&Fleet> {
        self.fleets.get(fleet_id)
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn mission(&self, mission_id: &str) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id == mission_id)
    }

    /// Stored battle report, keyed by mission id.
    pub fn report(&self, mission_id: &str) -> Option<&BattleResult> {
        self.reports.get(mission_id)
    }

    /// Dispatch a fleet. Returns `None` (and logs) when the fleet is unknown.
    pub fn queue(
        &mut self,
        kind: MissionKind,
        fleet_id: &str,
        target_fleet_id: Option<&str>,
        depart_at: u64,
        arrive_at: u64,
    ) -> Option<&Mission> {
        if !self.fleets.contains_key(fleet_id) {
            warn!(fleet_id, "fleet not found, mission not queued");
            return None;
        }
        let mission = Mission {
            id: format!("mission-{}", Uuid::new_v4()),
            kind,
            fleet_id: fleet_id.to_string(),
            target_fleet_id: target_fleet_id.map(str::to_string),
            depart_at,
            arrive_at: arrive_at.max(depart_at),
            status: MissionStatus::EnRoute,
            report_id: None,
        };
        info!(mission_id = %mission.id, fleet_id, ?kind, "mission queued");
        self.missions.push(mission);
        self.missions.last()
    }

    /// Mark en-route missions whose arrival time has passed. Returns how many arrived.
    pub fn tick(&mut self, now: u64) -> usize {
        let mut arrived = 0;
        for mission in &mut self.missions {
            if mission.status == MissionStatus::EnRoute && mission.arrive_at <= now {
                mission.status = MissionStatus::Arrived;
                arrived += 1;
            }
        }
        arrived
    }

    /// Resolve every arrived mission. Attack battles run in parallel on `pool`, seeded by mission id.
    ///
    /// Nothing is changed until the batch has run, so a `PoolError` leaves the board untouched and
    /// the call can be retried.
    pub fn resolve_arrived(
        &mut self,
        registry: &UnitRegistry,
        pool: &WorkerPool,
    ) -> Result<ResolutionSummary, PoolError> {
        let plan = self.plan_arrived();
        let inputs: Vec<BattleInput> = plan
            .iter()
            .filter_map(|(_, step)| match step {
                Step::Battle(input) => Some(input.clone()),
                _ => None,
            })
            .collect();
        let mut outcomes = resolve_batch(&inputs, registry, pool)?.into_iter();

        let mut summary = ResolutionSummary::default();
        for (index, step) in plan {
            let mission = &mut self.missions[index];
            mission.status = MissionStatus::Resolved;
            summary.resolved += 1;
            match step {
                Step::Close => {}
                Step::Skip => summary.skipped += 1,
                Step::Battle(_) => match outcomes.next() {
                    Some(Ok(result)) => {
                        info!(mission_id = %mission.id, winner = ?result.winner, "attack resolved");
                        self.reports.insert(mission.id.clone(), result);
                        mission.report_id = Some(mission.id.clone());
                        summary.battles += 1;
                    }
                    Some(Err(err)) => {
                        warn!(mission_id = %mission.id, error = %err, "battle input rejected, mission closed without report");
                        summary.skipped += 1;
                    }
                    None => summary.skipped += 1,
                },
            }
        }

        Ok(summary)
    }

    fn plan_arrived(&self) -> Vec<(usize, Step)> {
        self.missions
            .iter()
            .enumerate()
            .filter(|(_, mission)| mission.status == MissionStatus::Arrived)
            .map(|(index, mission)| {
                let step = if mission.kind != MissionKind::Attack {
                    Step::Close
                } else {
                    battle_input(&self.fleets, mission).map_or(Step::Skip, Step::Battle)
                };
                (index, step)
            })
            .collect()
    }
}

/// What resolving one arrived mission involves.
enum Step {
    Close,
    Skip,
    Battle(BattleInput),
}

fn battle_input(fleets: &BTreeMap<String, Fleet>, mission: &Mission) -> Option<BattleInput> {
    let Some(attacker) = fleets.get(&mission.fleet_id) else {
        warn!(mission_id = %mission.id, fleet_id = %mission.fleet_id, "attacking fleet not found, mission closed");
        return None;
    };
    let defender = match &mission.target_fleet_id {
        Some(target_id) => match fleets.get(target_id) {
            Some(fleet) => fleet.clone(),
            None => {
                warn!(mission_id = %mission.id, fleet_id = %target_id, "target fleet not found, mission closed");
                return None;
            }
        },
        None => garrison_fleet(),
    };
    Some(BattleInput {
        attacker: attacker.clone(),
        defender,
        context: BattleContext::new(mission.id.as_str()).with_round_limit(DEFAULT_ROUND_LIMIT),
    })
}

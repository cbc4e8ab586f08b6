//! Battle orchestration: validates the input, builds stack state, runs rounds until one side is
//! eliminated or the round limit is reached, then assembles the immutable [BattleResult].
//!
//! A battle is a pure function of `(seed, attacker, defender, context)` and the registry. It owns
//! its generator and stack state, so any number of battles may run concurrently.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::combat::damage::{DamageProfile, LocationMods};
use crate::combat::rng::{BattleSeed, Rng};
use crate::combat::round::{resolve_round, side_alive, BattleLedger, RoundLog};
use crate::combat::stack::{Side, StackState};
use crate::data::tech::TechBonuses;
use crate::data::units::UnitRegistry;

pub const DEFAULT_ROUND_LIMIT: u32 = 6;

/// Lowest armor or channel bonus accepted; below it the scaled value turns negative.
pub const MIN_SCALING_BONUS: f64 = -1.0;

/// Tech fields applied as `base * (1 + bonus)`.
const SCALING_BONUSES: [&str; 4] = ["armorBonus", "arcBonus", "teslaBonus", "aetherBonus"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStack {
    pub type_id: String,
    pub count: i64,
}

impl FleetStack {
    pub fn new(type_id: impl Into<String>, count: i64) -> Self {
        Self {
            type_id: type_id.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fleet {
    pub id: String,
    pub owner_id: String,
    pub stacks: Vec<FleetStack>,
    #[serde(default)]
    pub tech: TechBonuses,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleContext {
    pub seed: BattleSeed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_mods: Option<LocationMods>,
}

impl BattleContext {
    pub fn new(seed: impl Into<BattleSeed>) -> Self {
        Self {
            seed: seed.into(),
            round_limit: None,
            location_mods: None,
        }
    }

    pub fn with_round_limit(mut self, round_limit: u32) -> Self {
        self.round_limit = Some(round_limit);
        self
    }

    pub fn round_limit(&self) -> u32 {
        self.round_limit.unwrap_or(DEFAULT_ROUND_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleInput {
    pub attacker: Fleet,
    pub defender: Fleet,
    pub context: BattleContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Attacker,
    Defender,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mvp {
    pub side: Side,
    pub type_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salvage {
    pub primary: u64,
    pub secondary: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingForces {
    pub attacker: Vec<FleetStack>,
    pub defender: Vec<FleetStack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Winner,
    pub rounds: Vec<RoundLog>,
    pub remaining: RemainingForces,
    pub salvage: Salvage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp: Option<Mvp>,
}

/// Ill-formed battle input. Every variant is raised before any simulation work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    #[error("invalid input: {side} stack references unknown unit type '{type_id}'")]
    UnknownUnitType { side: Side, type_id: String },
    #[error("invalid input: {side} stack '{type_id}' has unit count {count} (expected 0..=4294967295)")]
    InvalidUnitCount {
        side: Side,
        type_id: String,
        count: i64,
    },
    #[error("invalid input: {field} must be a finite number")]
    NonFiniteModifier { field: String },
    #[error("invalid input: {field} is {value}, below the minimum of {min}")]
    ModifierOutOfRange { field: String, value: f64, min: f64 },
}

pub fn simulate_battle(
    input: &BattleInput,
    registry: &UnitRegistry,
) -> Result<BattleResult, BattleError> {
    let multipliers = validate_location_mods(input.context.location_mods.unwrap_or_default())?;
    let mut stacks = build_stacks(Side::Attacker, &input.attacker, registry)?;
    stacks.extend(build_stacks(Side::Defender, &input.defender, registry)?);

    let round_limit = input.context.round_limit();
    let mut rng = Rng::new(&input.context.seed);
    let mut ledger = BattleLedger::default();
    let mut rounds = Vec::new();

    debug!(
        seed = %input.context.seed,
        attacker = %input.attacker.id,
        defender = %input.defender.id,
        round_limit,
        stacks = stacks.len(),
        "battle started"
    );

    for round in 0..round_limit {
        if !side_alive(&stacks, Side::Attacker) || !side_alive(&stacks, Side::Defender) {
            break;
        }
        rounds.push(resolve_round(
            round + 1,
            &mut stacks,
            &mut rng,
            &multipliers,
            &mut ledger,
        ));
    }

    let winner = match (
        side_alive(&stacks, Side::Attacker),
        side_alive(&stacks, Side::Defender),
    ) {
        (true, false) => Winner::Attacker,
        (false, true) => Winner::Defender,
        _ => Winner::Draw,
    };

    let result = BattleResult {
        winner,
        rounds,
        remaining: RemainingForces {
            attacker: summarize(&stacks, Side::Attacker),
            defender: summarize(&stacks, Side::Defender),
        },
        salvage: Salvage {
            primary: ledger.salvage_primary.round() as u64,
            secondary: ledger.salvage_secondary.round() as u64,
        },
        mvp: most_valuable(&ledger),
    };

    debug!(
        seed = %input.context.seed,
        winner = ?result.winner,
        rounds = result.rounds.len(),
        salvage_primary = result.salvage.primary,
        "battle concluded"
    );

    Ok(result)
}

fn build_stacks(
    side: Side,
    fleet: &Fleet,
    registry: &UnitRegistry,
) -> Result<Vec<StackState>, BattleError> {
    for (name, value) in fleet.tech.fields() {
        if !value.is_finite() {
            return Err(BattleError::NonFiniteModifier {
                field: format!("{side}.tech.{name}"),
            });
        }
        if SCALING_BONUSES.contains(&name) && value < MIN_SCALING_BONUS {
            return Err(BattleError::ModifierOutOfRange {
                field: format!("{side}.tech.{name}"),
                value,
                min: MIN_SCALING_BONUS,
            });
        }
    }

    fleet
        .stacks
        .iter()
        .map(|stack| {
            let units = u32::try_from(stack.count).map_err(|_| BattleError::InvalidUnitCount {
                side,
                type_id: stack.type_id.clone(),
                count: stack.count,
            })?;
            let profile =
                registry
                    .profile(&stack.type_id)
                    .ok_or_else(|| BattleError::UnknownUnitType {
                        side,
                        type_id: stack.type_id.clone(),
                    })?;
            Ok(StackState::new(side, profile, units, fleet.tech))
        })
        .collect()
}

fn validate_location_mods(
    mods: LocationMods,
) -> Result<DamageProfile, BattleError> {
    let multipliers = mods.multipliers();
    let channels = [
        ("ballistic", multipliers.ballistic),
        ("arc", multipliers.arc),
        ("tesla", multipliers.tesla),
        ("aether", multipliers.aether),
    ];
    for (name, value) in channels {
        if !value.is_finite() {
            return Err(BattleError::NonFiniteModifier {
                field: format!("context.locationMods.{name}"),
            });
        }
        if value < 0.0 {
            return Err(BattleError::ModifierOutOfRange {
                field: format!("context.locationMods.{name}"),
                value,
                min: 0.0,
            });
        }
    }
    Ok(multipliers)
}

fn summarize(stacks: &[StackState], side: Side) -> Vec<FleetStack> {
    stacks
        .iter()
        .filter(|stack| stack.side == side && stack.is_alive())
        .map(|stack| FleetStack::new(stack.type_id.clone(), i64::from(stack.units)))
        .collect()
}

/// Strictly greatest cumulative damage; ties keep the first key in (side, type id) order.
fn most_valuable(ledger: &BattleLedger) -> Option<Mvp> {
    let mut best: Option<(&(Side, String), f64)> = None;
    for (key, &dealt) in &ledger.damage_dealt {
        if dealt > best.map_or(0.0, |(_, damage)| damage) {
            best = Some((key, dealt));
        }
    }
    best.map(|((side, type_id), _)| Mvp {
        side: *side,
        type_id: type_id.clone(),
    })
}

//! One combat round: initiative ordering, target choice, hit rolls, damage and absorption.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::combat::absorption::absorb;
use crate::combat::damage::{volley_damage, DamageProfile};
use crate::combat::rng::Rng;
use crate::combat::stack::{Side, StackState};

pub const MIN_HIT_CHANCE: f64 = 0.1;
pub const MAX_HIT_CHANCE: f64 = 0.95;
/// Share of a destroyed unit's build cost recovered as salvage.
pub const SALVAGE_RATE: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolleyLog {
    pub side: Side,
    pub from_type: String,
    pub to_type: String,
    pub hits: u32,
    /// Rounded for reporting; the applied damage is unrounded.
    pub damage: u64,
    pub destroyed_units: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    /// 1-based.
    pub index: u32,
    pub volleys: Vec<VolleyLog>,
}

/// Battle-wide accumulators updated by every round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleLedger {
    pub salvage_primary: f64,
    pub salvage_secondary: f64,
    /// Unrounded cumulative damage per (side, unit type); BTreeMap keeps MVP iteration fixed.
    pub damage_dealt: BTreeMap<(Side, String), f64>,
}

impl BattleLedger {
    fn record(&mut self, source: &StackState, target: &StackState, damage: f64, destroyed: u32) {
        *self
            .damage_dealt
            .entry((source.side, source.type_id.clone()))
            .or_insert(0.0) += damage;
        let destroyed = f64::from(destroyed);
        self.salvage_primary += destroyed * target.cost.primary * SALVAGE_RATE;
        self.salvage_secondary += destroyed * target.cost.secondary * SALVAGE_RATE;
    }
}

pub fn hit_chance(source: &StackState, target: &StackState) -> f64 {
    (1.0 - target.evasion + source.accuracy).clamp(MIN_HIT_CHANCE, MAX_HIT_CHANCE)
}

/// Living stacks by descending initiative; ties put the attacker first, then keep input order.
pub fn initiative_order(stacks: &[StackState]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..stacks.len()).filter(|&i| stacks[i].is_alive()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&stacks[a], &stacks[b]);
        b.initiative
            .partial_cmp(&a.initiative)
            .unwrap_or(Ordering::Equal)
            .then(a.side.cmp(&b.side))
    });
    order
}

/// Largest living opposing stack; the earliest one wins a tie.
pub fn select_target(stacks: &[StackState], side: Side) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, stack) in stacks.iter().enumerate() {
        if stack.side == side || !stack.is_alive() {
            continue;
        }
        if best.map_or(true, |current| stack.units > stacks[current].units) {
            best = Some(index);
        }
    }
    best
}

pub fn side_alive(stacks: &[StackState], side: Side) -> bool {
    stacks.iter().any(|stack| stack.side == side && stack.is_alive())
}

pub fn resolve_round(
    index: u32,
    stacks: &mut [StackState],
    rng: &mut Rng,
    multipliers: &DamageProfile,
    ledger: &mut BattleLedger,
) -> RoundLog {
    let mut volleys = Vec::new();

    for source_index in initiative_order(stacks) {
        if !stacks[source_index].is_alive() {
            continue;
        }
        let side = stacks[source_index].side;
        let Some(target_index) = select_target(stacks, side) else {
            continue;
        };

        let chance = hit_chance(&stacks[source_index], &stacks[target_index]);
        let mut hits = 0u32;
        for _ in 0..stacks[source_index].units {
            if rng.next_f64() <= chance {
                hits += 1;
            }
        }

        let from_type = stacks[source_index].type_id.clone();
        let to_type = stacks[target_index].type_id.clone();

        if hits == 0 {
            volleys.push(VolleyLog {
                side,
                from_type,
                to_type,
                hits: 0,
                damage: 0,
                destroyed_units: 0,
            });
            continue;
        }

        let damage = volley_damage(&stacks[source_index], &stacks[target_index], hits, multipliers);
        let destroyed = absorb(&mut stacks[target_index], damage);
        ledger.record(&stacks[source_index], &stacks[target_index], damage, destroyed);
        trace!(round = index, %side, from = %from_type, to = %to_type, hits, damage, destroyed, "volley");

        volleys.push(VolleyLog {
            side,
            from_type,
            to_type,
            hits,
            damage: damage.round() as u64,
            destroyed_units: destroyed,
        });
    }

    RoundLog { index, volleys }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::damage::DamageProfile;
use crate::data::tech::TechBonuses;
use crate::data::units::{Cost, UnitProfile};

/// Tech-adjusted evasion never exceeds this.
pub const EVASION_CAP: f64 = 0.7;

/// Declaration order is the fixed iteration order: attacker before defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Attacker => Self::Defender,
            Self::Defender => Self::Attacker,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attacker => "attacker",
            Self::Defender => "defender",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable battle state of one input stack. Owned by a single battle invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct StackState {
    pub side: Side,
    pub type_id: String,
    pub units: u32,
    /// Armor left on the unit currently taking fire, in [0, armor_per_unit].
    pub current_armor: f64,
    /// Hull left on the unit currently taking fire, in [0, hull_per_unit].
    pub current_hull: f64,
    pub armor_per_unit: f64,
    pub hull_per_unit: f64,
    pub initiative: f64,
    pub accuracy: f64,
    pub evasion: f64,
    pub damage: DamageProfile,
    pub cost: Cost,
    pub tech: TechBonuses,
}

impl StackState {
    pub fn new(side: Side, profile: &UnitProfile, units: u32, tech: TechBonuses) -> Self {
        let armor_per_unit = profile.armor * (1.0 + tech.armor_bonus);
        let hull_per_unit = profile.hull * (1.0 + tech.armor_bonus * 0.5);
        Self {
            side,
            type_id: profile.type_id.clone(),
            units,
            current_armor: armor_per_unit,
            current_hull: hull_per_unit,
            armor_per_unit,
            hull_per_unit,
            initiative: profile.initiative + tech.initiative_bonus,
            accuracy: (profile.accuracy + tech.accuracy_bonus).clamp(0.0, 1.0),
            evasion: (profile.evasion + tech.evasion_bonus).clamp(0.0, EVASION_CAP),
            damage: profile.damage,
            cost: profile.cost,
            tech,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.units > 0
    }

    /// Restore both pools to the per-unit baseline (next unit in the stack takes fire).
    pub(crate) fn reset_pools(&mut self) {
        self.current_armor = self.armor_per_unit;
        self.current_hull = self.hull_per_unit;
    }
}

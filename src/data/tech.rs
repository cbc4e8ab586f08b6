//! Technology bonuses: per-side modifiers applied when battle stacks are built.
//! Derived from research levels by the progression layer; the engine only reads them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechBonuses {
    /// Scales armor (full) and hull (half), and mitigates incoming ballistic damage.
    pub armor_bonus: f64,
    pub arc_bonus: f64,
    pub tesla_bonus: f64,
    pub aether_bonus: f64,
    pub evasion_bonus: f64,
    pub accuracy_bonus: f64,
    /// Flat initiative added to every stack of the side.
    pub initiative_bonus: f64,
}

impl TechBonuses {
    /// Field name and value pairs, used for input validation.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("armorBonus", self.armor_bonus),
            ("arcBonus", self.arc_bonus),
            ("teslaBonus", self.tesla_bonus),
            ("aetherBonus", self.aether_bonus),
            ("evasionBonus", self.evasion_bonus),
            ("accuracyBonus", self.accuracy_bonus),
            ("initiativeBonus", self.initiative_bonus),
        ]
    }
}

pub const ARMOR_PLATING: &str = "armor_plating";
pub const ARC_ENGINEERING: &str = "arc_engineering";
pub const TESLA_COILS: &str = "tesla_coils";
pub const AETHER_THEORY: &str = "aether_theory";
pub const PISTON_DRIVE: &str = "piston_drive";
pub const DIFFERENCE_ENGINE: &str = "difference_engine";
pub const STEAM_JETS: &str = "steam_jets";

/// Research id -> completed level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchLevels(pub HashMap<String, u32>);

impl ResearchLevels {
    pub fn level(&self, research_id: &str) -> u32 {
        self.0.get(research_id).copied().unwrap_or(0)
    }

    pub fn with_level(mut self, research_id: &str, level: u32) -> Self {
        self.0.insert(research_id.to_string(), level);
        self
    }

    pub fn to_tech_bonuses(&self) -> TechBonuses {
        let scaled = |id: &str, per_level: f64| f64::from(self.level(id)) * per_level;
        TechBonuses {
            armor_bonus: scaled(ARMOR_PLATING, 0.05),
            arc_bonus: scaled(ARC_ENGINEERING, 0.04),
            tesla_bonus: scaled(TESLA_COILS, 0.04),
            aether_bonus: scaled(AETHER_THEORY, 0.05),
            evasion_bonus: scaled(PISTON_DRIVE, 0.02),
            accuracy_bonus: scaled(DIFFERENCE_ENGINE, 0.03),
            initiative_bonus: scaled(STEAM_JETS, 0.5),
        }
    }
}

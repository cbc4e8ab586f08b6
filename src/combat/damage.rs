//! Volley damage across the four weapon channels.
//!
//! Ballistic damage is the only channel reduced by the target's armor technology; arc, tesla and
//! aether are energy channels scaled by the attacker's matching tech bonus and ignore armor tech.

use serde::{Deserialize, Serialize};

use crate::combat::stack::StackState;

/// Armor tech above this value no longer reduces ballistic damage.
pub const BALLISTIC_MITIGATION_CAP: f64 = 0.8;

/// Per-channel damage values (or per-channel multipliers). Channels missing from a catalog are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageProfile {
    pub ballistic: f64,
    pub arc: f64,
    pub tesla: f64,
    pub aether: f64,
}

impl DamageProfile {
    pub const UNIT: Self = Self {
        ballistic: 1.0,
        arc: 1.0,
        tesla: 1.0,
        aether: 1.0,
    };

    pub fn total(&self) -> f64 {
        self.ballistic + self.arc + self.tesla + self.aether
    }
}

/// Location modifiers supplied with a battle; missing channels default to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationMods {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballistic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tesla: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aether: Option<f64>,
}

impl LocationMods {
    pub fn multipliers(&self) -> DamageProfile {
        DamageProfile {
            ballistic: self.ballistic.unwrap_or(1.0),
            arc: self.arc.unwrap_or(1.0),
            tesla: self.tesla.unwrap_or(1.0),
            aether: self.aether.unwrap_or(1.0),
        }
    }
}

/// Damage of one volley split by channel, after mitigation.
pub fn channel_damage(
    source: &StackState,
    target: &StackState,
    hits: u32,
    multipliers: &DamageProfile,
) -> DamageProfile {
    let base = &source.damage;
    let tech = &source.tech;
    let hits = f64::from(hits);

    let offensive_arc = base.arc * (1.0 + tech.arc_bonus);
    let offensive_tesla = base.tesla * (1.0 + tech.tesla_bonus);
    let offensive_aether = base.aether * (1.0 + tech.aether_bonus);

    let ballistic = base.ballistic * hits * multipliers.ballistic;
    let mitigation = target.tech.armor_bonus.clamp(0.0, BALLISTIC_MITIGATION_CAP);

    DamageProfile {
        ballistic: ballistic * (1.0 - mitigation),
        arc: offensive_arc * hits * multipliers.arc,
        tesla: offensive_tesla * hits * multipliers.tesla,
        aether: offensive_aether * hits * multipliers.aether,
    }
}

/// Total damage a volley of `hits` inflicts on `target`.
pub fn volley_damage(
    source: &StackState,
    target: &StackState,
    hits: u32,
    multipliers: &DamageProfile,
) -> f64 {
    channel_damage(source, target, hits, multipliers).total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::stack::{Side, StackState};
    use crate::data::tech::TechBonuses;
    use crate::data::units::{UnitRegistry, AETHER_CARRIER, STORM_FRIGATE};

    fn stack(side: Side, type_id: &str, tech: TechBonuses) -> StackState {
        let registry = UnitRegistry::builtin();
        let profile = registry.profile(type_id).expect("builtin type");
        StackState::new(side, profile, 1, tech)
    }

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn untouched_volley_sums_raw_channels() {
        let source = stack(Side::Attacker, STORM_FRIGATE, TechBonuses::default());
        let target = stack(Side::Defender, STORM_FRIGATE, TechBonuses::default());
        // 14 + 4 + 2 + 0 per hit
        approx_eq(volley_damage(&source, &target, 3, &DamageProfile::UNIT), 60.0);
    }

    #[test]
    fn armor_tech_only_mitigates_ballistic() {
        let source = stack(Side::Attacker, STORM_FRIGATE, TechBonuses::default());
        let armored = TechBonuses {
            armor_bonus: 0.5,
            ..TechBonuses::default()
        };
        let target = stack(Side::Defender, STORM_FRIGATE, armored);
        let split = channel_damage(&source, &target, 2, &DamageProfile::UNIT);
        approx_eq(split.ballistic, 14.0);
        approx_eq(split.arc, 8.0);
        approx_eq(split.tesla, 4.0);
        approx_eq(split.aether, 0.0);
    }

    #[test]
    fn mitigation_is_capped() {
        let source = stack(Side::Attacker, STORM_FRIGATE, TechBonuses::default());
        let fortress = TechBonuses {
            armor_bonus: 3.0,
            ..TechBonuses::default()
        };
        let target = stack(Side::Defender, STORM_FRIGATE, fortress);
        let split = channel_damage(&source, &target, 1, &DamageProfile::UNIT);
        approx_eq(split.ballistic, 14.0 * 0.2);
    }

    #[test]
    fn negative_armor_tech_does_not_amplify_ballistic() {
        let source = stack(Side::Attacker, STORM_FRIGATE, TechBonuses::default());
        let brittle = TechBonuses {
            armor_bonus: -0.3,
            ..TechBonuses::default()
        };
        let target = stack(Side::Defender, STORM_FRIGATE, brittle);
        approx_eq(channel_damage(&source, &target, 1, &DamageProfile::UNIT).ballistic, 14.0);
    }

    #[test]
    fn energy_tech_and_location_scale_their_channel() {
        let tech = TechBonuses {
            arc_bonus: 0.5,
            tesla_bonus: 0.25,
            aether_bonus: 1.0,
            ..TechBonuses::default()
        };
        let source = stack(Side::Attacker, AETHER_CARRIER, tech);
        let target = stack(Side::Defender, STORM_FRIGATE, TechBonuses::default());
        let location = LocationMods {
            aether: Some(2.0),
            ballistic: Some(0.5),
            ..LocationMods::default()
        };
        let split = channel_damage(&source, &target, 1, &location.multipliers());
        approx_eq(split.ballistic, 4.0);
        approx_eq(split.arc, 7.5);
        approx_eq(split.tesla, 5.0);
        approx_eq(split.aether, 12.0);
    }

    #[test]
    fn zero_hits_deal_zero_damage() {
        let source = stack(Side::Attacker, AETHER_CARRIER, TechBonuses::default());
        let target = stack(Side::Defender, STORM_FRIGATE, TechBonuses::default());
        assert_eq!(volley_damage(&source, &target, 0, &DamageProfile::UNIT), 0.0);
    }

    #[test]
    fn location_mods_default_missing_channels_to_one() {
        let mods: LocationMods = serde_json::from_str(r#"{"tesla":0.5}"#).unwrap();
        let multipliers = mods.multipliers();
        assert_eq!(multipliers.tesla, 0.5);
        assert_eq!(multipliers.ballistic, 1.0);
        assert_eq!(multipliers.arc, 1.0);
        assert_eq!(multipliers.aether, 1.0);
    }
}

//! Unit profiles: static combat stats per unit type, held in a read-only registry.
//! Built once (built-in catalog or a JSON/YAML catalog file) and passed by reference into the engine.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::DamageProfile;
use crate::data::validate::validate_profiles;

/// Build cost of one unit; salvage is derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub primary: f64,
    pub secondary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProfile {
    pub type_id: String,
    pub armor: f64,
    pub hull: f64,
    pub initiative: f64,
    /// Base hit contribution in [0, 1].
    pub accuracy: f64,
    /// Base evasion in [0, 1]; clamped to 0.7 once tech is applied.
    pub evasion: f64,
    pub damage: DamageProfile,
    pub cost: Cost,
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    pub units: Vec<UnitProfile>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read unit catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse unit catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse unit catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported catalog format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
    #[error("unit catalog failed validation: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitRegistry {
    profiles: BTreeMap<String, UnitProfile>,
}

impl UnitRegistry {
    /// The stock catalog shipped with the engine.
    pub fn builtin() -> Self {
        let profiles = builtin_profiles()
            .into_iter()
            .map(|profile| (profile.type_id.clone(), profile))
            .collect();
        Self { profiles }
    }

    /// Build a registry from caller-supplied profiles. Rejected when validation reports errors.
    pub fn from_profiles(profiles: Vec<UnitProfile>) -> Result<Self, RegistryError> {
        let report = validate_profiles(&profiles);
        if report.has_errors() {
            return Err(RegistryError::Invalid(report.error_summary()));
        }
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.type_id.clone(), profile))
            .collect();
        Ok(Self { profiles })
    }

    /// Load a catalog file; format is chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let catalog = read_catalog(path.as_ref())?;
        Self::from_profiles(catalog.units)
    }

    pub fn profile(&self, type_id: &str) -> Option<&UnitProfile> {
        self.profiles.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.profiles.contains_key(type_id)
    }

    /// Profiles ordered by type id.
    pub fn profiles(&self) -> impl Iterator<Item = &UnitProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Parse a catalog without validating it.
pub fn read_catalog(path: &Path) -> Result<UnitCatalog, RegistryError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let raw = fs::read_to_string(path)?;
    match extension.as_str() {
        "json" => Ok(serde_json::from_str(&raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(&raw)?),
        other => Err(RegistryError::UnsupportedFormat(other.to_string())),
    }
}

pub const SCOUT_DRONE: &str = "scout_drone";
pub const COAL_FREIGHTER: &str = "coal_freighter";
pub const STORM_FRIGATE: &str = "storm_frigate";
pub const AETHER_CARRIER: &str = "aether_carrier";

#[allow(clippy::too_many_arguments)]
fn unit(
    type_id: &str,
    armor: f64,
    hull: f64,
    initiative: f64,
    accuracy: f64,
    evasion: f64,
    damage: [f64; 4],
    cost: [f64; 2],
) -> UnitProfile {
    let [ballistic, arc, tesla, aether] = damage;
    let [primary, secondary] = cost;
    UnitProfile {
        type_id: type_id.to_string(),
        armor,
        hull,
        initiative,
        accuracy,
        evasion,
        damage: DamageProfile {
            ballistic,
            arc,
            tesla,
            aether,
        },
        cost: Cost { primary, secondary },
    }
}

fn builtin_profiles() -> Vec<UnitProfile> {
    vec![
        unit(SCOUT_DRONE, 12.0, 18.0, 14.0, 0.65, 0.28, [4.0, 2.0, 0.0, 0.0], [300.0, 120.0]),
        unit(COAL_FREIGHTER, 45.0, 60.0, 6.0, 0.55, 0.08, [6.0, 1.0, 0.0, 0.0], [1200.0, 300.0]),
        unit(STORM_FRIGATE, 65.0, 80.0, 11.0, 0.6, 0.16, [14.0, 4.0, 2.0, 0.0], [2200.0, 800.0]),
        unit(AETHER_CARRIER, 80.0, 120.0, 9.0, 0.58, 0.12, [8.0, 5.0, 4.0, 3.0], [3400.0, 1400.0]),
    ]
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_catalog(name: &str, contents: &str) -> std::path::PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("broadside-{stamp}-{name}"));
        fs::write(&path, contents).expect("temp catalog should be writable");
        path
    }

    #[test]
    fn builtin_registry_has_four_units_in_type_order() {
        let registry = UnitRegistry::builtin();
        let ids: Vec<_> = registry.profiles().map(|p| p.type_id.as_str()).collect();
        assert_eq!(ids, vec![AETHER_CARRIER, COAL_FREIGHTER, SCOUT_DRONE, STORM_FRIGATE]);
        let frigate = registry.profile(STORM_FRIGATE).expect("frigate registered");
        assert_eq!(frigate.armor, 65.0);
        assert_eq!(frigate.damage.ballistic, 14.0);
        assert_eq!(frigate.cost.primary, 2200.0);
    }

    #[test]
    fn unknown_type_is_absent() {
        assert!(UnitRegistry::builtin().profile("dreadnought").is_none());
    }

    #[test]
    fn builtin_profiles_pass_validation() {
        assert!(!validate_profiles(&builtin_profiles()).has_errors());
    }

    #[test]
    fn from_profiles_rejects_invalid_accuracy() {
        let mut bad = builtin_profiles();
        bad[0].accuracy = 1.5;
        let err = UnitRegistry::from_profiles(bad).expect_err("accuracy > 1 must be rejected");
        assert!(matches!(err, RegistryError::Invalid(_)));
    }

    #[test]
    fn load_reads_json_and_yaml_catalogs() {
        let json = r#"{"units":[{"typeId":"gunboat","armor":10,"hull":20,"initiative":5,
            "accuracy":0.5,"evasion":0.1,
            "damage":{"ballistic":3,"arc":0,"tesla":0,"aether":0},
            "cost":{"primary":100,"secondary":50}}]}"#;
        let json_path = temp_catalog("catalog.json", json);
        let registry = UnitRegistry::load(&json_path).expect("json catalog loads");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("gunboat"));

        let yaml = "units:\n  - typeId: tender\n    armor: 5\n    hull: 40\n    initiative: 2\n    accuracy: 0.4\n    evasion: 0.0\n    damage: { ballistic: 1, arc: 0, tesla: 0, aether: 0 }\n    cost: { primary: 80, secondary: 10 }\n";
        let yaml_path = temp_catalog("catalog.yaml", yaml);
        let registry = UnitRegistry::load(&yaml_path).expect("yaml catalog loads");
        assert_eq!(registry.profile("tender").map(|p| p.hull), Some(40.0));

        let _ = fs::remove_file(json_path);
        let _ = fs::remove_file(yaml_path);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let path = temp_catalog("catalog.toml", "units = []");
        let err = UnitRegistry::load(&path).expect_err("toml is not supported");
        assert!(matches!(err, RegistryError::UnsupportedFormat(ref ext) if ext == "toml"));
        let _ = fs::remove_file(path);
    }
}

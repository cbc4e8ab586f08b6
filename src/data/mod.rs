pub mod tech;
pub mod units;
pub mod validate;

pub use tech::{ResearchLevels, TechBonuses};
pub use units::{Cost, RegistryError, UnitCatalog, UnitProfile, UnitRegistry};
pub use validate::{
    validate_catalog_file, validate_profiles, ValidationDiagnostic, ValidationReport,
    ValidationSeverity,
};

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::combat::EVASION_CAP;
use crate::data::units::{read_catalog, RegistryError, UnitProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    /// Error diagnostics joined into one line.
    pub fn error_summary(&self) -> String {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .map(|diag| format!("{}: {}", diag.context, diag.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn validate_profiles(profiles: &[UnitProfile]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_ids = HashSet::new();

    for (index, profile) in profiles.iter().enumerate() {
        let base_context = format!("units[{index}]");
        if profile.type_id.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                format!("{base_context}.typeId"),
                "missing non-empty 'typeId'",
            );
        } else if !seen_ids.insert(profile.type_id.as_str()) {
            report.push(
                ValidationSeverity::Error,
                format!("{base_context}.typeId"),
                format!("duplicate typeId '{}'", profile.type_id),
            );
        }

        let context = format!("{base_context} typeId='{}'", profile.type_id);
        let non_negative = [
            ("armor", profile.armor),
            ("hull", profile.hull),
            ("initiative", profile.initiative),
            ("damage.ballistic", profile.damage.ballistic),
            ("damage.arc", profile.damage.arc),
            ("damage.tesla", profile.damage.tesla),
            ("damage.aether", profile.damage.aether),
            ("cost.primary", profile.cost.primary),
            ("cost.secondary", profile.cost.secondary),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.{field}"),
                    format!("expected finite non-negative value, got {value}"),
                );
            }
        }

        for (field, value) in [("accuracy", profile.accuracy), ("evasion", profile.evasion)] {
            if !(0.0..=1.0).contains(&value) {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.{field}"),
                    format!("expected value in [0, 1], got {value}"),
                );
            }
        }

        if profile.armor <= 0.0 && profile.hull <= 0.0 {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                "unit has neither armor nor hull",
            );
        }

        if profile.evasion > EVASION_CAP && profile.evasion <= 1.0 {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.evasion"),
                format!("evasion {} exceeds runtime cap {EVASION_CAP} and will be clamped", profile.evasion),
            );
        }

        if profile.damage.total() == 0.0 {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.damage"),
                "unit deals no damage on any channel",
            );
        }
    }

    report.push(
        ValidationSeverity::Info,
        "units",
        format!("{} profile(s) checked", profiles.len()),
    );
    report
}

/// Parse a catalog file and validate its profiles.
pub fn validate_catalog_file(path: impl AsRef<Path>) -> Result<ValidationReport, RegistryError> {
    let catalog = read_catalog(path.as_ref())?;
    Ok(validate_profiles(&catalog.units))
}

//! Parameter schema validation.
//!
//! Catches malformed tables (bad or duplicate flag tokens, specs naming
//! attributes their record kind does not have, dependencies on non-boolean
//! attributes) before they produce a broken command line.
//!
//! # Examples
//!
//! ```
//! use sigplot_core::*;
//!
//! let mut schema = ParameterSchema::default();
//! schema.plot.push(ParameterSpec::switch("use_dbm", "-dbm"));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: flag token missing its leading dash
//! schema.plot.push(ParameterSpec::valued("frequency", "f", ValueKind::Float));
//! assert!(!validate_schema(&schema).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::records::{Antenna, Plot, Record, Station};
use crate::schema::{Emission, ParameterSchema, ParameterSpec};
use crate::types::{ParamGroup, ValueKind};

/// Parameter schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A spec that is always emitted has no usable flag token.
    #[error("parameter '{0}' must be emitted but has no flag token")]
    MissingFlagToken(String),
    /// Flag token does not start with a dash.
    #[error("invalid flag for parameter '{name}': {flag}")]
    InvalidFlag { name: String, flag: String },
    /// Two specs in the same group share a name.
    #[error("duplicate parameter in {group} group: {name}")]
    DuplicateName { group: ParamGroup, name: String },
    /// Two specs anywhere in the schema share a flag token.
    #[error("duplicate flag: {0}")]
    DuplicateFlag(String),
    /// A spec names an attribute its record kind does not have.
    #[error("{group} records have no attribute '{name}'")]
    UnknownField { group: ParamGroup, name: String },
    /// The declared kind disagrees with the record attribute's kind.
    #[error("parameter '{name}' is declared {declared} but the record attribute is {actual}")]
    KindMismatch {
        name: String,
        declared: ValueKind,
        actual: ValueKind,
    },
    /// A dependency names something that is not a plot attribute.
    #[error("parameter '{name}' depends on unknown plot attribute '{dependency}'")]
    UnknownDependency { name: String, dependency: String },
    /// A dependency names a plot attribute that is not boolean.
    #[error("parameter '{name}' depends on non-boolean plot attribute '{dependency}'")]
    NonBooleanDependency { name: String, dependency: String },
    /// The antenna pattern parameter must carry a string value.
    #[error("antenna pattern parameter '{0}' must be a string")]
    PatternWithoutValue(String),
    /// Equality emission is only defined for string values.
    #[error("parameter '{0}' compares against a literal but is not a string")]
    NonStringComparison(String),
}

/// Validates a parameter schema.
///
/// Flag tokens and names are checked first; attribute and dependency checks
/// only run on a structurally sound table.
///
/// # Examples
///
/// ```
/// use sigplot_core::*;
///
/// let mut schema = ParameterSchema::default();
/// schema.global.push(
///     ParameterSpec::valued("lidar_data_dir", "-lid", ValueKind::Str).depends_on(&["frequency"]),
/// );
/// let errors = validate_schema(&schema);
/// assert!(errors.iter().any(|e| matches!(e, SchemaError::NonBooleanDependency { .. })));
/// ```
pub fn validate_schema(schema: &ParameterSchema) -> Vec<SchemaError> {
    let mut errors = validate_tokens(schema);
    if !errors.is_empty() {
        return errors;
    }

    for (group, spec) in schema.iter() {
        errors.extend(validate_emission(spec));
        errors.extend(validate_field(group, spec));
        errors.extend(validate_dependencies(spec));
    }

    errors
}

fn validate_tokens(schema: &ParameterSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen_flags: HashSet<&str> = HashSet::new();

    for group in ParamGroup::ALL {
        let mut seen_names: HashSet<&str> = HashSet::new();
        for spec in schema.group(group) {
            if !seen_names.insert(spec.name.as_str()) {
                errors.push(SchemaError::DuplicateName {
                    group,
                    name: spec.name.clone(),
                });
            }

            let Some(flag) = spec.flag.as_deref().filter(|flag| !flag.is_empty()) else {
                continue;
            };
            if !is_valid_flag(flag) {
                errors.push(SchemaError::InvalidFlag {
                    name: spec.name.clone(),
                    flag: flag.to_string(),
                });
            }
            if !seen_flags.insert(flag) {
                errors.push(SchemaError::DuplicateFlag(flag.to_string()));
            }
        }
    }

    errors
}

fn is_valid_flag(flag: &str) -> bool {
    flag.len() > 1
        && flag.starts_with('-')
        && !flag.chars().any(char::is_whitespace)
}

fn validate_emission(spec: &ParameterSpec) -> Option<SchemaError> {
    match &spec.emission {
        Emission::Standard => None,
        Emission::AntennaPattern if spec.is_informational() => {
            Some(SchemaError::MissingFlagToken(spec.name.clone()))
        }
        Emission::AntennaPattern if spec.value_kind != ValueKind::Str => {
            Some(SchemaError::PatternWithoutValue(spec.name.clone()))
        }
        Emission::WhenEquals(_) if spec.is_informational() => {
            Some(SchemaError::MissingFlagToken(spec.name.clone()))
        }
        Emission::WhenEquals(_) if spec.value_kind != ValueKind::Str => {
            Some(SchemaError::NonStringComparison(spec.name.clone()))
        }
        Emission::AntennaPattern | Emission::WhenEquals(_) => None,
    }
}

fn validate_field(group: ParamGroup, spec: &ParameterSpec) -> Option<SchemaError> {
    let actual = match group {
        // Global options come from the configuration map, which has no fixed set of keys.
        ParamGroup::Global => return None,
        ParamGroup::Plot => Plot::field_kind(&spec.name),
        ParamGroup::Antenna => Antenna::field_kind(&spec.name),
        ParamGroup::Station => {
            Station::field_kind(spec.receiver_field().unwrap_or(&spec.name))
        }
    };
    let Some(actual) = actual else {
        return Some(SchemaError::UnknownField {
            group,
            name: spec.name.clone(),
        });
    };
    if !actual.coercible_to(spec.value_kind) {
        return Some(SchemaError::KindMismatch {
            name: spec.name.clone(),
            declared: spec.value_kind,
            actual,
        });
    }
    None
}

fn validate_dependencies(spec: &ParameterSpec) -> Vec<SchemaError> {
    spec.depends_on
        .iter()
        .filter_map(|dependency| match Plot::field_kind(dependency) {
            None => Some(SchemaError::UnknownDependency {
                name: spec.name.clone(),
                dependency: dependency.clone(),
            }),
            Some(ValueKind::Bool) => None,
            Some(_) => Some(SchemaError::NonBooleanDependency {
                name: spec.name.clone(),
                dependency: dependency.clone(),
            }),
        })
        .collect()
}

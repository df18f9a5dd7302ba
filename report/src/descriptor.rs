//! Obstruction descriptor grammar.
//!
//! The tool lists each obstruction on its own indented line:
//!
//! ```text
//!     51.5082 N,   0.5014 W, 20.27 miles, 118.11 feet AMSL
//! ```
//!
//! Exactly four comma-separated fields: latitude with `N|S`, longitude with
//! `E|W`, distance from the transmitter, and height ending in `AMSL`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use sigplot_core::{Obstruction, UnitSystem};
use thiserror::Error;

static COORDINATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<value>[-+]?\d+(?:\.\d*)?)(?:\s*(?P<hemisphere>[A-Za-z]+))?$")
        .expect("static regex must compile")
});

/// Axis of a geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Returns the sign a hemisphere letter applies, or `None` when the
    /// letter does not belong to this axis.
    fn hemisphere_sign(self, letter: &str) -> Option<f64> {
        match (self, letter) {
            (Self::Latitude, "N") | (Self::Longitude, "E") => Some(1.0),
            (Self::Latitude, "S") | (Self::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
        }
    }
}

/// Descriptor grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("expected 4 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {axis} hemisphere '{found}'")]
    Hemisphere { axis: Axis, found: String },
    #[error("{axis} '{found}' has no hemisphere letter")]
    MissingHemisphere { axis: Axis, found: String },
    #[error("invalid number '{0}'")]
    Number(String),
    #[error("height '{0}' is not followed by AMSL")]
    MissingAmsl(String),
}

/// Parses one site coordinate.
///
/// Accepts a signed decimal (`-0.5014`) or an unsigned magnitude followed by
/// a hemisphere letter (`0.5014 W`).
///
/// # Examples
///
/// ```
/// use sigplot_report::descriptor::{Axis, parse_coordinate};
///
/// assert_eq!(parse_coordinate("0.5014 W", Axis::Longitude), Ok(-0.5014));
/// assert_eq!(parse_coordinate("-33.86", Axis::Latitude), Ok(-33.86));
/// assert!(parse_coordinate("12.0 E", Axis::Latitude).is_err());
/// ```
pub fn parse_coordinate(text: &str, axis: Axis) -> Result<f64, DescriptorError> {
    coordinate(text, axis, false)
}

fn coordinate(text: &str, axis: Axis, require_hemisphere: bool) -> Result<f64, DescriptorError> {
    let text = text.trim();
    let captures = COORDINATE_RE
        .captures(text)
        .ok_or_else(|| DescriptorError::Number(text.to_string()))?;
    let value: f64 = captures["value"]
        .parse()
        .map_err(|_| DescriptorError::Number(text.to_string()))?;

    let Some(hemisphere) = captures.name("hemisphere") else {
        if require_hemisphere {
            return Err(DescriptorError::MissingHemisphere {
                axis,
                found: text.to_string(),
            });
        }
        return Ok(value);
    };
    let sign = axis
        .hemisphere_sign(hemisphere.as_str())
        .ok_or_else(|| DescriptorError::Hemisphere {
            axis,
            found: hemisphere.as_str().to_string(),
        })?;
    Ok(sign * value.abs())
}

/// Parses a descriptor, detecting its unit system from its own text.
///
/// # Examples
///
/// ```
/// use sigplot_report::descriptor::parse_obstruction;
///
/// let obstruction =
///     parse_obstruction("51.5082 N,   0.5014 W, 20.27 miles, 118.11 feet AMSL").unwrap();
/// assert_eq!(obstruction.latitude, 51.5082);
/// assert_eq!(obstruction.longitude, -0.5014);
/// assert_eq!(obstruction.distance, 20.27);
/// assert_eq!(obstruction.height, 118.11);
/// assert!(!obstruction.metric);
/// ```
pub fn parse_obstruction(descriptor: &str) -> Result<Obstruction, DescriptorError> {
    parse_obstruction_in(descriptor, UnitSystem::detect(descriptor))
}

/// Parses a descriptor whose unit system is already known from the report.
///
/// Both coordinates must carry their hemisphere letter.
pub fn parse_obstruction_in(
    descriptor: &str,
    units: UnitSystem,
) -> Result<Obstruction, DescriptorError> {
    let fields: Vec<&str> = descriptor.trim().split(',').map(str::trim).collect();
    let [latitude, longitude, distance, height] = fields.as_slice() else {
        return Err(DescriptorError::FieldCount(fields.len()));
    };

    let height = height
        .strip_suffix("AMSL")
        .ok_or_else(|| DescriptorError::MissingAmsl(height.to_string()))?;

    Ok(Obstruction {
        latitude: coordinate(latitude, Axis::Latitude, true)?,
        longitude: coordinate(longitude, Axis::Longitude, true)?,
        distance: leading_number(distance)?,
        height: leading_number(height)?,
        metric: units.is_metric(),
    })
}

fn leading_number(field: &str) -> Result<f64, DescriptorError> {
    field
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| DescriptorError::Number(field.trim().to_string()))
}

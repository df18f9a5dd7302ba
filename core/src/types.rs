//! Value kinds and parameter values shared by the schema, the records and
//! the synthesizer.
//!
//! Every parameter declares an explicit [`ValueKind`]. Record lookups and
//! configuration entries produce a [`ParamValue`], which is checked against
//! the declared kind (and coerced from strings where that is unambiguous)
//! before it is written to a command line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dependency name that routes a parameter into the point-to-point vector.
pub const P2P_DEPENDENCY: &str = "do_p2p_analysis";

/// Station parameter prefix that redirects lookup to the receiver station.
pub const RECEIVER_PREFIX: &str = "rx_";

/// Declared kind of a parameter value.
///
/// # Examples
///
/// ```
/// use sigplot_core::ValueKind;
///
/// assert_eq!(ValueKind::Float.to_string(), "float");
/// assert!(ValueKind::Bool.is_switch());
/// assert!(!ValueKind::Str.is_switch());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Presence-only flag, never followed by a value.
    Bool,
    /// Integer value.
    Int,
    /// Floating point value.
    Float,
    /// Free-form string value (paths, enumerations).
    Str,
}

impl ValueKind {
    /// Returns `true` when the kind is emitted as a bare flag.
    pub fn is_switch(self) -> bool {
        self == Self::Bool
    }

    /// Returns `true` when values of this kind may convert into `target`.
    ///
    /// Conversions out of strings are only known to succeed at lookup time.
    pub fn coercible_to(self, target: ValueKind) -> bool {
        match (self, target) {
            (from, to) if from == to => true,
            (Self::Int, Self::Float | Self::Str) => true,
            (Self::Float, Self::Str) => true,
            (Self::Str, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
        }
    }
}

/// A resolved parameter value.
///
/// Deserializes untagged, so YAML `true`, `3`, `0.5` and `"dir"` map to
/// `Bool`, `Int`, `Float` and `Str` respectively.
///
/// # Examples
///
/// ```
/// use sigplot_core::{ParamValue, ValueKind};
///
/// assert_eq!(ParamValue::Float(900.0).to_string(), "900");
/// assert!(!ParamValue::Int(0).is_truthy());
/// assert_eq!(
///     ParamValue::Str("yes".into()).coerce(ValueKind::Bool),
///     Some(ParamValue::Bool(true)),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Kind of the value as stored.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
        }
    }

    /// Truthiness used by emission and dependency checks.
    ///
    /// `false`, `0`, `0.0` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value into `kind`.
    ///
    /// Strings are parsed into the target kind; integers widen to floats and
    /// numbers render into strings. Returns `None` when no lossless
    /// conversion exists (for example a float into an integer).
    pub fn coerce(&self, kind: ValueKind) -> Option<ParamValue> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match (self, kind) {
            (Self::Int(n), ValueKind::Float) => Some(Self::Float(*n as f64)),
            (Self::Int(n), ValueKind::Str) => Some(Self::Str(n.to_string())),
            (Self::Float(x), ValueKind::Str) => Some(Self::Str(x.to_string())),
            (Self::Str(s), ValueKind::Bool) => parse_bool(s).map(Self::Bool),
            (Self::Str(s), ValueKind::Int) => s.trim().parse().ok().map(Self::Int),
            (Self::Str(s), ValueKind::Float) => s.trim().parse().ok().map(Self::Float),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Parses the boolean spellings accepted in INI-style tool configuration.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Parameter group, one per record kind the schema covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGroup {
    /// Tool-wide options read from the configuration map.
    Global,
    /// Options read from the plot record.
    Plot,
    /// Options read from the plot's antenna.
    Antenna,
    /// Options read from the transmitter (or, for `rx_` names, receiver) station.
    Station,
}

impl ParamGroup {
    /// All groups in emission order.
    pub const ALL: [ParamGroup; 4] = [Self::Global, Self::Plot, Self::Antenna, Self::Station];
}

impl fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Plot => write!(f, "plot"),
            Self::Antenna => write!(f, "antenna"),
            Self::Station => write!(f, "station"),
        }
    }
}

//! Declarative parameter schema.
//!
//! A [`ParameterSchema`] is a typed table of [`ParameterSpec`] records grouped
//! by the record kind each parameter is read from. The synthesizer walks the
//! groups in [`ParamGroup::ALL`] order and each group in declaration order,
//! which makes the produced argument vectors deterministic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{P2P_DEPENDENCY, ParamGroup, RECEIVER_PREFIX, ValueKind};

/// How a flagged parameter is written to the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emission {
    /// `Bool` emits the flag alone; other kinds emit `[flag, value]`.
    #[default]
    Standard,
    /// Emits the flag alone iff the string value equals the literal.
    ///
    /// Encodes a two-valued enumeration as flag presence (e.g. horizontal
    /// polarization; vertical is the tool default and has no flag).
    WhenEquals(String),
    /// Always emitted; the value is the antenna pattern path
    /// `<antenna_profiles_dir>/<antenna.type>/<value>`.
    AntennaPattern,
}

/// Definition of one tool parameter.
///
/// # Examples
///
/// ```
/// use sigplot_core::{ParameterSpec, ValueKind};
///
/// let dbm = ParameterSpec::switch("use_dbm", "-dbm");
/// assert_eq!(dbm.value_kind, ValueKind::Bool);
/// assert!(!dbm.is_informational());
///
/// let rx = ParameterSpec::valued("rx_height", "-rxh", ValueKind::Float)
///     .depends_on(&["do_p2p_analysis"]);
/// assert!(rx.requires_p2p());
/// assert_eq!(rx.receiver_field(), Some("height"));
///
/// let id = ParameterSpec::info("id", ValueKind::Int);
/// assert!(id.is_informational());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Record attribute (or configuration key) the value is read from.
    pub name: String,
    /// Command-line token; `None` marks an informational-only field.
    pub flag: Option<String>,
    /// Declared kind of the value.
    pub value_kind: ValueKind,
    /// Boolean plot attributes gating emission (any truthy one suffices).
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,
    /// Emission rule.
    #[serde(default)]
    pub emission: Emission,
    /// Help text shown to users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ParameterSpec {
    fn new(name: &str, flag: Option<&str>, value_kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            flag: flag.map(String::from),
            value_kind,
            depends_on: BTreeSet::new(),
            emission: Emission::Standard,
            hint: None,
        }
    }

    /// Creates a presence-only boolean flag.
    pub fn switch(name: &str, flag: &str) -> Self {
        Self::new(name, Some(flag), ValueKind::Bool)
    }

    /// Creates a flag that is followed by a value.
    pub fn valued(name: &str, flag: &str, value_kind: ValueKind) -> Self {
        Self::new(name, Some(flag), value_kind)
    }

    /// Creates an informational field that is never emitted.
    pub fn info(name: &str, value_kind: ValueKind) -> Self {
        Self::new(name, None, value_kind)
    }

    /// Creates the antenna pattern parameter.
    pub fn antenna_pattern(name: &str, flag: &str) -> Self {
        Self {
            emission: Emission::AntennaPattern,
            ..Self::new(name, Some(flag), ValueKind::Str)
        }
    }

    /// Adds dependencies on boolean plot attributes.
    pub fn depends_on(mut self, names: &[&str]) -> Self {
        self.depends_on.extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Emits the flag alone when the value equals `literal`.
    pub fn when_equals(mut self, literal: &str) -> Self {
        self.emission = Emission::WhenEquals(literal.to_string());
        self
    }

    /// Adds a help hint.
    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    /// Returns `true` when the spec never reaches the command line.
    ///
    /// Empty flag tokens count as informational.
    pub fn is_informational(&self) -> bool {
        self.flag.as_deref().is_none_or(str::is_empty)
    }

    /// Returns `true` when emission is routed to the point-to-point vector.
    pub fn requires_p2p(&self) -> bool {
        self.depends_on.contains(P2P_DEPENDENCY)
    }

    /// For `rx_`-prefixed names, the receiver station field to read.
    pub fn receiver_field(&self) -> Option<&str> {
        self.name.strip_prefix(RECEIVER_PREFIX)
    }
}

/// Ordered parameter tables for the four record kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub global: Vec<ParameterSpec>,
    pub plot: Vec<ParameterSpec>,
    pub antenna: Vec<ParameterSpec>,
    pub station: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Returns the specs of one group in declaration order.
    pub fn group(&self, group: ParamGroup) -> &[ParameterSpec] {
        match group {
            ParamGroup::Global => &self.global,
            ParamGroup::Plot => &self.plot,
            ParamGroup::Antenna => &self.antenna,
            ParamGroup::Station => &self.station,
        }
    }

    /// Iterates `(group, spec)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamGroup, &ParameterSpec)> {
        ParamGroup::ALL
            .into_iter()
            .flat_map(move |group| self.group(group).iter().map(move |spec| (group, spec)))
    }

    /// Finds a spec by group and name.
    pub fn find(&self, group: ParamGroup, name: &str) -> Option<&ParameterSpec> {
        self.group(group).iter().find(|spec| spec.name == name)
    }

    /// Finds the spec that owns a flag token, in any group.
    pub fn find_flag(&self, flag: &str) -> Option<(ParamGroup, &ParameterSpec)> {
        self.iter().find(|(_, spec)| spec.flag.as_deref() == Some(flag))
    }

    /// Number of specs that can reach the command line.
    pub fn flagged_count(&self) -> usize {
        self.iter()
            .filter(|(_, spec)| !spec.is_informational())
            .count()
    }
}

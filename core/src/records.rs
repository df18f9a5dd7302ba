//! Domain records consumed by argument synthesis.
//!
//! Nullable columns are `Option`s: `Some(0)` is a set zero and `None` is
//! unset, which lets the synthesizer's `EmissionPolicy` tell them
//! apart. Defaults applied on deserialization match what a freshly created
//! record carries.

use serde::{Deserialize, Serialize};

use crate::types::{ParamValue, ValueKind};
use crate::units::UnitSystem;

/// Attribute lookup by parameter name.
pub trait Record {
    /// Record kind used in diagnostics.
    const KIND: &'static str;

    /// Every attribute with its declared kind, in declaration order.
    fn fields() -> &'static [(&'static str, ValueKind)];

    /// Returns the attribute value, or `None` when the attribute is unset or
    /// unknown.
    fn value(&self, name: &str) -> Option<ParamValue>;

    /// Attribute names in declaration order.
    fn field_names() -> Vec<&'static str> {
        Self::fields().iter().map(|(name, _)| *name).collect()
    }

    /// Declared kind of an attribute.
    fn field_kind(name: &str) -> Option<ValueKind> {
        Self::fields()
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, kind)| *kind)
    }
}

fn default_radius() -> i64 {
    25
}

fn default_resolution() -> i64 {
    600
}

fn default_opacity() -> f64 {
    1.0
}

fn default_height() -> f64 {
    1.0
}

fn default_geography() -> String {
    "north america".to_string()
}

fn default_state() -> String {
    "n/a".to_string()
}

fn default_polarization() -> String {
    "vertical".to_string()
}

/// A coverage plot, optionally with a point-to-point analysis.
///
/// # Examples
///
/// ```
/// use sigplot_core::{ParamValue, Plot, Record};
///
/// let plot: Plot = serde_json::from_str(r#"{"name": "ridge-north", "frequency": 446.0}"#).unwrap();
/// assert_eq!(plot.radius, 25);
/// assert_eq!(plot.resolution, 600);
/// assert_eq!(plot.value("frequency"), Some(ParamValue::Float(446.0)));
/// assert_eq!(plot.value("ground_clutter"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub do_p2p_analysis: bool,
    #[serde(default)]
    pub use_metric_units: bool,
    #[serde(default)]
    pub use_lidar: bool,
    #[serde(default)]
    pub use_udt: bool,
    #[serde(default)]
    pub use_dbm: bool,
    #[serde(default)]
    pub use_knife_edge_diffraction: bool,
    pub frequency: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub effective_radiated_power: f64,
    #[serde(default)]
    pub ground_clutter: Option<f64>,
    #[serde(default)]
    pub resample_reduction_factor: Option<i64>,
    #[serde(default)]
    pub terrain_code: Option<i64>,
    #[serde(default)]
    pub terrain_dialectric: Option<f64>,
    #[serde(default)]
    pub terrain_conductivity: Option<f64>,
    #[serde(default)]
    pub climate_code: Option<i64>,
    #[serde(default)]
    pub itm_reliability: Option<i64>,
    #[serde(default)]
    pub itm_confidence: Option<i64>,
    #[serde(default = "default_radius")]
    pub radius: i64,
    #[serde(default = "default_resolution")]
    pub resolution: i64,
    #[serde(default)]
    pub propagation_model: Option<i64>,
    #[serde(default)]
    pub propagation_mode: Option<i64>,
    #[serde(default)]
    pub antenna_id: Option<i64>,
    #[serde(default)]
    pub station1_id: Option<i64>,
    #[serde(default)]
    pub station2_id: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Plot {
    /// Creates a plot with default settings.
    pub fn new(name: impl Into<String>, frequency: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            do_p2p_analysis: false,
            use_metric_units: false,
            use_lidar: false,
            use_udt: false,
            use_dbm: false,
            use_knife_edge_diffraction: false,
            frequency,
            opacity: default_opacity(),
            effective_radiated_power: 0.0,
            ground_clutter: None,
            resample_reduction_factor: None,
            terrain_code: None,
            terrain_dialectric: None,
            terrain_conductivity: None,
            climate_code: None,
            itm_reliability: None,
            itm_confidence: None,
            radius: default_radius(),
            resolution: default_resolution(),
            propagation_model: None,
            propagation_mode: None,
            antenna_id: None,
            station1_id: None,
            station2_id: None,
            created: None,
            last_updated: None,
        }
    }

    /// Unit system the tool is asked to use for distances.
    pub fn units(&self) -> UnitSystem {
        UnitSystem::from_metric(self.use_metric_units)
    }

    /// Unit of received signal values.
    pub fn rf_units(&self) -> &'static str {
        if self.use_dbm { "dBm" } else { "dBuV/m" }
    }

    /// Abbreviated unit of heights and ground clutter.
    pub fn distance_units(&self) -> &'static str {
        if self.use_metric_units { "m" } else { "ft" }
    }
}

impl Record for Plot {
    const KIND: &'static str = "plot";

    fn fields() -> &'static [(&'static str, ValueKind)] {
        use ValueKind::*;
        &[
            ("id", Int),
            ("name", Str),
            ("do_p2p_analysis", Bool),
            ("use_metric_units", Bool),
            ("use_lidar", Bool),
            ("use_udt", Bool),
            ("use_dbm", Bool),
            ("use_knife_edge_diffraction", Bool),
            ("frequency", Float),
            ("opacity", Float),
            ("effective_radiated_power", Float),
            ("ground_clutter", Float),
            ("resample_reduction_factor", Int),
            ("terrain_code", Int),
            ("terrain_dialectric", Float),
            ("terrain_conductivity", Float),
            ("climate_code", Int),
            ("itm_reliability", Int),
            ("itm_confidence", Int),
            ("radius", Int),
            ("resolution", Int),
            ("propagation_model", Int),
            ("propagation_mode", Int),
            ("antenna_id", Int),
            ("station1_id", Int),
            ("station2_id", Int),
            ("created", Str),
            ("last_updated", Str),
        ]
    }

    fn value(&self, name: &str) -> Option<ParamValue> {
        let value = match name {
            "id" => return self.id.map(ParamValue::Int),
            "name" => ParamValue::from(self.name.as_str()),
            "do_p2p_analysis" => ParamValue::Bool(self.do_p2p_analysis),
            "use_metric_units" => ParamValue::Bool(self.use_metric_units),
            "use_lidar" => ParamValue::Bool(self.use_lidar),
            "use_udt" => ParamValue::Bool(self.use_udt),
            "use_dbm" => ParamValue::Bool(self.use_dbm),
            "use_knife_edge_diffraction" => ParamValue::Bool(self.use_knife_edge_diffraction),
            "frequency" => ParamValue::Float(self.frequency),
            "opacity" => ParamValue::Float(self.opacity),
            "effective_radiated_power" => ParamValue::Float(self.effective_radiated_power),
            "ground_clutter" => return self.ground_clutter.map(ParamValue::Float),
            "resample_reduction_factor" => {
                return self.resample_reduction_factor.map(ParamValue::Int);
            }
            "terrain_code" => return self.terrain_code.map(ParamValue::Int),
            "terrain_dialectric" => return self.terrain_dialectric.map(ParamValue::Float),
            "terrain_conductivity" => return self.terrain_conductivity.map(ParamValue::Float),
            "climate_code" => return self.climate_code.map(ParamValue::Int),
            "itm_reliability" => return self.itm_reliability.map(ParamValue::Int),
            "itm_confidence" => return self.itm_confidence.map(ParamValue::Int),
            "radius" => ParamValue::Int(self.radius),
            "resolution" => ParamValue::Int(self.resolution),
            "propagation_model" => return self.propagation_model.map(ParamValue::Int),
            "propagation_mode" => return self.propagation_mode.map(ParamValue::Int),
            "antenna_id" => return self.antenna_id.map(ParamValue::Int),
            "station1_id" => return self.station1_id.map(ParamValue::Int),
            "station2_id" => return self.station2_id.map(ParamValue::Int),
            "created" => return self.created.clone().map(ParamValue::Str),
            "last_updated" => return self.last_updated.clone().map(ParamValue::Str),
            _ => return None,
        };
        Some(value)
    }
}

/// An antenna profile shared by both stations of a plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antenna {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Pattern file name inside the profile directory.
    pub filename: String,
    /// Antenna style; also the profile subdirectory holding the pattern.
    #[serde(rename = "type")]
    pub antenna_type: String,
    #[serde(default)]
    pub rx_gain: Option<f64>,
    #[serde(default)]
    pub rx_threshhold: Option<f64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Antenna {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        antenna_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            filename: filename.into(),
            antenna_type: antenna_type.into(),
            rx_gain: None,
            rx_threshhold: None,
            created: None,
            last_updated: None,
        }
    }
}

impl Record for Antenna {
    const KIND: &'static str = "antenna";

    fn fields() -> &'static [(&'static str, ValueKind)] {
        use ValueKind::*;
        &[
            ("id", Int),
            ("name", Str),
            ("filename", Str),
            ("type", Str),
            ("rx_gain", Float),
            ("rx_threshhold", Float),
            ("created", Str),
            ("last_updated", Str),
        ]
    }

    fn value(&self, name: &str) -> Option<ParamValue> {
        match name {
            "id" => self.id.map(ParamValue::Int),
            "name" => Some(ParamValue::from(self.name.as_str())),
            "filename" => Some(ParamValue::from(self.filename.as_str())),
            "type" => Some(ParamValue::from(self.antenna_type.as_str())),
            "rx_gain" => self.rx_gain.map(ParamValue::Float),
            "rx_threshhold" => self.rx_threshhold.map(ParamValue::Float),
            "created" => self.created.clone().map(ParamValue::Str),
            "last_updated" => self.last_updated.clone().map(ParamValue::Str),
            _ => None,
        }
    }
}

/// A transmitter or receiver station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    /// Antenna height above ground.
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_geography")]
    pub geography: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_polarization")]
    pub polarization: String,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub downtilt: f64,
    #[serde(default)]
    pub downtilt_direction: f64,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Station {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            latitude,
            longitude,
            height: default_height(),
            geography: default_geography(),
            state: default_state(),
            polarization: default_polarization(),
            rotation: 0.0,
            downtilt: 0.0,
            downtilt_direction: 0.0,
            created: None,
            last_updated: None,
        }
    }
}

impl Record for Station {
    const KIND: &'static str = "station";

    fn fields() -> &'static [(&'static str, ValueKind)] {
        use ValueKind::*;
        &[
            ("id", Int),
            ("name", Str),
            ("latitude", Float),
            ("longitude", Float),
            ("height", Float),
            ("geography", Str),
            ("state", Str),
            ("polarization", Str),
            ("rotation", Float),
            ("downtilt", Float),
            ("downtilt_direction", Float),
            ("created", Str),
            ("last_updated", Str),
        ]
    }

    fn value(&self, name: &str) -> Option<ParamValue> {
        let value = match name {
            "id" => return self.id.map(ParamValue::Int),
            "name" => ParamValue::from(self.name.as_str()),
            "latitude" => ParamValue::Float(self.latitude),
            "longitude" => ParamValue::Float(self.longitude),
            "height" => ParamValue::Float(self.height),
            "geography" => ParamValue::from(self.geography.as_str()),
            "state" => ParamValue::from(self.state.as_str()),
            "polarization" => ParamValue::from(self.polarization.as_str()),
            "rotation" => ParamValue::Float(self.rotation),
            "downtilt" => ParamValue::Float(self.downtilt),
            "downtilt_direction" => ParamValue::Float(self.downtilt_direction),
            "created" => return self.created.clone().map(ParamValue::Str),
            "last_updated" => return self.last_updated.clone().map(ParamValue::Str),
            _ => return None,
        };
        Some(value)
    }
}

/// A plot together with its related records, read-only during synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordGraph {
    pub plot: Plot,
    #[serde(default)]
    pub antenna: Option<Antenna>,
    /// Transmitter.
    #[serde(default)]
    pub station1: Option<Station>,
    /// Receiver, needed for point-to-point analysis.
    #[serde(default)]
    pub station2: Option<Station>,
}

impl RecordGraph {
    pub fn new(plot: Plot) -> Self {
        Self {
            plot,
            antenna: None,
            station1: None,
            station2: None,
        }
    }

    pub fn with_antenna(mut self, antenna: Antenna) -> Self {
        self.antenna = Some(antenna);
        self
    }

    pub fn with_transmitter(mut self, station: Station) -> Self {
        self.station1 = Some(station);
        self
    }

    pub fn with_receiver(mut self, station: Station) -> Self {
        self.station2 = Some(station);
        self
    }
}

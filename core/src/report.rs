//! Typed entities of a point-to-point analysis report.
//!
//! All entities of one report share the report's unit system; it is stored
//! as a `metric` flag on each of them so that each entity renders on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::UnitSystem;

/// Feet per meter.
pub const FEET_PER_METER: f64 = 3.28084;

/// Which end of the link a [`Site`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteRole {
    #[default]
    Transmitter,
    Receiver,
}

impl fmt::Display for SiteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmitter => write!(f, "Transmitter"),
            Self::Receiver => write!(f, "Receiver"),
        }
    }
}

/// One end of the analysed link.
///
/// `distance`, `azimuth` and `downtilt` are measured towards the other site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Site {
    pub role: SiteRole,
    pub latitude: f64,
    pub longitude: f64,
    /// Ground elevation above mean sea level.
    pub elevation: f64,
    /// Antenna height above ground.
    pub height: f64,
    pub distance: f64,
    pub azimuth: f64,
    pub downtilt: f64,
    pub metric: bool,
}

impl Site {
    pub fn new(role: SiteRole, units: UnitSystem) -> Self {
        Self {
            role,
            metric: units.is_metric(),
            ..Self::default()
        }
    }

    pub fn units(&self) -> UnitSystem {
        UnitSystem::from_metric(self.metric)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.units();
        writeln!(f, "Site: {}", self.role)?;
        writeln!(f, "Site location: {:.4}, {:.4}", self.latitude, self.longitude)?;
        writeln!(
            f,
            "Ground elevation: {} AMSL",
            units.format(self.elevation, false, false)
        )?;
        writeln!(f, "Antenna height: {} AGL", units.format(self.height, false, false))?;
        writeln!(
            f,
            "Distance to remote site: {}",
            units.format(self.distance, false, true)
        )?;
        writeln!(f, "Azimuth to remote site: {:.2} degrees grid", self.azimuth)?;
        writeln!(f, "Downtilt angle to remote site: {:.4} degrees", self.downtilt)
    }
}

fn default_fraction() -> f64 {
    0.5
}

/// Propagation model settings echoed by the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationModel {
    pub model: String,
    pub subtype: String,
    pub dielectric_constant: f64,
    /// Siemens per meter.
    pub earth_conductivity: f64,
    /// N-units.
    pub atmospheric_bending: f64,
    /// MHz.
    pub frequency: f64,
    pub radio_climate: String,
    /// Lower-cased polarization name.
    pub polarization: String,
    /// Probability in `0.0..=1.0`.
    #[serde(default = "default_fraction")]
    pub fraction_of_situations: f64,
    /// Probability in `0.0..=1.0`.
    #[serde(default = "default_fraction")]
    pub fraction_of_time: f64,
    pub rx_gain: f64,
    pub tx_erp_plus_rx_gain: f64,
    pub tx_erp_minus_rx_gain: f64,
    pub tx_eirp_plus_rx_gain: f64,
    pub tx_eirp_minus_rx_gain: f64,
}

impl Default for PropagationModel {
    fn default() -> Self {
        Self {
            model: String::new(),
            subtype: String::new(),
            dielectric_constant: 0.0,
            earth_conductivity: 0.0,
            atmospheric_bending: 0.0,
            frequency: 0.0,
            radio_climate: String::new(),
            polarization: String::new(),
            fraction_of_situations: default_fraction(),
            fraction_of_time: default_fraction(),
            rx_gain: 0.0,
            tx_erp_plus_rx_gain: 0.0,
            tx_erp_minus_rx_gain: 0.0,
            tx_eirp_plus_rx_gain: 0.0,
            tx_eirp_minus_rx_gain: 0.0,
        }
    }
}

impl fmt::Display for PropagationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Propagation model: {}", self.model)?;
        writeln!(f, "Model sub-type: {}", self.subtype)?;
        writeln!(f, "Earth's Dielectric Constant: {}", self.dielectric_constant)?;
        writeln!(f, "Earth's Conductivity: {} Siemens/meter", self.earth_conductivity)?;
        writeln!(
            f,
            "Atmospheric Bending Constant (N-units): {} ppm",
            self.atmospheric_bending
        )?;
        writeln!(f, "Frequency: {} MHz", self.frequency)?;
        writeln!(f, "Radio Climate: {}", self.radio_climate)?;
        writeln!(f, "Polarisation: {}", self.polarization)?;
        writeln!(
            f,
            "Fraction of Situations: {}%",
            self.fraction_of_situations * 100.0
        )?;
        writeln!(f, "Fraction of Time: {}%", self.fraction_of_time * 100.0)?;
        writeln!(f, "Receiver gain: {} dBd", self.rx_gain)?;
        writeln!(
            f,
            "Transmitter ERP plus Receiver gain: {} Watts",
            self.tx_erp_plus_rx_gain
        )?;
        writeln!(
            f,
            "Transmitter ERP minus Receiver gain: {} dBm",
            self.tx_erp_minus_rx_gain
        )?;
        writeln!(
            f,
            "Transmitter EIRP plus Receiver gain: {} Watts",
            self.tx_eirp_plus_rx_gain
        )?;
        writeln!(
            f,
            "Transmitter EIRP minus Receiver gain: {} dBm",
            self.tx_eirp_minus_rx_gain
        )
    }
}

/// Terrain that blocks line of sight between the sites.
///
/// # Examples
///
/// ```
/// use sigplot_core::Obstruction;
///
/// let obstruction = Obstruction {
///     latitude: 51.5082,
///     longitude: -0.5014,
///     distance: 20.27,
///     height: 118.11,
///     metric: false,
/// };
/// assert_eq!(
///     obstruction.to_descriptor(),
///     "51.5082 N, 0.5014 W, 20.27 miles, 118.11 feet AMSL"
/// );
/// assert!((obstruction.metric_height() - 36.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Obstruction {
    /// Negative south of the equator.
    pub latitude: f64,
    /// Negative west of Greenwich.
    pub longitude: f64,
    /// Distance from the transmitter, in miles or kilometers.
    pub distance: f64,
    /// Height above mean sea level, in feet or meters.
    pub height: f64,
    pub metric: bool,
}

impl Obstruction {
    pub fn units(&self) -> UnitSystem {
        UnitSystem::from_metric(self.metric)
    }

    /// Height above mean sea level in meters.
    pub fn metric_height(&self) -> f64 {
        if self.metric {
            self.height
        } else {
            self.height / FEET_PER_METER
        }
    }

    /// Encodes the obstruction in the report's descriptor grammar.
    pub fn to_descriptor(&self) -> String {
        let units = self.units();
        let north_south = if self.latitude < 0.0 { 'S' } else { 'N' };
        let east_west = if self.longitude < 0.0 { 'W' } else { 'E' };
        format!(
            "{} {north_south}, {} {east_west}, {}, {} AMSL",
            self.latitude.abs(),
            self.longitude.abs(),
            units.format(self.distance, false, true),
            units.format(self.height, false, false),
        )
    }
}

impl fmt::Display for Obstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.units();
        write!(
            f,
            "({}, {}) - {}, {} AMSL",
            self.latitude,
            self.longitude,
            units.format(self.distance, false, true),
            units.format(self.height, true, false)
        )
    }
}

/// Link budget between the two sites.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    /// dB.
    pub free_space_path_loss: f64,
    /// dB.
    pub computed_path_loss: f64,
    /// dB.
    pub terrain_shielding_attenuation: f64,
    /// dBuV/m.
    pub field_strength_at_rx: f64,
    /// dBm.
    pub power_level_at_rx: f64,
    /// dBW per square meter.
    pub power_density_at_rx: f64,
    /// uV.
    pub voltage_50ohm_dipole: f64,
    /// uV.
    pub voltage_75ohm_dipole: f64,
    pub longley_rice_error: i32,
    /// Height above ground the receiver antenna needs to clear all obstructions.
    pub rx_adjustment_to_clear_obstructions: f64,
    /// Height above ground to clear the first Fresnel zone.
    pub rx_adjustment_to_clear_first_fresnel_zone: f64,
    /// Height above ground to clear 60% of the first Fresnel zone.
    pub rx_adjustment_to_clear_first_fresnel_zone60: f64,
    /// Transmitter to receiver order.
    pub obstructions: Vec<Obstruction>,
    pub metric: bool,
}

impl Link {
    pub fn new(units: UnitSystem) -> Self {
        Self {
            metric: units.is_metric(),
            ..Self::default()
        }
    }

    pub fn units(&self) -> UnitSystem {
        UnitSystem::from_metric(self.metric)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.units();
        writeln!(f, "Link Summary:")?;
        writeln!(f, "Free space path loss: {} dB", self.free_space_path_loss)?;
        writeln!(f, "Computed path loss: {} dB", self.computed_path_loss)?;
        writeln!(
            f,
            "Attenuation due to terrain shielding: {} dB",
            self.terrain_shielding_attenuation
        )?;
        writeln!(f, "Field strength at Rx: {} dBuV/meter", self.field_strength_at_rx)?;
        writeln!(f, "Signal power level at Rx: {} dBm", self.power_level_at_rx)?;
        writeln!(
            f,
            "Signal power density at Rx: {} dBW per square meter",
            self.power_density_at_rx
        )?;
        writeln!(
            f,
            "Voltage across 50 ohm dipole at Rx: {} uV",
            self.voltage_50ohm_dipole
        )?;
        writeln!(
            f,
            "Voltage across 75 ohm dipole at Rx: {} uV",
            self.voltage_75ohm_dipole
        )?;
        writeln!(f, "Longley-Rice model error number: {}", self.longley_rice_error)?;
        let adjustments = [
            (
                self.rx_adjustment_to_clear_obstructions,
                "to clear all obstructions detected",
            ),
            (
                self.rx_adjustment_to_clear_first_fresnel_zone,
                "to clear the first Fresnel zone",
            ),
            (
                self.rx_adjustment_to_clear_first_fresnel_zone60,
                "to clear 60% of the first Fresnel zone",
            ),
        ];
        for (height, purpose) in adjustments {
            writeln!(
                f,
                "- Antenna at Rx must be raised to at least {} AGL {purpose}.",
                units.format(height, false, false)
            )?;
        }
        writeln!(f, "Obstructions:")?;
        if self.obstructions.is_empty() {
            return writeln!(f, "None");
        }
        for obstruction in &self.obstructions {
            writeln!(f, "{obstruction}")?;
        }
        Ok(())
    }
}

/// A fully decoded point-to-point analysis report.
///
/// Reports are immutable once built and safe to share across threads.
///
/// # Examples
///
/// ```
/// use sigplot_core::*;
///
/// let report = AnalysisReport::new(
///     Site::new(SiteRole::Transmitter, UnitSystem::Imperial),
///     Site::new(SiteRole::Receiver, UnitSystem::Imperial),
///     PropagationModel::default(),
///     Link::new(UnitSystem::Imperial),
/// );
/// assert_eq!(report.units(), UnitSystem::Imperial);
/// assert!(report.obstructions().is_empty());
/// assert!(report.to_string().starts_with("Analysis Report:"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    transmitter: Site,
    receiver: Site,
    model: PropagationModel,
    link: Link,
}

impl AnalysisReport {
    pub fn new(transmitter: Site, receiver: Site, model: PropagationModel, link: Link) -> Self {
        Self {
            transmitter,
            receiver,
            model,
            link,
        }
    }

    pub fn transmitter(&self) -> &Site {
        &self.transmitter
    }

    pub fn receiver(&self) -> &Site {
        &self.receiver
    }

    pub fn model(&self) -> &PropagationModel {
        &self.model
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn obstructions(&self) -> &[Obstruction] {
        &self.link.obstructions
    }

    /// Unit system the report was written in.
    pub fn units(&self) -> UnitSystem {
        self.link.units()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Report:")?;
        writeln!(f, "{}", self.transmitter)?;
        writeln!(f, "{}", self.receiver)?;
        writeln!(f, "{}", self.model)?;
        write!(f, "{}", self.link)
    }
}

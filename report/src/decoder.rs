//! Single-pass decoder for point-to-point analysis reports.
//!
//! The report is a sequence of prefix-keyed lines. One scan walks it through
//! [`DecoderState`]: two site blocks, the propagation model block and the
//! link summary. Field prefixes are exact and case-sensitive.
//!
//! The three receiver-height adjustment lines share one prefix and are told
//! apart only by their order, which [`AdjustmentCounter`] tracks. When the
//! path is clear the tool prints `No obstructions to LOS path` in place of
//! the first of them.

use std::collections::HashSet;
use std::path::Path;

use sigplot_core::{AnalysisReport, Link, PropagationModel, Site, SiteRole, UnitSystem};
use tracing::{debug, info};

use crate::descriptor::{Axis, parse_coordinate, parse_obstruction_in};
use crate::error::{ReportError, Section};

const TRANSMITTER_HEADER: &str = "Transmitter site:";
const RECEIVER_HEADER: &str = "Receiver site:";
const LINK_SUMMARY_HEADER: &str = "Summary for the link between Tx and Rx:";
const RAISE_PREFIX: &str = "Antenna at Rx must be raised";
const NO_OBSTRUCTIONS: &str = "No obstructions to LOS path";
const DESCRIPTOR_INDENT: &str = "    ";

/// Position of the scan within the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Between sections, waiting for the header of `awaiting`.
    Seeking { awaiting: Section },
    InTransmitter,
    InReceiver,
    InModel,
    InLinkSummary,
    Done,
}

/// Receiver-height adjustment a `must be raised` line fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentSlot {
    ClearObstructions,
    FirstFresnelZone,
    FirstFresnelZone60,
}

/// Ordinal tracker for the receiver-height adjustment lines.
///
/// # Examples
///
/// ```
/// use sigplot_report::decoder::{AdjustmentCounter, AdjustmentSlot};
///
/// let mut counter = AdjustmentCounter::default();
/// // "No obstructions to LOS path" stands in for the first slot.
/// counter.next_slot();
/// assert_eq!(counter.next_slot(), Some(AdjustmentSlot::FirstFresnelZone));
/// assert_eq!(counter.next_slot(), Some(AdjustmentSlot::FirstFresnelZone60));
/// assert_eq!(counter.next_slot(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentCounter {
    consumed: usize,
}

impl AdjustmentCounter {
    const SLOTS: [AdjustmentSlot; 3] = [
        AdjustmentSlot::ClearObstructions,
        AdjustmentSlot::FirstFresnelZone,
        AdjustmentSlot::FirstFresnelZone60,
    ];

    /// Consumes and returns the next slot, or `None` once all are used.
    pub fn next_slot(&mut self) -> Option<AdjustmentSlot> {
        let slot = Self::SLOTS.get(self.consumed).copied()?;
        self.consumed += 1;
        Some(slot)
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Decodes report text.
///
/// # Examples
///
/// ```
/// use sigplot_report::decode;
///
/// let text = "\
/// Transmitter site: Tx
/// Site location: 51.5000, -0.1200
/// Downtilt angle to Rx: -0.1000 degrees
/// Receiver site: Rx
/// Site location: 51.6000, -0.2000
/// Downtilt angle to Tx: 0.1000 degrees
/// Frequency: 446.000 MHz
/// Summary for the link between Tx and Rx:
/// Free space path loss: 98.50 dB
/// ";
/// let report = decode(text).unwrap();
/// assert_eq!(report.model().frequency, 446.0);
/// assert_eq!(report.receiver().longitude, -0.2);
/// ```
pub fn decode(text: &str) -> Result<AnalysisReport, ReportError> {
    ReportDecoder::new(text).decode()
}

/// Reads and decodes a report file.
pub fn decode_file(path: impl AsRef<Path>) -> Result<AnalysisReport, ReportError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "Read analysis report");
    decode(&text)
}

/// Line-driven report decoder.
pub struct ReportDecoder<'a> {
    text: &'a str,
    units: UnitSystem,
    state: DecoderState,
    entered: HashSet<Section>,
    model_fields: usize,
    adjustments: AdjustmentCounter,
    transmitter: Site,
    receiver: Site,
    model: PropagationModel,
    link: Link,
}

impl<'a> ReportDecoder<'a> {
    pub fn new(text: &'a str) -> Self {
        let units = UnitSystem::detect(text);
        Self {
            text,
            units,
            state: DecoderState::Seeking {
                awaiting: Section::Transmitter,
            },
            entered: HashSet::new(),
            model_fields: 0,
            adjustments: AdjustmentCounter::default(),
            transmitter: Site::new(SiteRole::Transmitter, units),
            receiver: Site::new(SiteRole::Receiver, units),
            model: PropagationModel::default(),
            link: Link::new(units),
        }
    }

    /// Runs the scan and assembles the report.
    pub fn decode(mut self) -> Result<AnalysisReport, ReportError> {
        let text = self.text;
        for (index, line) in text.lines().enumerate() {
            self.step(index + 1, line)?;
        }
        self.enter(DecoderState::Done);

        if let Some(section) = Section::ALL
            .into_iter()
            .find(|section| !self.entered.contains(section))
        {
            return Err(ReportError::MissingSection { section });
        }
        if self.model_fields == 0 {
            return Err(ReportError::MissingSection {
                section: Section::PropagationModel,
            });
        }

        info!(
            units = ?self.units,
            obstructions = self.link.obstructions.len(),
            adjustments = self.adjustments.consumed(),
            "Decoded analysis report"
        );
        Ok(AnalysisReport::new(
            self.transmitter,
            self.receiver,
            self.model,
            self.link,
        ))
    }

    fn enter(&mut self, state: DecoderState) {
        debug!(from = ?self.state, to = ?state, "Report decoder transition");
        self.state = state;
        let section = match state {
            DecoderState::InTransmitter => Section::Transmitter,
            DecoderState::InReceiver => Section::Receiver,
            DecoderState::InModel => Section::PropagationModel,
            DecoderState::InLinkSummary => Section::LinkSummary,
            DecoderState::Seeking { .. } | DecoderState::Done => return,
        };
        self.entered.insert(section);
    }

    fn step(&mut self, number: usize, line: &str) -> Result<(), ReportError> {
        match self.state {
            DecoderState::Seeking { awaiting } => {
                let header = match awaiting {
                    Section::Transmitter => TRANSMITTER_HEADER,
                    Section::Receiver => RECEIVER_HEADER,
                    Section::PropagationModel | Section::LinkSummary => return Ok(()),
                };
                if line.starts_with(header) {
                    let next = if awaiting == Section::Transmitter {
                        DecoderState::InTransmitter
                    } else {
                        DecoderState::InReceiver
                    };
                    self.enter(next);
                }
                Ok(())
            }
            DecoderState::InTransmitter => {
                let done = site_field(&mut self.transmitter, "Rx", number, line)?;
                if done {
                    self.enter(DecoderState::Seeking {
                        awaiting: Section::Receiver,
                    });
                }
                Ok(())
            }
            DecoderState::InReceiver => {
                let done = site_field(&mut self.receiver, "Tx", number, line)?;
                if done {
                    self.enter(DecoderState::InModel);
                }
                Ok(())
            }
            DecoderState::InModel => {
                if line.starts_with(LINK_SUMMARY_HEADER) {
                    self.enter(DecoderState::InLinkSummary);
                    return Ok(());
                }
                if model_field(&mut self.model, number, line)? {
                    self.model_fields += 1;
                }
                Ok(())
            }
            DecoderState::InLinkSummary => self.link_line(number, line),
            DecoderState::Done => Ok(()),
        }
    }

    fn link_line(&mut self, number: usize, line: &str) -> Result<(), ReportError> {
        let trimmed = line.trim_start();
        if trimmed.starts_with(RAISE_PREFIX) {
            let Some(slot) = self.adjustments.next_slot() else {
                debug!(line = number, "Ignoring extra receiver height adjustment");
                return Ok(());
            };
            let value = raise_height(number, trimmed)?;
            match slot {
                AdjustmentSlot::ClearObstructions => {
                    self.link.rx_adjustment_to_clear_obstructions = value;
                }
                AdjustmentSlot::FirstFresnelZone => {
                    self.link.rx_adjustment_to_clear_first_fresnel_zone = value;
                }
                AdjustmentSlot::FirstFresnelZone60 => {
                    self.link.rx_adjustment_to_clear_first_fresnel_zone60 = value;
                }
            }
            return Ok(());
        }
        if trimmed.starts_with(NO_OBSTRUCTIONS) {
            self.adjustments.next_slot();
            return Ok(());
        }
        if line.starts_with(DESCRIPTOR_INDENT) && !trimmed.is_empty() {
            let obstruction = parse_obstruction_in(line, self.units)
                .map_err(|source| ReportError::Descriptor {
                    section: Section::LinkSummary,
                    line: number,
                    source,
                })?;
            self.link.obstructions.push(obstruction);
            return Ok(());
        }
        link_field(&mut self.link, number, line)?;
        Ok(())
    }
}

/// Applies one site line. Returns `true` on the terminating downtilt line.
fn site_field(
    site: &mut Site,
    remote: &str,
    number: usize,
    line: &str,
) -> Result<bool, ReportError> {
    let section = match site.role {
        SiteRole::Transmitter => Section::Transmitter,
        SiteRole::Receiver => Section::Receiver,
    };
    let field = FieldLine {
        section,
        number,
        line,
    };

    if line.starts_with("Site location:") {
        let (latitude, longitude) = field.location()?;
        site.latitude = latitude;
        site.longitude = longitude;
    } else if line.starts_with("Ground elevation:") {
        site.elevation = field.number()?;
    } else if line.starts_with("Antenna height:") {
        site.height = field.number()?;
    } else if line.starts_with(&format!("Distance to {remote}:")) {
        site.distance = field.number()?;
    } else if line.starts_with(&format!("Azimuth to {remote}:")) {
        site.azimuth = field.number()?;
    } else if line.starts_with(&format!("Downtilt angle to {remote}:")) {
        site.downtilt = field.number()?;
        return Ok(true);
    }
    Ok(false)
}

/// Applies one model line. Returns `true` when the line was a model field.
fn model_field(
    model: &mut PropagationModel,
    number: usize,
    line: &str,
) -> Result<bool, ReportError> {
    let field = FieldLine {
        section: Section::PropagationModel,
        number,
        line,
    };

    if line.starts_with("Propagation model:") {
        model.model = field.text()?;
    } else if line.starts_with("Model sub-type:") {
        model.subtype = field.text()?;
    } else if line.starts_with("Earth's Dielectric Constant:") {
        model.dielectric_constant = field.number()?;
    } else if line.starts_with("Earth's Conductivity:") {
        model.earth_conductivity = field.number()?;
    } else if line.starts_with("Atmospheric Bending Constant (N-units):") {
        model.atmospheric_bending = field.number()?;
    } else if line.starts_with("Frequency:") {
        model.frequency = field.number()?;
    } else if line.starts_with("Radio Climate:") {
        model.radio_climate = field.parenthesized()?;
    } else if line.starts_with("Polarization:") || line.starts_with("Polarisation:") {
        model.polarization = field.parenthesized()?.to_lowercase();
    } else if line.starts_with("Fraction of Situations:") {
        model.fraction_of_situations = field.percent()?;
    } else if line.starts_with("Fraction of Time:") {
        model.fraction_of_time = field.percent()?;
    } else if line.starts_with("Receiver gain:") {
        model.rx_gain = field.number()?;
    } else if line.starts_with("Transmitter ERP plus") {
        model.tx_erp_plus_rx_gain = field.number()?;
    } else if line.starts_with("Transmitter ERP minus") {
        model.tx_erp_minus_rx_gain = field.number()?;
    } else if line.starts_with("Transmitter EIRP plus") {
        model.tx_eirp_plus_rx_gain = field.number()?;
    } else if line.starts_with("Transmitter EIRP minus") {
        model.tx_eirp_minus_rx_gain = field.number()?;
    } else {
        return Ok(false);
    }
    Ok(true)
}

fn link_field(link: &mut Link, number: usize, line: &str) -> Result<(), ReportError> {
    let field = FieldLine {
        section: Section::LinkSummary,
        number,
        line,
    };

    if line.starts_with("Free space path loss:") {
        link.free_space_path_loss = field.number()?;
    } else if line.starts_with("Computed path loss:") {
        link.computed_path_loss = field.number()?;
    } else if line.starts_with("Attenuation due to") {
        link.terrain_shielding_attenuation = field.number()?;
    } else if line.starts_with("Field strength") {
        link.field_strength_at_rx = field.number()?;
    } else if line.starts_with("Signal power level") {
        link.power_level_at_rx = field.number()?;
    } else if line.starts_with("Signal power density") {
        link.power_density_at_rx = field.number()?;
    } else if line.starts_with("Voltage across 50 ohm") {
        link.voltage_50ohm_dipole = field.number()?;
    } else if line.starts_with("Voltage across 75 ohm") {
        link.voltage_75ohm_dipole = field.number()?;
    } else if line.starts_with("Longley-Rice model") {
        link.longley_rice_error = field.number()?;
    }
    Ok(())
}

/// Height from `Antenna at Rx must be raised to at least <h> <unit> ...`.
fn raise_height(number: usize, line: &str) -> Result<f64, ReportError> {
    let invalid = |reason: String| ReportError::InvalidField {
        section: Section::LinkSummary,
        line: number,
        reason,
    };
    let (_, rest) = line
        .split_once("at least ")
        .ok_or_else(|| invalid("adjustment has no 'at least' height".to_string()))?;
    let token = rest.split_whitespace().next().unwrap_or_default();
    token
        .parse()
        .map_err(|_| invalid(format!("invalid adjustment height '{token}'")))
}

/// A `<prefix>: <value> ...` line of a known section.
struct FieldLine<'a> {
    section: Section,
    number: usize,
    line: &'a str,
}

impl FieldLine<'_> {
    fn invalid(&self, reason: impl Into<String>) -> ReportError {
        ReportError::InvalidField {
            section: self.section,
            line: self.number,
            reason: reason.into(),
        }
    }

    /// Everything after the first `": "`.
    fn value(&self) -> Result<&str, ReportError> {
        self.line
            .split_once(": ")
            .map(|(_, value)| value.trim())
            .ok_or_else(|| self.invalid(format!("missing value in '{}'", self.line.trim())))
    }

    fn text(&self) -> Result<String, ReportError> {
        self.value().map(str::to_string)
    }

    /// First whitespace token of the value, parsed as `T`.
    fn number<T: std::str::FromStr>(&self) -> Result<T, ReportError> {
        let token = self.value()?.split_whitespace().next().unwrap_or_default();
        token
            .parse()
            .map_err(|_| self.invalid(format!("invalid number '{token}'")))
    }

    /// Percentage converted to a probability.
    fn percent(&self) -> Result<f64, ReportError> {
        let token = self.value()?.split_whitespace().next().unwrap_or_default();
        let percent: f64 = token
            .trim_end_matches('%')
            .parse()
            .map_err(|_| self.invalid(format!("invalid percentage '{token}'")))?;
        Ok(percent / 100.0)
    }

    /// Text between the first `(` and the last `)` of the value.
    fn parenthesized(&self) -> Result<String, ReportError> {
        let value = self.value()?;
        value
            .find('(')
            .zip(value.rfind(')'))
            .filter(|(open, close)| open < close)
            .map(|(open, close)| value[open + 1..close].trim().to_string())
            .ok_or_else(|| self.invalid(format!("expected parenthesized value in '{value}'")))
    }

    /// `<latitude>, <longitude>`, each signed or with a hemisphere letter.
    fn location(&self) -> Result<(f64, f64), ReportError> {
        let value = self.value()?;
        let (latitude, longitude) = value
            .split_once(',')
            .ok_or_else(|| self.invalid(format!("expected 'latitude, longitude' in '{value}'")))?;
        let latitude = parse_coordinate(latitude, Axis::Latitude)
            .map_err(|e| self.invalid(e.to_string()))?;
        let longitude = parse_coordinate(longitude, Axis::Longitude)
            .map_err(|e| self.invalid(e.to_string()))?;
        Ok((latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorError;

    const MINIMAL: &str = "\
Transmitter site: Tx
Site location: 10.0000, 20.0000
Downtilt angle to Rx: 0.5000 degrees
Receiver site: Rx
Site location: 11.0000, 21.0000
Downtilt angle to Tx: -0.5000 degrees
Propagation model: Irregular Terrain Model
Summary for the link between Tx and Rx:
";

    fn with_link(lines: &str) -> String {
        format!("{MINIMAL}{lines}")
    }

    #[test]
    fn test_adjustment_counter_exhausts() {
        let mut counter = AdjustmentCounter::default();
        assert_eq!(counter.next_slot(), Some(AdjustmentSlot::ClearObstructions));
        assert_eq!(counter.next_slot(), Some(AdjustmentSlot::FirstFresnelZone));
        assert_eq!(counter.next_slot(), Some(AdjustmentSlot::FirstFresnelZone60));
        assert_eq!(counter.next_slot(), None);
        assert_eq!(counter.consumed(), 3);
    }

    #[test]
    fn test_minimal_report_decodes() {
        let report = decode(MINIMAL).unwrap();
        assert_eq!(report.transmitter().latitude, 10.0);
        assert_eq!(report.transmitter().longitude, 20.0);
        assert_eq!(report.transmitter().downtilt, 0.5);
        assert_eq!(report.receiver().downtilt, -0.5);
        assert_eq!(report.model().model, "Irregular Terrain Model");
        assert_eq!(report.model().fraction_of_time, 0.5);
        assert!(report.obstructions().is_empty());
    }

    #[test]
    fn test_missing_sections() {
        let err = decode("Receiver site: Rx\n").unwrap_err();
        assert!(matches!(
            err,
            ReportError::MissingSection {
                section: Section::Transmitter
            }
        ));

        let without_link = MINIMAL.replace(LINK_SUMMARY_HEADER, "");
        assert!(matches!(
            decode(&without_link).unwrap_err(),
            ReportError::MissingSection {
                section: Section::LinkSummary
            }
        ));
    }

    #[test]
    fn test_empty_model_section_is_missing() {
        let without_model = MINIMAL.replace("Propagation model: Irregular Terrain Model\n", "");
        assert!(matches!(
            decode(&without_model).unwrap_err(),
            ReportError::MissingSection {
                section: Section::PropagationModel
            }
        ));
    }

    #[test]
    fn test_percent_and_parenthesized_fields() {
        let text = MINIMAL.replace(
            "Propagation model: Irregular Terrain Model\n",
            "Radio Climate: 5 (Continental Temperate)\n\
             Polarization: 0 (Horizontal)\n\
             Fraction of Situations: 50%\n\
             Fraction of Time: 90.0%\n",
        );
        let report = decode(&text).unwrap();
        assert_eq!(report.model().radio_climate, "Continental Temperate");
        assert_eq!(report.model().polarization, "horizontal");
        assert_eq!(report.model().fraction_of_situations, 0.5);
        assert_eq!(report.model().fraction_of_time, 0.9);
    }

    #[test]
    fn test_adjustments_by_ordinal() {
        let report = decode(&with_link(
            "Antenna at Rx must be raised to at least 88.52 feet AGL to clear all obstructions detected.\n\
             Antenna at Rx must be raised to at least 140.17 feet AGL to clear the first Fresnel zone.\n\
             Antenna at Rx must be raised to at least 105.33 feet AGL to clear 60% of the first Fresnel zone.\n\
             Antenna at Rx must be raised to at least 999 feet AGL to clear something else.\n",
        ))
        .unwrap();
        let link = report.link();
        assert_eq!(link.rx_adjustment_to_clear_obstructions, 88.52);
        assert_eq!(link.rx_adjustment_to_clear_first_fresnel_zone, 140.17);
        assert_eq!(link.rx_adjustment_to_clear_first_fresnel_zone60, 105.33);
    }

    #[test]
    fn test_clear_path_skips_first_adjustment() {
        let report = decode(&with_link(
            "No obstructions to LOS path due to terrain were detected by SIGNALSERVER\n\
             Antenna at Rx must be raised to at least 12.00 meters AGL to clear the first Fresnel zone.\n\
             Antenna at Rx must be raised to at least 4.50 meters AGL to clear 60% of the first Fresnel zone.\n",
        ))
        .unwrap();
        let link = report.link();
        assert_eq!(link.rx_adjustment_to_clear_obstructions, 0.0);
        assert_eq!(link.rx_adjustment_to_clear_first_fresnel_zone, 12.0);
        assert_eq!(link.rx_adjustment_to_clear_first_fresnel_zone60, 4.5);
    }

    #[test]
    fn test_obstructions_keep_order_and_report_units() {
        let report = decode(&with_link(
            "Distance to Rx: 20.27 miles\n\
             \x20   51.5082 N,   0.5014 W, 2.10 miles, 118.11 feet AMSL\n\
             \x20   51.5090 N,   0.6100 W, 6.70 miles, 140.00 feet AMSL\n",
        ))
        .unwrap();
        let obstructions = report.obstructions();
        assert_eq!(obstructions.len(), 2);
        assert_eq!(obstructions[0].distance, 2.1);
        assert_eq!(obstructions[1].longitude, -0.61);
        assert!(obstructions.iter().all(|o| !o.metric));
        assert!(!report.transmitter().metric);
    }

    #[test]
    fn test_bad_descriptor_reports_line() {
        let err = decode(&with_link("    51.5 N, 0.5 W, 2 miles\n")).unwrap_err();
        match err {
            ReportError::Descriptor { section, line, .. } => {
                assert_eq!(section, Section::LinkSummary);
                assert_eq!(line, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_signed_descriptor_is_rejected() {
        let err = decode(&with_link("    51.5000, -0.5000, 1.20 miles, 123.00 feet AMSL\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Descriptor {
                source: DescriptorError::MissingHemisphere { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("link summary"));
    }

    #[test]
    fn test_invalid_number_reports_section() {
        let text = MINIMAL.replace("Site location: 11.0000, 21.0000", "Site location: eleven");
        match decode(&text).unwrap_err() {
            ReportError::InvalidField { section, line, .. } => {
                assert_eq!(section, Section::Receiver);
                assert_eq!(line, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hemisphere_site_location() {
        let text = MINIMAL.replace("Site location: 10.0000, 20.0000", "Site location: 10.0 S, 20.0 W");
        let report = decode(&text).unwrap();
        assert_eq!(report.transmitter().latitude, -10.0);
        assert_eq!(report.transmitter().longitude, -20.0);
    }

    #[test]
    fn test_decode_file_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_file(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}

//! Metric/imperial unit handling.
//!
//! The tool never declares its unit system in the report; it is inferred
//! from vocabulary. A report is internally consistent, so detection runs once
//! per report and every entity decoded from it shares the result.

use serde::{Deserialize, Serialize};

/// Unit system of a report or of a formatted value.
///
/// # Examples
///
/// ```
/// use sigplot_core::UnitSystem;
///
/// let units = UnitSystem::detect("Distance to Rx: 5.20 miles");
/// assert_eq!(units, UnitSystem::Imperial);
/// assert_eq!(units.format(1.0, false, true), "1 mile");
/// assert_eq!(units.format(20.27, false, true), "20.27 miles");
/// assert_eq!(UnitSystem::Metric.format(3.0, true, false), "3 m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy)]
struct UnitNames {
    abbreviation: &'static str,
    singular: &'static str,
    plural: &'static str,
}

impl UnitNames {
    const fn new(abbreviation: &'static str, singular: &'static str, plural: &'static str) -> Self {
        Self {
            abbreviation,
            singular,
            plural,
        }
    }
}

// [small, large]
const IMPERIAL_UNITS: [UnitNames; 2] = [
    UnitNames::new("ft", "foot", "feet"),
    UnitNames::new("mi", "mile", "miles"),
];
const METRIC_UNITS: [UnitNames; 2] = [
    UnitNames::new("m", "meter", "meters"),
    UnitNames::new("km", "kilometer", "kilometers"),
];

impl UnitSystem {
    /// Detects the unit system of report text.
    ///
    /// Imperial iff the literal substring `"mile"` occurs anywhere.
    pub fn detect(text: &str) -> Self {
        if text.contains("mile") {
            Self::Imperial
        } else {
            Self::Metric
        }
    }

    /// Maps a stored `metric` flag back to a unit system.
    pub fn from_metric(metric: bool) -> Self {
        if metric { Self::Metric } else { Self::Imperial }
    }

    pub fn is_metric(self) -> bool {
        self == Self::Metric
    }

    /// Formats `value` with a unit name.
    ///
    /// `large_unit` picks miles/kilometers instead of feet/meters. The full
    /// word is singular below 2 and plural otherwise; abbreviations never
    /// pluralize.
    pub fn format(self, value: f64, abbreviated: bool, large_unit: bool) -> String {
        let table = match self {
            Self::Imperial => &IMPERIAL_UNITS,
            Self::Metric => &METRIC_UNITS,
        };
        let names = table[usize::from(large_unit)];
        let unit = if abbreviated {
            names.abbreviation
        } else if value < 2.0 {
            names.singular
        } else {
            names.plural
        };
        format!("{value} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_keys_on_mile_substring() {
        assert_eq!(UnitSystem::detect("20.27 miles"), UnitSystem::Imperial);
        assert_eq!(UnitSystem::detect("1 mile"), UnitSystem::Imperial);
        assert_eq!(UnitSystem::detect("32.6 kilometers"), UnitSystem::Metric);
        assert_eq!(UnitSystem::detect(""), UnitSystem::Metric);
        // Case-sensitive by contract.
        assert_eq!(UnitSystem::detect("MILES"), UnitSystem::Metric);
    }

    #[test]
    fn test_full_word_pluralization() {
        let imperial = UnitSystem::Imperial;
        assert_eq!(imperial.format(1.5, false, false), "1.5 foot");
        assert_eq!(imperial.format(2.0, false, false), "2 feet");
        assert_eq!(imperial.format(0.0, false, true), "0 mile");

        let metric = UnitSystem::Metric;
        assert_eq!(metric.format(1.0, false, false), "1 meter");
        assert_eq!(metric.format(12.5, false, true), "12.5 kilometers");
    }

    #[test]
    fn test_abbreviations_never_pluralize() {
        assert_eq!(UnitSystem::Imperial.format(118.11, true, false), "118.11 ft");
        assert_eq!(UnitSystem::Imperial.format(20.0, true, true), "20 mi");
        assert_eq!(UnitSystem::Metric.format(5.0, true, true), "5 km");
    }

    #[test]
    fn test_from_metric_round_trip() {
        assert!(UnitSystem::from_metric(true).is_metric());
        assert!(!UnitSystem::from_metric(false).is_metric());
    }
}

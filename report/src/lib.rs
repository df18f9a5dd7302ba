//! Decoding of `signalserver` point-to-point analysis reports.
//!
//! The tool writes a plain-text report beside its output image when a
//! point-to-point analysis runs. This crate turns that text into a typed
//! [`AnalysisReport`] and renders it back out as JSON, YAML, text or
//! Markdown.
//!
//! # Main entry points
//!
//! - [`decode`]: decode report text already in memory.
//! - [`decode_file`]: read and decode a report file.
//! - [`output::format_report`]: render a decoded report.
//! - [`descriptor::parse_obstruction`]: decode a single obstruction line.
//!
//! # Example
//!
//! ```
//! use sigplot_report::decode;
//!
//! let text = "\
//! Transmitter site: Tx
//! Site location: 51.8490, -0.9440
//! Ground elevation: 364.17 feet AMSL
//! Downtilt angle to Rx: -0.1140 degrees
//!
//! Receiver site: Rx
//! Site location: 51.8390, -1.4240
//! Distance to Tx: 20.27 miles
//! Downtilt angle to Tx: -0.1470 degrees
//!
//! Propagation model: Irregular Terrain Model
//! Fraction of Situations: 50%
//!
//! Summary for the link between Tx and Rx:
//! Computed path loss: 141.88 dB
//!     51.5082 N,   0.5014 W, 2.96 miles, 118.11 feet AMSL
//! ";
//!
//! let report = decode(text).unwrap();
//! assert!(!report.units().is_metric());
//! assert_eq!(report.model().fraction_of_situations, 0.5);
//! assert_eq!(report.obstructions()[0].longitude, -0.5014);
//! ```
//!
//! [`AnalysisReport`]: sigplot_core::AnalysisReport

pub mod decoder;
pub mod descriptor;
mod error;
pub mod output;

pub use decoder::{decode, decode_file};
pub use error::{ReportError, Section};

//! Core types shared by argument synthesis and report decoding.
//!
//! This crate defines the two ends of the `signalserver` protocol:
//!
//! - [`ParameterSchema`] / [`ParameterSpec`]: typed table of command-line
//!   parameters, grouped by the record kind each value is read from, with
//!   the built-in [`ParameterSchema::signalserver`] table.
//! - [`Plot`], [`Antenna`], [`Station`] and [`RecordGraph`]: the domain
//!   records values are looked up in, via the [`Record`] trait.
//! - [`AnalysisReport`] and its parts ([`Site`], [`PropagationModel`],
//!   [`Link`], [`Obstruction`]): what the tool reports back.
//! - [`UnitSystem`]: metric/imperial detection and formatting shared by both
//!   directions.
//!
//! Validation ([`validate_schema`]) catches malformed parameter tables
//! before they are used to build a command line.
//!
//! # Example
//!
//! ```
//! use sigplot_core::*;
//!
//! let schema = ParameterSchema::signalserver();
//! assert!(validate_schema(&schema).is_empty());
//!
//! let spec = schema.find(ParamGroup::Plot, "frequency").unwrap();
//! assert_eq!(spec.flag.as_deref(), Some("-f"));
//!
//! let plot = Plot::new("hilltop-coverage", 446.0);
//! assert_eq!(plot.value(&spec.name), Some(ParamValue::Float(446.0)));
//! ```

mod records;
mod report;
mod schema;
mod signalserver;
mod types;
mod units;
mod validate;

pub use records::{Antenna, Plot, Record, RecordGraph, Station};
pub use report::{
    AnalysisReport, FEET_PER_METER, Link, Obstruction, PropagationModel, Site, SiteRole,
};
pub use schema::{Emission, ParameterSchema, ParameterSpec};
pub use types::*;
pub use units::UnitSystem;
pub use validate::{SchemaError, validate_schema};

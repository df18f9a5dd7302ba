//! Argument synthesis and two-pass invocation of `signalserver`.
//!
//! - [`Synthesizer`] turns a [`ParameterSchema`], a [`RecordGraph`] and the
//!   tool-wide options of a [`ToolConfig`] into [`ArgumentVectors`].
//! - [`ToolRunner`] / [`ProcessRunner`] run the tool with a timeout.
//! - [`BoundingBox`] decodes the extent printed after an area plot.
//! - [`PlotRun`] drives the area pass and the optional point-to-point pass,
//!   decoding the report with [`sigplot_report`].
//!
//! # Example
//!
//! ```
//! use sigplot_core::{Antenna, ParameterSchema, Plot, RecordGraph, Station};
//! use sigplot_invoke::{Synthesizer, ToolConfig};
//!
//! let schema = ParameterSchema::signalserver();
//! let mut config = ToolConfig::new("signalserver", "antenna_profiles");
//! config.set_option("elevation_data_dir", "/data/sdf");
//!
//! let mut plot = Plot::new("ridge", 446.0);
//! plot.do_p2p_analysis = true;
//! let graph = RecordGraph::new(plot)
//!     .with_antenna(Antenna::new("dipole", "dipole.ant", "omni"))
//!     .with_transmitter(Station::new("Ridge Top", 51.849, -0.944))
//!     .with_receiver(Station::new("Valley Farm", 51.839, -1.424));
//!
//! let vectors = Synthesizer::new(&schema, &config).synthesize(&graph).unwrap();
//! assert_eq!(vectors.primary[..2], ["-sdf", "/data/sdf"]);
//! assert!(vectors.p2p.contains(&"-rla".to_string()));
//! ```
//!
//! [`ParameterSchema`]: sigplot_core::ParameterSchema
//! [`RecordGraph`]: sigplot_core::RecordGraph

mod bbox;
mod config;
mod error;
mod runner;
mod synth;
mod workflow;

pub use bbox::BoundingBox;
pub use config::{HD_RESOLUTION, ToolConfig};
pub use error::{ConfigError, SynthesisError, ToolError, WorkflowError};
pub use runner::{ProcessRunner, ToolRunner};
pub use synth::{ArgumentVectors, EmissionPolicy, Synthesizer};
pub use workflow::{NORMALIZE_FLAG, PlotOutcome, PlotRun, RunState, Stage};

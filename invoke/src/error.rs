//! Error types for synthesis, configuration and tool invocation.

use std::path::PathBuf;
use std::time::Duration;

use sigplot_core::{SchemaError, ValueKind};
use sigplot_report::ReportError;
use thiserror::Error;

use crate::workflow::Stage;

/// Argument synthesis failures. Synthesis never returns partial vectors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthesisError {
    /// The schema reads from a record the graph does not carry.
    #[error("plot references no {0} record")]
    MissingRecord(&'static str),
    /// A value cannot be converted into the parameter's declared kind.
    #[error("parameter '{name}' expects {expected}, found '{found}'")]
    InvalidValue {
        name: String,
        expected: ValueKind,
        found: String,
    },
    /// The schema failed validation.
    #[error("invalid parameter schema: {}", format_schema_errors(.0))]
    Schema(Vec<SchemaError>),
}

fn format_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Tool configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// External tool failures. Nothing here is retried.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error while running tool: {0}")]
    Io(#[from] std::io::Error),
    #[error("tool exited with status {code:?}: {output}")]
    NonZeroExit { code: Option<i32>, output: String },
    #[error("tool did not finish within {0:?}")]
    Timeout(Duration),
    #[error("malformed bounding box in tool output: {0}")]
    BoundingBox(String),
}

/// Two-pass workflow failures.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to write plot output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write report JSON {}: {source}", path.display())]
    ReportJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("point-to-point analysis was not requested for plot '{0}'")]
    P2PNotRequested(String),
    /// A pass was requested from a state that does not allow it.
    #[error("cannot run {stage} pass from state '{state}'")]
    InvalidTransition { stage: Stage, state: &'static str },
}

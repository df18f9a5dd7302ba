//! Report decoding errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::descriptor::DescriptorError;

/// Report section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Transmitter,
    Receiver,
    PropagationModel,
    LinkSummary,
}

impl Section {
    /// All sections in report order.
    pub const ALL: [Section; 4] = [
        Self::Transmitter,
        Self::Receiver,
        Self::PropagationModel,
        Self::LinkSummary,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmitter => write!(f, "transmitter site"),
            Self::Receiver => write!(f, "receiver site"),
            Self::PropagationModel => write!(f, "propagation model"),
            Self::LinkSummary => write!(f, "link summary"),
        }
    }
}

/// Errors produced while decoding an analysis report.
///
/// Decoding is all-or-nothing: any error discards the partially decoded
/// report. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required section never appeared, or appeared without content.
    #[error("report has no {section} section")]
    MissingSection { section: Section },
    /// A field line could not be parsed.
    #[error("line {line} ({section}): {reason}")]
    InvalidField {
        section: Section,
        line: usize,
        reason: String,
    },
    /// An obstruction line does not follow the descriptor grammar.
    #[error("line {line} ({section}): invalid obstruction descriptor: {source}")]
    Descriptor {
        section: Section,
        line: usize,
        #[source]
        source: DescriptorError,
    },
    /// The report file could not be read.
    #[error("failed to read report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

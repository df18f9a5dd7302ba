//! Tool configuration.
//!
//! Locates the `signalserver` binaries and holds the tool-wide options of the
//! global parameter group.
//!
//! # Example YAML
//!
//! ```yaml
//! path: /usr/local/bin/signalserver
//! antenna_profiles_dir: /srv/sigplot/antenna_profiles
//! output_dir: /srv/sigplot/output
//! timeout_secs: 900
//! options:
//!   elevation_data_dir: /srv/sigplot/sdf
//!   halve: 1
//!   terrain_greyscale: true
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sigplot_core::ParamValue;

use crate::error::ConfigError;

/// Resolution (pixels per tile) that needs the HD tool variant.
pub const HD_RESOLUTION: i64 = 3600;

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_timeout_secs() -> u64 {
    600
}

/// Where the tool lives and how it is run.
///
/// # Examples
///
/// ```
/// use sigplot_core::ParamValue;
/// use sigplot_invoke::ToolConfig;
///
/// let config: ToolConfig = serde_yaml::from_str(
///     "path: /opt/ss/signalserver\nantenna_profiles_dir: /opt/ss/ant\noptions: { halve: 1 }\n",
/// )
/// .unwrap();
/// assert_eq!(config.timeout_secs, 600);
/// assert_eq!(config.option("halve"), Some(&ParamValue::Int(1)));
/// assert_eq!(config.program(3600).to_str(), Some("/opt/ss/signalserverHD"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Standard tool binary. The HD variant is the same path suffixed `HD`.
    pub path: PathBuf,
    /// Root of the antenna pattern tree, `<dir>/<antenna type>/<file>`.
    pub antenna_profiles_dir: PathBuf,
    /// Directory the tool writes images and reports into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Per-pass wall clock limit.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Values of the global parameter group, keyed by parameter name.
    #[serde(default)]
    pub options: BTreeMap<String, ParamValue>,
}

impl ToolConfig {
    pub fn new(path: impl Into<PathBuf>, antenna_profiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            antenna_profiles_dir: antenna_profiles_dir.into(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            options: BTreeMap::new(),
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](ConfigError::Io) if the file cannot be read, or
    /// [`Yaml`](ConfigError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn option(&self, name: &str) -> Option<&ParamValue> {
        self.options.get(name)
    }

    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.options.insert(name.into(), value.into());
    }

    /// Binary to run for a plot of the given resolution.
    pub fn program(&self, resolution: i64) -> PathBuf {
        if resolution == HD_RESOLUTION {
            self.hd_path()
        } else {
            self.path.clone()
        }
    }

    pub fn hd_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push("HD");
        PathBuf::from(path)
    }

    /// Location of an antenna pattern file.
    pub fn antenna_pattern(&self, antenna_type: &str, filename: &str) -> PathBuf {
        self.antenna_profiles_dir.join(antenna_type).join(filename)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

//! Argument synthesis.
//!
//! Walks a [`ParameterSchema`] against a [`RecordGraph`] and the tool-wide
//! options of a [`ToolConfig`], producing the primary (area plot) vector and
//! the point-to-point vector appended on the second pass.

use serde::Serialize;
use sigplot_core::{
    Emission, ParamGroup, ParamValue, ParameterSchema, ParameterSpec, Record, RecordGraph,
    ValueKind, validate_schema,
};
use tracing::debug;

use crate::config::ToolConfig;
use crate::error::SynthesisError;

/// When a non-boolean value reaches the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionPolicy {
    /// Emit only truthy values; `0`, `0.0` and `""` are dropped.
    #[default]
    OmitFalsy,
    /// Emit every set value, zero included; only unset values are dropped.
    OmitUnset,
}

/// The two argument vectors of a plot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgumentVectors {
    /// Arguments of the area plot pass.
    pub primary: Vec<String>,
    /// Arguments appended on the point-to-point pass.
    pub p2p: Vec<String>,
}

/// Builds argument vectors from a schema and a configuration.
///
/// # Examples
///
/// ```
/// use sigplot_core::{Antenna, ParameterSchema, Plot, RecordGraph, Station};
/// use sigplot_invoke::{Synthesizer, ToolConfig};
///
/// let schema = ParameterSchema::signalserver();
/// let config = ToolConfig::new("signalserver", "antenna_profiles");
/// let mut plot = Plot::new("ridge", 900.0);
/// plot.use_dbm = true;
/// let graph = RecordGraph::new(plot)
///     .with_antenna(Antenna::new("dipole", "dipole.ant", "omni"))
///     .with_transmitter(Station::new("Ridge Top", 51.849, -0.944));
///
/// let vectors = Synthesizer::new(&schema, &config).synthesize(&graph).unwrap();
/// assert_eq!(vectors.primary[..3], ["-dbm", "-f", "900"]);
/// assert!(vectors.p2p.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    schema: &'a ParameterSchema,
    config: &'a ToolConfig,
    policy: EmissionPolicy,
}

impl<'a> Synthesizer<'a> {
    pub fn new(schema: &'a ParameterSchema, config: &'a ToolConfig) -> Self {
        Self {
            schema,
            config,
            policy: EmissionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Synthesizes both vectors.
    ///
    /// # Errors
    ///
    /// Fails without partial output when the schema does not validate, a
    /// required record is missing, or a value cannot be converted to its
    /// declared kind.
    pub fn synthesize(&self, graph: &RecordGraph) -> Result<ArgumentVectors, SynthesisError> {
        let errors = validate_schema(self.schema);
        if !errors.is_empty() {
            return Err(SynthesisError::Schema(errors));
        }

        let mut vectors = ArgumentVectors::default();
        for (group, spec) in self.schema.iter() {
            let Some(flag) = spec.flag.as_deref().filter(|flag| !flag.is_empty()) else {
                continue;
            };

            let always = spec.emission == Emission::AntennaPattern;
            if !always && !dependencies_met(spec, graph) {
                debug!(group = %group, name = %spec.name, "skipped, dependency not met");
                continue;
            }

            let tokens = self.emit(group, spec, flag, graph)?;
            if tokens.is_empty() {
                debug!(group = %group, name = %spec.name, "skipped, no value");
                continue;
            }

            let target = if spec.requires_p2p() {
                &mut vectors.p2p
            } else {
                &mut vectors.primary
            };
            debug!(
                group = %group,
                name = %spec.name,
                p2p = spec.requires_p2p(),
                tokens = ?tokens,
                "emitted"
            );
            target.extend(tokens);
        }

        Ok(vectors)
    }

    /// Tokens for one spec whose dependencies are met; empty when nothing is
    /// emitted.
    fn emit(
        &self,
        group: ParamGroup,
        spec: &ParameterSpec,
        flag: &str,
        graph: &RecordGraph,
    ) -> Result<Vec<String>, SynthesisError> {
        if spec.emission == Emission::AntennaPattern {
            let antenna = graph
                .antenna
                .as_ref()
                .ok_or(SynthesisError::MissingRecord("antenna"))?;
            let filename = self
                .lookup(group, spec, graph)?
                .ok_or_else(|| unset_value(spec))?;
            let path = self
                .config
                .antenna_pattern(&antenna.antenna_type, &filename.to_string());
            return Ok(vec![flag.to_string(), path.display().to_string()]);
        }

        let Some(value) = self.lookup(group, spec, graph)? else {
            return Ok(Vec::new());
        };

        let tokens = match &spec.emission {
            Emission::WhenEquals(literal) => {
                if value.as_str() == Some(literal.as_str()) {
                    vec![flag.to_string()]
                } else {
                    Vec::new()
                }
            }
            _ if spec.value_kind.is_switch() => {
                if value.is_truthy() {
                    vec![flag.to_string()]
                } else {
                    Vec::new()
                }
            }
            _ => {
                let emit = match self.policy {
                    EmissionPolicy::OmitFalsy => value.is_truthy(),
                    EmissionPolicy::OmitUnset => true,
                };
                if emit {
                    vec![flag.to_string(), value.to_string()]
                } else {
                    Vec::new()
                }
            }
        };
        Ok(tokens)
    }

    /// Reads and converts the value of a spec from its source.
    fn lookup(
        &self,
        group: ParamGroup,
        spec: &ParameterSpec,
        graph: &RecordGraph,
    ) -> Result<Option<ParamValue>, SynthesisError> {
        let raw = match group {
            ParamGroup::Global => self.config.option(&spec.name).cloned(),
            ParamGroup::Plot => graph.plot.value(&spec.name),
            ParamGroup::Antenna => graph
                .antenna
                .as_ref()
                .ok_or(SynthesisError::MissingRecord("antenna"))?
                .value(&spec.name),
            ParamGroup::Station => match spec.receiver_field() {
                Some(field) => graph
                    .station2
                    .as_ref()
                    .ok_or(SynthesisError::MissingRecord("station2"))?
                    .value(field),
                None => graph
                    .station1
                    .as_ref()
                    .ok_or(SynthesisError::MissingRecord("station1"))?
                    .value(&spec.name),
            },
        };

        raw.map(|value| convert(spec, value)).transpose()
    }
}

/// Any truthy boolean plot attribute among the dependencies suffices.
fn dependencies_met(spec: &ParameterSpec, graph: &RecordGraph) -> bool {
    spec.depends_on.is_empty()
        || spec.depends_on.iter().any(|name| {
            graph
                .plot
                .value(name)
                .is_some_and(|value| value.is_truthy())
        })
}

fn convert(spec: &ParameterSpec, value: ParamValue) -> Result<ParamValue, SynthesisError> {
    value
        .coerce(spec.value_kind)
        .ok_or_else(|| SynthesisError::InvalidValue {
            name: spec.name.clone(),
            expected: spec.value_kind,
            found: value.to_string(),
        })
}

fn unset_value(spec: &ParameterSpec) -> SynthesisError {
    SynthesisError::InvalidValue {
        name: spec.name.clone(),
        expected: ValueKind::Str,
        found: "<unset>".to_string(),
    }
}

//! Two-pass plot workflow.
//!
//! Pass 1 renders the area plot and reports its bounding box. Pass 2 runs
//! only when point-to-point analysis was requested; it reruns the standard
//! tool with the receiver arguments, decodes the text report written
//! beside the output image and stores it again as `<base>.json`.
//!
//! ```text
//! AreaPending ──run_area──▶ AreaDone ──run_p2p──▶ P2PPending ──▶ P2PDone
//!      │                                              │
//!      └──────────────────────▶ Failed ◀──────────────┘
//! ```

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sigplot_core::{AnalysisReport, ParameterSchema, RecordGraph, UnitSystem};
use tracing::{debug, info, warn};

use crate::bbox::BoundingBox;
use crate::config::ToolConfig;
use crate::error::WorkflowError;
use crate::runner::ToolRunner;
use crate::synth::{ArgumentVectors, EmissionPolicy, Synthesizer};

/// Normalizes the path profile graph; always set on the second pass.
pub const NORMALIZE_FLAG: &str = "-ng";

/// A tool pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Area,
    PointToPoint,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Area => write!(f, "area"),
            Self::PointToPoint => write!(f, "point-to-point"),
        }
    }
}

/// Where a [`PlotRun`] stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    AreaPending,
    AreaDone {
        bbox: BoundingBox,
    },
    P2PPending {
        bbox: BoundingBox,
    },
    P2PDone {
        bbox: BoundingBox,
        report: AnalysisReport,
    },
    Failed {
        stage: Stage,
        error: String,
        last_bbox: Option<BoundingBox>,
    },
}

impl RunState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AreaPending => "area_pending",
            Self::AreaDone { .. } => "area_done",
            Self::P2PPending { .. } => "p2p_pending",
            Self::P2PDone { .. } => "p2p_done",
            Self::Failed { .. } => "failed",
        }
    }

    /// Last bounding box produced, if any.
    pub fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Self::AreaPending => None,
            Self::AreaDone { bbox } | Self::P2PPending { bbox } | Self::P2PDone { bbox, .. } => {
                Some(*bbox)
            }
            Self::Failed { last_bbox, .. } => *last_bbox,
        }
    }
}

/// Result of a completed workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotOutcome {
    pub plot: String,
    /// Output base path; the tool appends its own extensions.
    pub output: PathBuf,
    pub bbox: BoundingBox,
    /// Units the tool was asked for; the legend of the output image.
    pub units: UnitSystem,
    pub rf_units: &'static str,
    pub height_units: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_json: Option<PathBuf>,
    pub arguments: ArgumentVectors,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// One plot moving through the two tool passes.
///
/// Arguments are synthesized when the run is created, so a bad schema or
/// record graph fails before the tool is ever started.
pub struct PlotRun<'a, R: ToolRunner> {
    graph: &'a RecordGraph,
    config: &'a ToolConfig,
    runner: R,
    vectors: ArgumentVectors,
    state: RunState,
    started_at: DateTime<Utc>,
}

impl<'a, R: ToolRunner> PlotRun<'a, R> {
    pub fn new(
        schema: &ParameterSchema,
        config: &'a ToolConfig,
        graph: &'a RecordGraph,
        runner: R,
    ) -> Result<Self, WorkflowError> {
        Self::with_policy(schema, config, graph, runner, EmissionPolicy::default())
    }

    pub fn with_policy(
        schema: &ParameterSchema,
        config: &'a ToolConfig,
        graph: &'a RecordGraph,
        runner: R,
        policy: EmissionPolicy,
    ) -> Result<Self, WorkflowError> {
        let vectors = Synthesizer::new(schema, config)
            .with_policy(policy)
            .synthesize(graph)?;
        Ok(Self {
            graph,
            config,
            runner,
            vectors,
            state: RunState::AreaPending,
            started_at: Utc::now(),
        })
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn vectors(&self) -> &ArgumentVectors {
        &self.vectors
    }

    /// Directory holding this plot's files: `<output_dir>/<plot id>`, or
    /// `<output_dir>` for plots without an id.
    pub fn output_dir(&self) -> PathBuf {
        match self.graph.plot.id {
            Some(id) => self.config.output_dir.join(id.to_string()),
            None => self.config.output_dir.clone(),
        }
    }

    /// `<output dir>/<plot name>`, passed to the tool with `-o`.
    pub fn output_base(&self) -> PathBuf {
        self.output_dir().join(&self.graph.plot.name)
    }

    /// Path of the point-to-point text report.
    pub fn report_path(&self) -> PathBuf {
        self.output_file("txt")
    }

    /// Path the decoded report is written to.
    pub fn report_json_path(&self) -> PathBuf {
        self.output_file("json")
    }

    fn output_file(&self, extension: &str) -> PathBuf {
        let mut path = OsString::from(self.output_base());
        path.push(".");
        path.push(extension);
        PathBuf::from(path)
    }

    /// Arguments of the area pass.
    pub fn area_args(&self) -> Vec<String> {
        let mut args = self.vectors.primary.clone();
        args.push("-o".to_string());
        args.push(self.output_base().display().to_string());
        args
    }

    /// Arguments of the point-to-point pass.
    pub fn p2p_args(&self) -> Vec<String> {
        let mut args = self.area_args();
        args.extend(self.vectors.p2p.iter().cloned());
        args.push(NORMALIZE_FLAG.to_string());
        args
    }

    /// Runs the area pass.
    ///
    /// Uses the HD binary when the plot resolution is 3600.
    pub fn run_area(&mut self) -> Result<BoundingBox, WorkflowError> {
        if self.state != RunState::AreaPending {
            return Err(self.invalid(Stage::Area));
        }

        if let Err(e) = fs::create_dir_all(self.output_dir()) {
            return Err(self.fail(Stage::Area, e.into()));
        }

        let program = self.config.program(self.graph.plot.resolution);
        info!(plot = %self.graph.plot.name, program = %program.display(), "Running area pass");
        let bbox = match self
            .runner
            .run(&program, &self.area_args())
            .and_then(|stdout| BoundingBox::parse(&stdout))
        {
            Ok(bbox) => bbox,
            Err(e) => return Err(self.fail(Stage::Area, e.into())),
        };

        debug!(plot = %self.graph.plot.name, bbox = ?bbox, "Area pass finished");
        self.state = RunState::AreaDone { bbox };
        Ok(bbox)
    }

    /// Runs the point-to-point pass, decodes its report and writes the
    /// decoded report as JSON.
    pub fn run_p2p(&mut self) -> Result<AnalysisReport, WorkflowError> {
        let RunState::AreaDone { bbox } = self.state else {
            return Err(self.invalid(Stage::PointToPoint));
        };
        if !self.graph.plot.do_p2p_analysis {
            return Err(WorkflowError::P2PNotRequested(self.graph.plot.name.clone()));
        }

        self.state = RunState::P2PPending { bbox };
        info!(plot = %self.graph.plot.name, "Running point-to-point pass");
        if let Err(e) = self.runner.run(&self.config.path, &self.p2p_args()) {
            return Err(self.fail(Stage::PointToPoint, e.into()));
        }

        let report_path = self.report_path();
        let report = match sigplot_report::decode_file(&report_path) {
            Ok(report) => report,
            Err(e) => return Err(self.fail(Stage::PointToPoint, e.into())),
        };
        if report.units() != self.graph.plot.units() {
            warn!(
                plot = %self.graph.plot.name,
                requested = ?self.graph.plot.units(),
                reported = ?report.units(),
                "Report units differ from the plot settings"
            );
        }
        if let Err(e) = self.write_report_json(&report) {
            return Err(self.fail(Stage::PointToPoint, e));
        }

        debug!(
            plot = %self.graph.plot.name,
            report = %report_path.display(),
            obstructions = report.obstructions().len(),
            "Point-to-point pass finished"
        );
        self.state = RunState::P2PDone {
            bbox,
            report: report.clone(),
        };
        Ok(report)
    }

    /// Drives both passes to completion.
    ///
    /// On failure the run stays in [`RunState::Failed`], so the caller can
    /// still read the bounding box of a finished area pass from
    /// [`state`](Self::state).
    pub fn execute(&mut self) -> Result<PlotOutcome, WorkflowError> {
        let bbox = self.run_area()?;
        let report = if self.graph.plot.do_p2p_analysis {
            Some(self.run_p2p()?)
        } else {
            None
        };

        let plot = &self.graph.plot;
        let outcome = PlotOutcome {
            plot: plot.name.clone(),
            output: self.output_base(),
            bbox,
            units: plot.units(),
            rf_units: plot.rf_units(),
            height_units: plot.distance_units(),
            report_json: report.as_ref().map(|_| self.report_json_path()),
            report,
            arguments: self.vectors.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        };
        info!(
            plot = %outcome.plot,
            p2p = outcome.report.is_some(),
            elapsed_ms = (outcome.finished_at - outcome.started_at).num_milliseconds(),
            "Plot finished"
        );
        Ok(outcome)
    }

    fn write_report_json(&self, report: &AnalysisReport) -> Result<(), WorkflowError> {
        let path = self.report_json_path();
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)
            .map_err(|source| WorkflowError::ReportJson { path, source })
    }

    fn invalid(&self, stage: Stage) -> WorkflowError {
        WorkflowError::InvalidTransition {
            stage,
            state: self.state.name(),
        }
    }

    fn fail(&mut self, stage: Stage, error: WorkflowError) -> WorkflowError {
        warn!(plot = %self.graph.plot.name, stage = %stage, error = %error, "Pass failed");
        self.state = RunState::Failed {
            stage,
            error: error.to_string(),
            last_bbox: self.state.bbox(),
        };
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    use sigplot_core::{Antenna, Plot, Station};

    use crate::error::ToolError;

    const BBOX: &str = "|52.2|-0.54|51.49|-1.82|\n";

    /// Replays canned results and records every call.
    struct ScriptedRunner {
        replies: RefCell<Vec<Result<String, ToolError>>>,
        calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
    }

    impl ScriptedRunner {
        fn new(replies: Vec<Result<String, ToolError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().rev().collect()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ToolRunner for &ScriptedRunner {
        fn run(&self, program: &Path, args: &[String]) -> Result<String, ToolError> {
            self.calls
                .borrow_mut()
                .push((program.to_path_buf(), args.to_vec()));
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn graph(p2p: bool, resolution: i64) -> RecordGraph {
        let mut plot = Plot::new("ridge", 446.0);
        plot.do_p2p_analysis = p2p;
        plot.resolution = resolution;
        RecordGraph::new(plot)
            .with_antenna(Antenna::new("dipole", "dipole.ant", "omni"))
            .with_transmitter(Station::new("Ridge Top", 51.849, -0.944))
            .with_receiver(Station::new("Valley Farm", 51.839, -1.424))
    }

    fn config(dir: &Path) -> ToolConfig {
        let mut config = ToolConfig::new("/opt/ss/signalserver", "/opt/ss/ant");
        config.output_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_area_only_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(false, 600);
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into())]);
        let schema = ParameterSchema::signalserver();

        let outcome = PlotRun::new(&schema, &config, &graph, &runner)
            .unwrap()
            .execute()
            .unwrap();

        assert_eq!(outcome.bbox.north, 52.2);
        assert!(outcome.report.is_none());
        assert!(outcome.finished_at >= outcome.started_at);

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (program, args) = &calls[0];
        assert_eq!(program, Path::new("/opt/ss/signalserver"));
        let base = dir.path().join("ridge").display().to_string();
        assert_eq!(args[args.len() - 2..], ["-o".to_string(), base]);
    }

    #[test]
    fn test_hd_binary_for_3600_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(false, 3600);
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into())]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        run.run_area().unwrap();
        assert_eq!(runner.calls.borrow()[0].0, Path::new("/opt/ss/signalserverHD"));
    }

    #[test]
    fn test_p2p_pass_uses_standard_binary_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(true, 3600);
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into()), Ok(String::new())]);
        let schema = ParameterSchema::signalserver();
        let report = include_str!("../tests/fixtures/ridge-p2p.txt");

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        std::fs::write(run.report_path(), report).unwrap();
        run.run_area().unwrap();
        let decoded = run.run_p2p().unwrap();
        assert_eq!(decoded.obstructions().len(), 3);
        assert!(matches!(run.state(), RunState::P2PDone { .. }));

        let calls = runner.calls.borrow();
        let (program, args) = &calls[1];
        assert_eq!(program, Path::new("/opt/ss/signalserver"));
        assert_eq!(args.last().map(String::as_str), Some(NORMALIZE_FLAG));
        let o = args.iter().position(|a| a == "-o").unwrap();
        let rla = args.iter().position(|a| a == "-rla").unwrap();
        assert!(o < rla);
        assert_eq!(args[..calls[0].1.len()], calls[0].1[..]);

        let json = std::fs::read_to_string(dir.path().join("ridge.json")).unwrap();
        let stored: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(stored["link"]["obstructions"].as_array().map(Vec::len), Some(3));
        assert_eq!(stored["transmitter"]["metric"], decoded.transmitter().metric);
    }

    #[test]
    fn test_plot_id_selects_output_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut graph = graph(false, 600);
        graph.plot.id = Some(42);
        graph.plot.use_metric_units = true;
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into())]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        assert_eq!(run.report_json_path(), dir.path().join("42").join("ridge.json"));
        let outcome = run.execute().unwrap();

        assert!(dir.path().join("42").is_dir());
        assert_eq!(outcome.output, dir.path().join("42").join("ridge"));
        assert_eq!(outcome.units, UnitSystem::Metric);
        assert_eq!(outcome.rf_units, "dBuV/m");
        assert_eq!(outcome.height_units, "m");
        assert_eq!(outcome.report_json, None);
    }

    #[test]
    fn test_execute_keeps_area_bbox_when_p2p_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(true, 600);
        let runner = ScriptedRunner::new(vec![
            Ok(BBOX.into()),
            Err(ToolError::NonZeroExit {
                code: Some(2),
                output: "receiver out of range".into(),
            }),
        ]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        let err = run.execute().unwrap_err();
        assert!(matches!(err, WorkflowError::Tool(ToolError::NonZeroExit { .. })));
        match run.state() {
            RunState::Failed { stage, error, last_bbox } => {
                assert_eq!(*stage, Stage::PointToPoint);
                assert!(error.contains("receiver out of range"));
                assert_eq!(last_bbox.map(|b| b.north), Some(52.2));
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(runner.calls.borrow().len(), 2);
        assert!(!dir.path().join("ridge.json").exists());
    }

    #[test]
    fn test_p2p_before_area_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(true, 600);
        let runner = ScriptedRunner::new(Vec::new());
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        let err = run.run_p2p().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                stage: Stage::PointToPoint,
                state: "area_pending"
            }
        ));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_p2p_not_requested() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(false, 600);
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into())]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        run.run_area().unwrap();
        assert!(matches!(
            run.run_p2p().unwrap_err(),
            WorkflowError::P2PNotRequested(name) if name == "ridge"
        ));
    }

    #[test]
    fn test_area_cannot_run_twice() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(false, 600);
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into())]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        run.run_area().unwrap();
        assert!(matches!(
            run.run_area().unwrap_err(),
            WorkflowError::InvalidTransition { stage: Stage::Area, .. }
        ));
    }

    #[test]
    fn test_tool_failure_moves_to_failed() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(false, 600);
        let runner = ScriptedRunner::new(vec![Err(ToolError::NonZeroExit {
            code: Some(1),
            output: "no sdf tiles".into(),
        })]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        assert!(run.run_area().is_err());
        match run.state() {
            RunState::Failed { stage, error, last_bbox } => {
                assert_eq!(*stage, Stage::Area);
                assert!(error.contains("no sdf tiles"));
                assert_eq!(*last_bbox, None);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_missing_report_keeps_area_bbox() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(true, 600);
        let runner = ScriptedRunner::new(vec![Ok(BBOX.into()), Ok(String::new())]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        run.run_area().unwrap();
        let err = run.run_p2p().unwrap_err();
        assert!(matches!(err, WorkflowError::Report(_)));
        match run.state() {
            RunState::Failed { stage, last_bbox, .. } => {
                assert_eq!(*stage, Stage::PointToPoint);
                assert_eq!(last_bbox.map(|b| b.south), Some(51.49));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_bad_bbox_fails_area_pass() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let graph = graph(false, 600);
        let runner = ScriptedRunner::new(vec![Ok("done\n".into())]);
        let schema = ParameterSchema::signalserver();

        let mut run = PlotRun::new(&schema, &config, &graph, &runner).unwrap();
        assert!(matches!(
            run.run_area().unwrap_err(),
            WorkflowError::Tool(ToolError::BoundingBox(_))
        ));
        assert_eq!(run.state().name(), "failed");
    }
}

//! CCA report gate
//!
//! Runs a module's test suite under coverage, turns the tool output into a
//! structured report, decides pass/fail against a caller-supplied policy and
//! persists the report as JSON (and optionally Markdown).

pub mod config;
pub mod exit_code;
pub mod gate;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod writer;

pub use cca_target::{parse_coverage_target, CoverageTarget, ValidationError};
pub use config::{ConfigError, EffectiveConfig, Settings, REPO_CONFIG_PATH};
pub use exit_code::ExitCode;
pub use gate::{evaluate, GatePolicy, Outcome};
pub use pipeline::{generate_report, Pipeline, PipelineError, PipelineOutput, PipelineResult, ReportRequest};
pub use report::{Report, ReportArtifact, ReportBuilder};
pub use runner::{CannedRunner, ExecutionError, Runner, RunnerConfig, TestRunResult, TestRunner};
pub use writer::{render_markdown, ReportWriter, WriteError, WrittenReport};

//! Report pipeline
//!
//! Strictly sequential, one tool invocation per call:
//! - Parse the coverage target (fail fast, nothing is run)
//! - Run the tests
//! - Build the report
//! - Evaluate the gate
//! - Write the artifacts atomically
//!
//! The gate is pure, so it is evaluated before writing and its outcome is
//! persisted alongside the counts. Validation and execution errors abort
//! before anything is written.

use std::path::{Path, PathBuf};

use cca_target::{parse_coverage_target, ValidationError};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::exit_code::ExitCode;
use crate::gate::{self, GatePolicy, Outcome};
use crate::report::{ReportArtifact, ReportBuilder};
use crate::runner::{ExecutionError, Runner};
use crate::writer::{ReportWriter, WriteError, WrittenReport};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid coverage target: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("test execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("report not written: {0}")]
    Write(#[from] WriteError),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PipelineError::Validation(_) => ExitCode::Validation,
            PipelineError::Config(_) => ExitCode::Validation,
            PipelineError::Execution(_) => ExitCode::Execution,
            PipelineError::Write(_) => ExitCode::ReportWrite,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Inputs of one report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Working directory of the test tool
    pub repo: PathBuf,

    /// Module to report per-file coverage for
    pub module_path: Option<String>,

    /// JSON report path; relative paths resolve against `repo`
    pub report_out_path: PathBuf,

    /// Markdown report path; relative paths resolve against `repo`
    pub report_md_path: Option<PathBuf>,

    pub fail_on_tests: bool,

    /// Coverage target expression, e.g. `"80%"`
    pub fail_on_coverage: Option<String>,
}

impl ReportRequest {
    /// Build a request from merged settings
    pub fn from_settings(repo: impl Into<PathBuf>, module_path: Option<String>, settings: &Settings) -> Self {
        Self {
            repo: repo.into(),
            module_path,
            report_out_path: PathBuf::from(&settings.report.out),
            report_md_path: settings.report.md.as_ref().map(PathBuf::from),
            fail_on_tests: settings.gate.fail_on_tests,
            fail_on_coverage: settings.gate.fail_on_coverage.as_ref().map(|t| t.as_expression()),
        }
    }

    /// Absolute-or-repo-relative JSON path
    pub fn json_path(&self) -> PathBuf {
        resolve(&self.repo, &self.report_out_path)
    }

    /// Absolute-or-repo-relative Markdown path
    pub fn md_path(&self) -> Option<PathBuf> {
        self.report_md_path.as_ref().map(|p| resolve(&self.repo, p))
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub outcome: Outcome,
    pub artifact: ReportArtifact,
    pub written: WrittenReport,
    /// Exit status of the test tool
    pub tool_exit_code: i32,
}

impl PipelineOutput {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_outcome(&self.outcome)
    }
}

/// Drives one report run against a [`Runner`]
pub struct Pipeline<'a, R: Runner> {
    runner: &'a R,
    writer: ReportWriter,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a, R: Runner> Pipeline<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self {
            runner,
            writer: ReportWriter::new(),
            timestamp: None,
        }
    }

    /// Pin the report timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn run(&self, request: &ReportRequest) -> PipelineResult<PipelineOutput> {
        let policy = GatePolicy {
            fail_on_tests: request.fail_on_tests,
            coverage_target: request
                .fail_on_coverage
                .as_deref()
                .map(parse_coverage_target)
                .transpose()?,
        };

        let run = self.runner.run(&request.repo, request.module_path.as_deref())?;

        let mut builder = ReportBuilder::new();
        if let Some(ts) = self.timestamp {
            builder = builder.with_timestamp(ts);
        }
        let report = builder.build(&run);

        let outcome = gate::evaluate(&report, &policy);
        tracing::info!(ok = outcome.ok, details = %outcome.details, "gate evaluated");

        let artifact = ReportArtifact::new(report, outcome.clone());
        let md_path = request.md_path();
        let written = self
            .writer
            .write(&artifact, &request.json_path(), md_path.as_deref())?;

        Ok(PipelineOutput {
            outcome,
            artifact,
            written,
            tool_exit_code: run.exit_code,
        })
    }
}

/// Run the tests, write the report and return the gate outcome.
pub fn generate_report<R: Runner>(runner: &R, request: &ReportRequest) -> PipelineResult<Outcome> {
    Ok(Pipeline::new(runner).run(request)?.outcome)
}

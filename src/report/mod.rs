//! Structured test report
//!
//! [`ReportBuilder`] turns captured tool output into a [`Report`]; the
//! persisted form is a [`ReportArtifact`], which adds the gate outcome.

mod artifact;
mod builder;
mod model;

pub use artifact::ReportArtifact;
pub use builder::ReportBuilder;
pub use model::{
    round_percent, CoverageSummary, FileCoverage, Report, TestCounts, REPORT_SCHEMA_ID,
    REPORT_SCHEMA_VERSION,
};

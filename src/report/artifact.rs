//! Persisted report (test_report.json)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::model::{CoverageSummary, Report, TestCounts};
use crate::gate::Outcome;

/// A report together with the gate outcome it produced.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub schema_version: u32,
    pub schema_id: String,
    pub timestamp: DateTime<Utc>,
    pub counts: TestCounts,
    pub coverage: CoverageSummary,
    pub gate: Outcome,
}

impl ReportArtifact {
    pub fn new(report: Report, gate: Outcome) -> Self {
        Self {
            schema_version: report.schema_version,
            schema_id: report.schema_id,
            timestamp: report.timestamp,
            counts: report.counts,
            coverage: report.coverage,
            gate,
        }
    }

    /// The report without its gate outcome
    pub fn report(&self) -> Report {
        Report {
            schema_version: self.schema_version,
            schema_id: self.schema_id.clone(),
            timestamp: self.timestamp,
            counts: self.counts,
            coverage: self.coverage.clone(),
        }
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// SHA-256 over the canonical (RFC 8785) JSON of everything except the
    /// timestamp. Two runs over identical inputs share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.remove("timestamp");
        }
        let jcs_bytes = serde_json_canonicalizer::to_vec(&value)?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

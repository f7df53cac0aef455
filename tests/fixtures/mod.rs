//! Captured pytest-cov outputs and their expected parse results
//!
//! Each `.txt` under `pytest_output/` is the verbatim terminal output of one
//! run; `expected.json` lists what must be recovered from it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Directory holding the captured outputs
pub fn pytest_output_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pytest_output")
}

/// Path to one captured output
pub fn output_path(name: &str) -> PathBuf {
    pytest_output_dir().join(name)
}

/// Contents of one captured output
pub fn load_output(name: &str) -> String {
    std::fs::read_to_string(output_path(name)).unwrap_or_else(|e| panic!("fixture {}: {}", name, e))
}

/// Expected counts for one fixture
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct ExpectedCounts {
    pub passed: u32,
    pub failed: u32,
    pub errored: u32,
    pub skipped: u32,
}

/// One entry of expected.json
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OutputCase {
    pub file: String,
    pub description: String,
    pub counts: Option<ExpectedCounts>,
    pub collected: Option<u32>,
    pub overall: Option<f64>,
    pub module: Option<String>,
    pub module_percent: Option<f64>,
    #[serde(default)]
    pub module_missing: Vec<String>,
}

impl OutputCase {
    pub fn output(&self) -> String {
        load_output(&self.file)
    }
}

/// The whole expectations file
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OutputCorpus {
    pub contract: String,
    pub cases: Vec<OutputCase>,
}

impl OutputCorpus {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(pytest_output_dir().join("expected.json"))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn case(&self, file: &str) -> &OutputCase {
        self.cases
            .iter()
            .find(|c| c.file == file)
            .unwrap_or_else(|| panic!("no expectation for {}", file))
    }
}

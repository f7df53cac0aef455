//! Parser for pytest / pytest-cov terminal output.
//!
//! The layout of the tool's output is an external contract. This crate pins
//! the version it understands in [`OUTPUT_CONTRACT`] and parses defensively:
//! anything it cannot read is reported as absent, never as an error.

mod coverage;
mod summary;

pub use coverage::{normalize_path, parse_coverage_table, CoverageRow, CoverageTable};
pub use summary::{parse_collected, parse_result_counts, ResultCounts};

use serde::{Deserialize, Serialize};

/// Identifier of the output layout this parser was written against
pub const OUTPUT_CONTRACT: &str = "pytest-cov/term-missing@1";

/// Everything recoverable from one captured run of the tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedOutput {
    /// Counts from the final result line, if one was found
    pub counts: Option<ResultCounts>,

    /// Value of the `collected N items` line, if present
    pub collected: Option<u32>,

    /// The last coverage table in the output, if any
    pub coverage: Option<CoverageTable>,
}

impl ParsedOutput {
    /// True when the summed counts disagree with the collected line.
    ///
    /// Collection errors are reported as errors without being collected, so
    /// a mismatch is a diagnostic, not a parse failure.
    pub fn collected_mismatch(&self) -> bool {
        match (&self.counts, self.collected) {
            (Some(counts), Some(collected)) => counts.total() != collected,
            _ => false,
        }
    }
}

/// Parse captured stdout (and optionally stderr appended) of a test run.
pub fn parse_output(output: &str) -> ParsedOutput {
    if output.trim().is_empty() {
        return ParsedOutput::default();
    }

    let cleaned = strip_ansi(output);
    ParsedOutput {
        counts: parse_result_counts(&cleaned),
        collected: parse_collected(&cleaned),
        coverage: parse_coverage_table(&cleaned),
    }
}

/// Remove ANSI color sequences (`ESC [ ... m`) that a forced-color
/// terminal would leave in captured output.
fn strip_ansi(s: &str) -> String {
    if !s.contains('\u{1b}') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

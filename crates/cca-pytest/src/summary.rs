//! Result-count and collection lines

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Test outcome counts from the final result line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    pub passed: u32,
    pub failed: u32,
    pub errored: u32,
    pub skipped: u32,
}

impl ResultCounts {
    /// Sum of all outcomes
    pub fn total(&self) -> u32 {
        self.passed
            .saturating_add(self.failed)
            .saturating_add(self.errored)
            .saturating_add(self.skipped)
    }

    fn add(&mut self, key: &str, n: u32) -> bool {
        let slot = match key {
            "passed" | "xpassed" => &mut self.passed,
            "failed" => &mut self.failed,
            "error" | "errors" => &mut self.errored,
            "skipped" | "xfailed" => &mut self.skipped,
            "deselected" | "warning" | "warnings" | "rerun" | "reruns" => return true,
            _ => return false,
        };
        *slot = slot.saturating_add(n);
        true
    }
}

// "===== 1 failed, 4 passed, 2 warnings in 0.21s (0:00:00) ====="
fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^=*\s*(.+?)\s+in\s+[0-9.]+s(?:\s+\([0-9:.]+\))?\s*=*$")
            .expect("summary pattern is valid")
    })
}

fn count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+)\s+([a-z]+)$").expect("count pattern is valid"))
}

fn collected_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^collected\s+([0-9]+)\s+items?(?:.*/\s*([0-9]+)\s+selected)?")
            .expect("collected pattern is valid")
    })
}

/// Parse the final result line. The last matching line wins.
///
/// `no tests ran` yields zero counts. Returns `None` when no line matches.
pub fn parse_result_counts(output: &str) -> Option<ResultCounts> {
    output.lines().rev().find_map(|line| parse_summary_line(line.trim()))
}

fn parse_summary_line(line: &str) -> Option<ResultCounts> {
    let caps = summary_re().captures(line)?;
    let body = caps.get(1)?.as_str().trim();

    if body == "no tests ran" {
        return Some(ResultCounts::default());
    }

    let mut counts = ResultCounts::default();
    let mut recognized = false;
    for part in body.split(',') {
        let part = part.trim();
        let caps = count_re().captures(part)?;
        let n: u32 = caps.get(1)?.as_str().parse().ok()?;
        let key = caps.get(2)?.as_str();
        if !counts.add(key, n) {
            return None;
        }
        recognized = true;
    }

    recognized.then_some(counts)
}

/// Parse `collected N items`; the last occurrence wins.
///
/// With `-k`/`-m` the line reads `collected 10 items / 2 deselected / 8
/// selected` and only the selected tests are reported, so that figure is used.
pub fn parse_collected(output: &str) -> Option<u32> {
    output.lines().rev().find_map(|line| {
        let caps = collected_re().captures(line.trim())?;
        caps.get(2).or_else(|| caps.get(1))?.as_str().parse().ok()
    })
}

//! Coverage table (`--cov-report=term-missing`)
//!
//! ```text
//! Name                Stmts   Miss  Cover   Missing
//! -------------------------------------------------
//! src/calculator.py      20      2    90%   14, 22-25
//! -------------------------------------------------
//! TOTAL                  50      2    96%
//! ```
//!
//! Branch coverage adds `Branch BrPart` columns before `Cover`; the parser
//! keys on the first `%` column so both layouts read the same.

use serde::{Deserialize, Serialize};

/// Label of the summary row
const TOTAL_LABEL: &str = "TOTAL";

/// One file row of the coverage table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRow {
    /// Path as printed by the tool
    pub path: String,

    /// Percentage covered; `None` when the cell could not be read
    pub percent: Option<f64>,

    /// Missing line ranges, verbatim (`"14"`, `"22-25"`, `"30->32"`)
    pub missing: Vec<String>,
}

/// A parsed coverage table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageTable {
    /// File rows in printed order
    pub rows: Vec<CoverageRow>,

    /// Percentage from the `TOTAL` row, if present and readable
    pub total: Option<f64>,
}

impl CoverageTable {
    /// Overall coverage.
    ///
    /// Uses the `TOTAL` row; single-file reports omit it, in which case
    /// the lone file row stands in.
    pub fn overall(&self) -> Option<f64> {
        if self.total.is_some() {
            return self.total;
        }
        match self.rows.as_slice() {
            [only] => only.percent,
            _ => None,
        }
    }

    /// Find the row for `module`, matching on normalized paths.
    ///
    /// A row matches when the paths are equal or one is a whole-component
    /// suffix of the other (the tool may print paths relative to a
    /// different root than the caller used). A suffix shared by several
    /// rows is ambiguous and matches nothing.
    pub fn find(&self, module: &str) -> Option<&CoverageRow> {
        let wanted = normalize_path(module);
        if wanted.is_empty() {
            return None;
        }

        if let Some(row) = self.rows.iter().find(|row| normalize_path(&row.path) == wanted) {
            return Some(row);
        }

        let mut suffix_matches = self.rows.iter().filter(|row| {
            let have = normalize_path(&row.path);
            is_path_suffix(&have, &wanted) || is_path_suffix(&wanted, &have)
        });
        match (suffix_matches.next(), suffix_matches.next()) {
            (Some(row), None) => Some(row),
            _ => None,
        }
    }
}

/// Normalize a path for comparison: forward slashes, no leading `./`.
pub fn normalize_path(path: &str) -> String {
    let mut p = path.trim().replace('\\', "/");
    while let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    p
}

fn is_path_suffix(full: &str, suffix: &str) -> bool {
    full.len() > suffix.len()
        && full.ends_with(suffix)
        && full.as_bytes()[full.len() - suffix.len() - 1] == b'/'
}

/// Parse the last coverage table in `output`.
///
/// Returns `None` when no table header is present (for example when the
/// tool printed `No data to report.`).
pub fn parse_coverage_table(output: &str) -> Option<CoverageTable> {
    let mut current: Option<CoverageTable> = None;
    let mut last: Option<CoverageTable> = None;

    for line in output.lines() {
        let trimmed = line.trim();

        if is_header(trimmed) {
            if let Some(table) = current.take() {
                last = Some(table);
            }
            current = Some(CoverageTable::default());
            continue;
        }

        let Some(table) = current.as_mut() else {
            continue;
        };

        if trimmed.chars().all(|c| c == '-') && !trimmed.is_empty() {
            continue;
        }

        match parse_row(trimmed) {
            Some(row) if row.path == TOTAL_LABEL => {
                table.total = row.percent;
            }
            Some(row) => table.rows.push(row),
            None => {
                if let Some(done) = current.take() {
                    last = Some(done);
                }
            }
        }
    }

    current.or(last)
}

fn is_header(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    tokens.next() == Some("Name") && tokens.any(|t| t == "Cover")
}

/// Parse one table row. `None` means the line is not a row (end of table).
fn parse_row(line: &str) -> Option<CoverageRow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    // Path runs up to the first integer column (Stmts).
    let first_numeric = tokens.iter().position(|t| t.parse::<u64>().is_ok())?;
    if first_numeric == 0 {
        return None;
    }
    let path = tokens[..first_numeric].join(" ");

    let percent_idx = tokens[first_numeric..]
        .iter()
        .position(|t| t.ends_with('%'))
        .map(|i| i + first_numeric);

    let (percent, missing) = match percent_idx {
        Some(idx) => {
            let percent = parse_percent(tokens[idx]);
            let missing = tokens[idx + 1..]
                .join(" ")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (percent, missing)
        }
        None => (None, Vec::new()),
    };

    Some(CoverageRow { path, percent, missing })
}

fn parse_percent(cell: &str) -> Option<f64> {
    let value: f64 = cell.strip_suffix('%')?.parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(value)
}

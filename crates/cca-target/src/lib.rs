//! Coverage target parsing.
//!
//! A coverage target is the minimum acceptable percentage of code exercised
//! by tests. The boundary is inclusive: a measured value equal to the target
//! passes. Targets are written as `"95%"`, `"95"` or `"95.5"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lowest accepted target
pub const MIN_PERCENT: f64 = 0.0;

/// Highest accepted target
pub const MAX_PERCENT: f64 = 100.0;

/// Errors produced while parsing a coverage target
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("coverage target is empty")]
    Empty,

    #[error("coverage target '{0}' is not a decimal number")]
    NotANumber(String),

    #[error("coverage target {0} is negative")]
    Negative(String),

    #[error("coverage target {0} exceeds 100")]
    AboveMaximum(String),
}

/// Minimum acceptable coverage percentage, in [0, 100].
///
/// Immutable once parsed. Serializes as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct CoverageTarget(f64);

impl CoverageTarget {
    /// Build a target from an already-numeric percentage
    pub fn new(percent: f64) -> Result<Self, ValidationError> {
        if !percent.is_finite() {
            return Err(ValidationError::NotANumber(percent.to_string()));
        }
        if percent < MIN_PERCENT {
            return Err(ValidationError::Negative(percent.to_string()));
        }
        if percent > MAX_PERCENT {
            return Err(ValidationError::AboveMaximum(percent.to_string()));
        }
        Ok(Self(percent))
    }

    /// The target percentage
    pub fn percent(&self) -> f64 {
        self.0
    }

    /// True when `measured` meets the target (equality passes)
    pub fn is_met_by(&self, measured: f64) -> bool {
        measured >= self.0
    }
}

impl fmt::Display for CoverageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl FromStr for CoverageTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_coverage_target(s)
    }
}

impl TryFrom<f64> for CoverageTarget {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CoverageTarget> for f64 {
    fn from(target: CoverageTarget) -> Self {
        target.0
    }
}

/// Parse a coverage target expression.
///
/// Strips one optional trailing `%`, then requires a plain decimal literal
/// (optional sign, digits, at most one dot). Exponents, `inf` and `NaN` are
/// rejected even though `f64::from_str` would accept them.
pub fn parse_coverage_target(input: &str) -> Result<CoverageTarget, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if number.is_empty() {
        return Err(ValidationError::NotANumber(input.to_string()));
    }
    if !is_decimal_literal(number) {
        return Err(ValidationError::NotANumber(number.to_string()));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| ValidationError::NotANumber(number.to_string()))?;

    if value < MIN_PERCENT {
        return Err(ValidationError::Negative(number.to_string()));
    }
    if value > MAX_PERCENT {
        return Err(ValidationError::AboveMaximum(number.to_string()));
    }

    // "-0" is accepted as zero
    Ok(CoverageTarget(value.abs()))
}

fn is_decimal_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

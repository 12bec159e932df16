//! Parsing of duration literals in `@timeout` style directives.
//!
//! The grammar is one or more `<decimal><unit>` segments, e.g. `30s`,
//! `1.5s`, or `1m30s`, with units `ns`, `us` (or `µs`), `ms`, `s`, `m`,
//! and `h`. The bare literal `0` is also accepted.

use std::fmt;
use std::time::Duration;

/// Errors produced when a duration literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// The literal was empty.
    Empty,

    /// A segment did not begin with a number.
    BadNumber(String),

    /// A number was not followed by a unit.
    MissingUnit(String),

    /// A unit was not one of `ns`, `us`, `ms`, `s`, `m`, `h`.
    BadUnit(String),
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationError::Empty => write!(f, "empty duration"),
            DurationError::BadNumber(text) => write!(f, "invalid number in duration {text:?}"),
            DurationError::MissingUnit(text) => write!(f, "missing unit in duration {text:?}"),
            DurationError::BadUnit(unit) => write!(f, "unknown unit {unit:?} in duration"),
        }
    }
}

impl std::error::Error for DurationError {}

/// The number of nanoseconds a unit suffix stands for.
fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" => Some(1_000.0),
        "ms" => Some(1_000_000.0),
        "s" => Some(1_000_000_000.0),
        "m" => Some(60.0 * 1_000_000_000.0),
        "h" => Some(3600.0 * 1_000_000_000.0),
        _ => None,
    }
}

/// Parses a duration literal such as `30s`, `250ms`, or `1m30s`.
///
/// Negative durations are rejected; timeouts cannot be negative.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    if text.is_empty() {
        return Err(DurationError::Empty);
    }

    // Special case: "0" with no unit
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = text;
    let mut total_nanos = 0.0_f64;

    while !rest.is_empty() {
        // The numeric part: digits with at most one decimal point
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        if number.is_empty() || number == "." {
            return Err(DurationError::BadNumber(text.to_string()));
        }

        let value: f64 = number
            .parse()
            .map_err(|_| DurationError::BadNumber(text.to_string()))?;
        rest = &rest[number_end..];

        // The unit runs up to the next digit
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(text.to_string()));
        }

        let nanos = unit_nanos(unit).ok_or_else(|| DurationError::BadUnit(unit.to_string()))?;
        total_nanos += value * nanos;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

//! Go-style duration text
//!
//! Cluster resources serialize timeouts the way Go's `time.ParseDuration` reads them:
//! a sequence of decimal numbers with a unit suffix, e.g. `10m`, `1h30m0s`, `1.5h`,
//! `300ms`. A bare `0` is also accepted. Negative durations are rejected.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("negative duration: {0}")]
    Negative(String),

    #[error("invalid duration: {0}")]
    Invalid(String),

    #[error("missing unit in duration: {0}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {text:?}")]
    UnknownUnit { unit: String, text: String },

    #[error("duration out of range: {0}")]
    Overflow(String),
}

const NANOS_PER_SECOND: u128 = 1_000_000_000;

fn nanos_per_unit(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SECOND,
        "m" => 60 * NANOS_PER_SECOND,
        "h" => 3_600 * NANOS_PER_SECOND,
        _ => return None,
    })
}

/// Parses Go duration text into a [`Duration`]
pub fn parse(text: &str) -> Result<Duration, DurationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }
    if trimmed == "0" || trimmed == "+0" {
        return Ok(Duration::ZERO);
    }
    if trimmed.starts_with('-') {
        return Err(DurationError::Negative(text.to_string()));
    }

    let invalid = || DurationError::Invalid(text.to_string());
    let overflow = || DurationError::Overflow(text.to_string());

    let mut rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DurationError::MissingUnit(text.to_string()))?;
        let number = &rest[..number_end];
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let per_unit = nanos_per_unit(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            text: text.to_string(),
        })?;

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.contains('.') {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut value = whole.checked_mul(per_unit).ok_or_else(overflow)?;

        let mut scale = per_unit;
        for digit in fraction.chars() {
            scale /= 10;
            if scale == 0 {
                break;
            }
            let digit = digit.to_digit(10).ok_or_else(invalid)? as u128;
            value += digit * scale;
        }

        total = total.checked_add(value).ok_or_else(overflow)?;
    }

    let nanos = u64::try_from(total).map_err(|_| overflow())?;
    Ok(Duration::from_nanos(nanos))
}

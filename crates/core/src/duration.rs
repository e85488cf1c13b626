//! Prometheus-style duration literals (`30s`, `1h30m`, `2w`).

use std::time::Duration;

use crate::error::ConfigError;

/// Units in the order they must appear, with their length in milliseconds.
const UNITS: &[(&str, u64)] = &[
    ("y", 365 * 86_400_000),
    ("w", 7 * 86_400_000),
    ("d", 86_400_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

/// Parse a duration literal into a [`Duration`].
///
/// Accepts one or more `<integer><unit>` components with units `y w d h m s ms`,
/// each unit at most once and in descending order ("1h30m", not "30m1h").
/// A bare `0` is accepted as zero. Anything else is a [`ConfigError::Duration`].
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let err = |reason: &str| ConfigError::Duration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim();
    if s.is_empty() {
        return Err(err("empty duration"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_ms: u64 = 0;
    // Index into UNITS of the last unit consumed; enforces ordering.
    let mut last_unit: Option<usize> = None;
    let mut rest = s;

    while !rest.is_empty() {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Err(err("expected a number"));
        }
        let n: u64 = rest[..digits]
            .parse()
            .map_err(|_| err("number out of range"))?;
        rest = &rest[digits..];

        let unit_len = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        if unit_len == 0 {
            return Err(err("missing unit"));
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let idx = UNITS
            .iter()
            .position(|(name, _)| *name == unit)
            .ok_or_else(|| err(&format!("unknown unit '{unit}'")))?;
        if last_unit.is_some_and(|prev| idx <= prev) {
            return Err(err("units must appear once, largest first"));
        }
        last_unit = Some(idx);

        let component = n
            .checked_mul(UNITS[idx].1)
            .ok_or_else(|| err("duration overflows"))?;
        total_ms = total_ms
            .checked_add(component)
            .ok_or_else(|| err("duration overflows"))?;
    }

    Ok(Duration::from_millis(total_ms))
}

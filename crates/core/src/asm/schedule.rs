use chrono::Duration;

use crate::{Error, Result};

/// Parses an interval schedule value: `<n>m`, `<n>h`, `<n>d` or plain
/// minutes, with `n >= 1`.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim().to_ascii_lowercase();
    let invalid = || Error::invalid(format!("Invalid interval: {}", value));

    let (digits, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], c),
        Some(_) => (value.as_str(), 'm'),
        None => return Err(invalid()),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let n: i64 = digits.parse().map_err(|_| invalid())?;
    if n < 1 {
        return Err(invalid());
    }

    let duration = match unit {
        'm' => Duration::try_minutes(n),
        'h' => Duration::try_hours(n),
        'd' => Duration::try_days(n),
        _ => None,
    };
    duration.ok_or_else(invalid)
}

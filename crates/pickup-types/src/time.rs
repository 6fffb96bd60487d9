//! Deadline parsing.
//!
//! Deadline arguments accept either an absolute timestamp in the layout
//! `YYYY-MM-DDTHH:MM:SS` (interpreted as UTC) or a relative duration such as
//! `48h`, `30s` or `1h30m`, resolved against "now" at parse time.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::ParseError;

/// Timestamp layout used for absolute deadlines and table output.
pub const TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a deadline string, resolving relative durations against `now`.
pub fn parse_deadline(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ParseError> {
	let value = value.trim();

	if let Some(duration) = parse_duration(value) {
		// A duration can be representable while the resolved instant is
		// past the calendar range; that is still an invalid deadline,
		// never a panic.
		return now
			.checked_add_signed(duration)
			.ok_or_else(|| ParseError::InvalidDeadline(value.to_string()));
	}

	NaiveDateTime::parse_from_str(value, TIME_LAYOUT)
		.map(|naive| naive.and_utc())
		.map_err(|_| ParseError::InvalidDeadline(value.to_string()))
}

/// Parses a relative duration made of integer segments with `h`, `m` or `s`
/// units, e.g. `48h`, `30s`, `1h30m`. Returns `None` when the string is not
/// a duration at all (so the caller can fall back to the absolute layout)
/// or when the amounts overflow the representable duration range.
fn parse_duration(value: &str) -> Option<Duration> {
	if value.is_empty() {
		return None;
	}

	let mut total = Duration::zero();
	let mut digits = String::new();
	let mut seen_segment = false;

	for ch in value.chars() {
		if ch.is_ascii_digit() {
			digits.push(ch);
			continue;
		}

		let amount: i64 = digits.parse().ok()?;
		digits.clear();
		seen_segment = true;

		let segment = match ch {
			'h' => Duration::try_hours(amount),
			'm' => Duration::try_minutes(amount),
			's' => Duration::try_seconds(amount),
			_ => return None,
		}?;
		total = total.checked_add(&segment)?;
	}

	// Trailing digits without a unit make the whole string invalid as a
	// duration; "2030" must fall through to the absolute-timestamp path.
	if !digits.is_empty() || !seen_segment {
		return None;
	}

	Some(total)
}

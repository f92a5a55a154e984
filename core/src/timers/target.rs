//! Target date parsing for target-date countdowns

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use super::TimerError;

/// Forms produced by datetime-local inputs, interpreted in local time
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a target date from RFC 3339 or a local `YYYY-MM-DDTHH:MM[:SS]` string
pub fn parse_target(input: &str) -> Result<DateTime<Utc>, TimerError> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
        }
    }

    Err(TimerError::MalformedDate {
        input: input.to_string(),
    })
}

/// Persisted form of a target instant (millisecond ISO 8601, UTC)
pub fn format_target(target: DateTime<Utc>) -> String {
    target.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole seconds from `now` until `target`, zero once it has passed
pub fn seconds_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    // num_seconds truncates toward zero, which is floor for the positive case
    (target - now).num_seconds().max(0) as u64
}

/// Remaining seconds for a stored target string; malformed targets count as elapsed
pub fn remaining_for(target: Option<&str>, now: DateTime<Utc>) -> Result<u64, TimerError> {
    let input = target.ok_or_else(|| TimerError::MalformedDate {
        input: String::new(),
    })?;
    Ok(seconds_until(parse_target(input)?, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_target("2026-10-20T12:00:00+02:00").unwrap();
        assert_eq!(format_target(parsed), "2026-10-20T10:00:00.000Z");
    }

    #[test]
    fn parses_local_minutes_form() {
        let parsed = parse_target("2026-10-20T12:30").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.format("%H:%M").to_string(), "12:30");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_target("tomorrow"),
            Err(TimerError::MalformedDate {
                input: "tomorrow".to_string()
            })
        );
    }

    #[test]
    fn seconds_until_floors_and_clamps() {
        let now = Utc::now();
        assert_eq!(seconds_until(now + Duration::milliseconds(3_600_900), now), 3600);
        assert_eq!(seconds_until(now - Duration::seconds(5), now), 0);
    }

    #[test]
    fn missing_target_is_malformed() {
        assert!(remaining_for(None, Utc::now()).is_err());
    }
}

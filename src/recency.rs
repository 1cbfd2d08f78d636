//! Recency filter: only fresh articles are worth scoring.
//! Unparseable timestamps fail closed.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;

/// Is an article published at `published_at` (RFC 3339) still within `max_age` of `now`?
/// Timestamps slightly in the future (clock skew) count as fresh.
pub fn is_fresh(published_at: &str, now: DateTime<Utc>, max_age: Duration) -> bool {
    let raw = published_at.trim();
    let published = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(target: "pipeline", published_at = raw, error = %e, "unparseable publish time, skipping article");
            counter!("sentinel_bad_timestamp_total").increment(1);
            return false;
        }
    };
    now.signed_duration_since(published) <= max_age
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn within_window_passes() {
        assert!(is_fresh("2024-05-01T11:00:00Z", now(), Duration::minutes(120)));
        assert!(is_fresh("2024-05-01T10:00:00Z", now(), Duration::minutes(120)));
    }

    #[test]
    fn older_than_window_rejected() {
        assert!(!is_fresh("2024-05-01T09:59:59Z", now(), Duration::minutes(120)));
    }

    #[test]
    fn offsets_are_honoured() {
        // 13:30+02:00 == 11:30Z
        assert!(is_fresh("2024-05-01T13:30:00+02:00", now(), Duration::minutes(60)));
        assert!(!is_fresh("2024-05-01T08:30:00-02:00", now(), Duration::minutes(60)));
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        assert!(is_fresh("2024-05-01T12:05:00Z", now(), Duration::minutes(120)));
    }

    #[test]
    fn garbage_and_empty_fail_closed() {
        for raw in ["", "   ", "not a date", "2024-05-01", "01/05/2024 11:00"] {
            assert!(!is_fresh(raw, now(), Duration::minutes(120)), "{raw:?}");
        }
    }
}

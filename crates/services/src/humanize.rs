//! Human-readable countdowns for the guest quota reset.

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Formats a remaining duration given in milliseconds.
///
/// `"0m"` once elapsed, `"less than a minute"` under a minute, `"42m"`
/// under an hour, and `"5h 3m"` otherwise.
pub fn humanize_duration(ms: i64) -> String {
    if ms <= 0 {
        return "0m".to_string();
    }
    if ms < MINUTE_MS {
        return "less than a minute".to_string();
    }

    let hours = ms / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_range() {
        assert_eq!(humanize_duration(-5), "0m");
        assert_eq!(humanize_duration(0), "0m");
        assert_eq!(humanize_duration(59_999), "less than a minute");
        assert_eq!(humanize_duration(60_000), "1m");
        assert_eq!(humanize_duration(42 * MINUTE_MS + 30_000), "42m");
        assert_eq!(humanize_duration(HOUR_MS), "1h 0m");
        assert_eq!(humanize_duration(23 * HOUR_MS + 59 * MINUTE_MS), "23h 59m");
    }
}

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::declare::QUOTE_UTC_OFFSET_SECS;

/// 報價使用的固定時區 (UTC+4)
pub fn quote_zone() -> FixedOffset {
    FixedOffset::east_opt(QUOTE_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current time in the quote time zone, independent of the host's local zone.
pub fn now_in_quote_zone() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&quote_zone())
}

/// Renders a quote timestamp as `2026-10-15 14:03:22 (UTC+04:00)`.
pub fn format_quote_time(at: &DateTime<FixedOffset>) -> String {
    at.format("%Y-%m-%d %H:%M:%S (UTC%:z)").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_quote_zone() {
        assert_eq!(quote_zone().local_minus_utc(), 4 * 60 * 60);
        assert_eq!(now_in_quote_zone().offset().local_minus_utc(), 4 * 60 * 60);
    }

    #[test]
    fn test_format_quote_time() {
        let at = Utc
            .with_ymd_and_hms(2026, 10, 15, 10, 3, 22)
            .unwrap()
            .with_timezone(&quote_zone());

        assert_eq!(format_quote_time(&at), "2026-10-15 14:03:22 (UTC+04:00)");
    }
}

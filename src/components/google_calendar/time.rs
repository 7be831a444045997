use super::models::CalendarEvent;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

/// Accepted date formats, tried in order
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Accepted clock formats, tried in order
const TIME_FORMATS: [&str; 3] = ["%I:%M %p", "%I:%M%p", "%H:%M"];

/// Parse a date in MM/DD/YYYY (or YYYY-MM-DD) format.
///
/// The year must have four digits; `12/25/25` is rejected rather than read
/// as year 25.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_str, fmt).ok())
        .filter(|date| (1000..=9999).contains(&date.year()))
}

/// Parse a time of day such as `2:30 PM`, `2:30pm`, `14:30`, `2PM` or `14`
pub fn parse_time_of_day(time_str: &str) -> Option<NaiveTime> {
    let time_str = time_str.trim().to_uppercase();
    if time_str.is_empty() {
        return None;
    }

    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&time_str, fmt).ok())
    {
        return Some(time);
    }

    // Bare hours: "2PM", "2 PM" or "14"
    let (hour_part, meridiem) = if let Some(hour) = time_str.strip_suffix("AM") {
        (hour.trim_end(), Some(false))
    } else if let Some(hour) = time_str.strip_suffix("PM") {
        (hour.trim_end(), Some(true))
    } else {
        (time_str.as_str(), None)
    };

    if hour_part.is_empty() || !hour_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hour = hour_part.parse::<u32>().ok()?;

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, 0, 0)
}

/// Attach a timezone to a wall-clock time.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times that
/// do not exist (DST spring-forward) yield `None`.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Parse separate date and time arguments into a zoned datetime
pub fn parse_event_datetime(date_str: &str, time_str: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let date = parse_date(date_str)?;
    let time = parse_time_of_day(time_str)?;
    localize(date.and_time(time), tz)
}

/// Parse a single `<date> <time>` string such as `12/25/2025 2:30 PM`
pub fn parse_datetime_text(text: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let (date_str, time_str) = text.trim().split_once(char::is_whitespace)?;
    parse_event_datetime(date_str, time_str, tz)
}

/// Get event start in the given timezone, with a flag for all-day events
pub fn event_start(event: &CalendarEvent, tz: Tz) -> Option<(DateTime<Tz>, bool)> {
    if let Some(date_time) = &event.start_date_time {
        let dt = DateTime::parse_from_rfc3339(date_time).ok()?;
        Some((dt.with_timezone(&tz), false))
    } else if let Some(date) = &event.start_date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let start = localize(date.and_hms_opt(0, 0, 0)?, tz)?;
        Some((start, true))
    } else {
        None
    }
}

/// Format a time of day in 12-hour clock, e.g. `2:30 PM`
pub fn format_clock(dt: &DateTime<Tz>) -> String {
    let (is_pm, hour) = dt.hour12();
    format!("{}:{:02} {}", hour, dt.minute(), if is_pm { "PM" } else { "AM" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("12/25/2025"), NaiveDate::from_ymd_opt(2025, 12, 25));
        assert_eq!(parse_date("2025-12-25"), NaiveDate::from_ymd_opt(2025, 12, 25));
        assert_eq!(parse_date("1/5/2026"), NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(parse_date("13/01/2025"), None);
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_date("12/25/25"), None);
        assert_eq!(parse_date("25-12-25"), None);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("2:30 PM"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_time_of_day("2:30pm"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_time_of_day("14:30"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_time_of_day("12:15 AM"), NaiveTime::from_hms_opt(0, 15, 0));
        assert_eq!(parse_time_of_day("2PM"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(parse_time_of_day("12 pm"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_time_of_day("12AM"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_time_of_day("9"), NaiveTime::from_hms_opt(9, 0, 0));

        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("25"), None);
        assert_eq!(parse_time_of_day("13PM"), None);
        assert_eq!(parse_time_of_day("noon"), None);
        assert_eq!(parse_time_of_day("14:75"), None);
    }

    #[test]
    fn test_parse_event_datetime_uses_timezone() {
        let dt = parse_event_datetime("12/25/2025", "2:30 PM", Los_Angeles).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-12-25T14:30:00-08:00");

        let summer = parse_event_datetime("07/04/2025", "9", Los_Angeles).unwrap();
        assert_eq!(summer.to_rfc3339(), "2025-07-04T09:00:00-07:00");
    }

    #[test]
    fn test_parse_event_datetime_dst_gap() {
        // 2:30 AM does not exist on the spring-forward day
        assert!(parse_event_datetime("03/09/2025", "2:30 AM", Los_Angeles).is_none());
    }

    #[test]
    fn test_parse_event_datetime_dst_overlap() {
        // 1:30 AM happens twice on the fall-back day; the first one is daylight time
        let dt = parse_event_datetime("11/02/2025", "1:30 AM", Los_Angeles).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-11-02T01:30:00-07:00");
    }

    #[test]
    fn test_parse_datetime_text() {
        let dt = parse_datetime_text("  2025-12-25 14:00 ", Los_Angeles).unwrap();
        assert_eq!(dt.day(), 25);
        assert_eq!(format_clock(&dt), "2:00 PM");

        let dt = parse_datetime_text("12/25/2025 2:30 PM", Los_Angeles).unwrap();
        assert_eq!(format_clock(&dt), "2:30 PM");

        assert!(parse_datetime_text("12/25/2025", Los_Angeles).is_none());
    }

    #[test]
    fn test_event_start() {
        let timed = CalendarEvent {
            id: "a".to_string(),
            start_date_time: Some("2025-12-25T22:30:00Z".to_string()),
            ..Default::default()
        };
        let (start, all_day) = event_start(&timed, Los_Angeles).unwrap();
        assert!(!all_day);
        assert_eq!(format_clock(&start), "2:30 PM");

        let all_day_event = CalendarEvent {
            id: "b".to_string(),
            start_date: Some("2025-12-26".to_string()),
            ..Default::default()
        };
        let (start, all_day) = event_start(&all_day_event, Los_Angeles).unwrap();
        assert!(all_day);
        assert_eq!(start.day(), 26);

        assert!(event_start(&CalendarEvent::default(), Los_Angeles).is_none());
    }
}

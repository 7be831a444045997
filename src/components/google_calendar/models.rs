use chrono::{DateTime, Duration, SecondsFormat};
use chrono_tz::Tz;
use serde_json::{json, Value};

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub html_link: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

impl CalendarEvent {
    /// Build from a Calendar API event resource
    pub fn from_api(event: &Value) -> Self {
        let text = |key: &str| event.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());
        let nested = |outer: &str, inner: &str| {
            event
                .get(outer)
                .and_then(|o| o.as_object())
                .and_then(|o| o.get(inner))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        CalendarEvent {
            id: text("id").unwrap_or_default(),
            summary: text("summary"),
            description: text("description"),
            html_link: text("htmlLink"),
            start_date_time: nested("start", "dateTime"),
            start_date: nested("start", "date"),
            end_date_time: nested("end", "dateTime"),
            end_date: nested("end", "date"),
        }
    }
}

/// An event to be inserted into the calendar
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub description: Option<String>,
    /// Registered email of the requesting user, added as an attendee
    pub invitee: Option<String>,
}

impl NewEvent {
    /// Event of a fixed length starting at `start`
    pub fn with_duration(title: &str, start: DateTime<Tz>, duration: Duration) -> Self {
        Self {
            title: title.to_string(),
            start,
            end: start + duration,
            description: None,
            invitee: None,
        }
    }

    /// JSON body for `events.insert`
    pub fn to_request_body(&self) -> Value {
        let mut body = json!({
            "summary": self.title,
            "start": event_time(&self.start),
            "end": event_time(&self.end),
        });

        if let Some(description) = &self.description {
            body["description"] = json!(description);
        }
        if let Some(email) = &self.invitee {
            body["attendees"] = json!([{ "email": email }]);
        }

        body
    }
}

fn event_time(dt: &DateTime<Tz>) -> Value {
    json!({
        "dateTime": dt.to_rfc3339_opts(SecondsFormat::Secs, false),
        "timeZone": dt.timezone().name(),
    })
}

/// Half-open range of instants to list events for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    /// From `now` until `days` days later
    pub fn upcoming_days(now: DateTime<Tz>, days: u32) -> Self {
        Self {
            start: now,
            end: now + Duration::days(i64::from(days)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_request_body() {
        let start = Los_Angeles.with_ymd_and_hms(2025, 12, 25, 14, 30, 0).unwrap();
        let mut event = NewEvent::with_duration("Standup", start, Duration::minutes(60));
        event.description = Some("Daily sync".to_string());
        event.invitee = Some("ada@example.com".to_string());

        let body = event.to_request_body();
        assert_eq!(body["summary"], "Standup");
        assert_eq!(body["description"], "Daily sync");
        assert_eq!(body["start"]["dateTime"], "2025-12-25T14:30:00-08:00");
        assert_eq!(body["end"]["dateTime"], "2025-12-25T15:30:00-08:00");
        assert_eq!(body["start"]["timeZone"], "America/Los_Angeles");
        assert_eq!(body["attendees"][0]["email"], "ada@example.com");
    }

    #[test]
    fn test_request_body_without_optionals() {
        let start = Los_Angeles.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap();
        let body = NewEvent::with_duration("Focus", start, Duration::minutes(30)).to_request_body();
        assert!(body.get("description").is_none());
        assert!(body.get("attendees").is_none());
    }

    #[test]
    fn test_from_api() {
        let value = json!({
            "id": "evt1",
            "summary": "Launch",
            "htmlLink": "https://calendar.google.com/event?eid=evt1",
            "start": { "dateTime": "2025-12-25T14:30:00-08:00" },
            "end": { "date": "2025-12-26" }
        });
        let event = CalendarEvent::from_api(&value);
        assert_eq!(event.id, "evt1");
        assert_eq!(event.summary.as_deref(), Some("Launch"));
        assert_eq!(event.description, None);
        assert_eq!(event.start_date_time.as_deref(), Some("2025-12-25T14:30:00-08:00"));
        assert_eq!(event.end_date.as_deref(), Some("2025-12-26"));
        assert!(event.html_link.is_some());
    }

    #[test]
    fn test_upcoming_days() {
        let now = Los_Angeles.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let window = TimeWindow::upcoming_days(now, 7);
        assert_eq!(window.start, now);
        assert_eq!(window.end - window.start, Duration::days(7));
    }
}

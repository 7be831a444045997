//! Turns raw command arguments into calendar calls.
//!
//! Validation happens before any call is made: a command whose arguments
//! cannot be parsed yields [`DispatchError::Usage`] and the calendar is never
//! touched.

use super::format;
use crate::components::google_calendar::time::{parse_datetime_text, parse_event_datetime};
use crate::components::google_calendar::{CalendarApi, CalendarEvent, NewEvent, TimeWindow};
use crate::error::{BotResult, Error};
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use rust_i18n::t;
use tracing::debug;

/// Prefix of the legacy text commands
pub const TEXT_PREFIX: &str = "!";

/// Days listed by `!list_events` without an argument
pub const DEFAULT_LIST_DAYS: u32 = 7;

/// Largest accepted `!list_events` range
pub const MAX_LIST_DAYS: u32 = 90;

/// A parsed legacy text command
#[derive(Debug, Clone, PartialEq)]
pub enum TextCommand {
    CreateEvent(NewEvent),
    ListEvents { days: u32 },
    Help,
}

/// Why a command could not be carried out
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Malformed arguments; the message explains the expected usage
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Calendar(#[from] Error),
}

fn usage(reason: impl std::fmt::Display, usage: impl std::fmt::Display) -> DispatchError {
    DispatchError::Usage(format!("{}\n{}", reason, usage))
}

/// An event as requested and as stored by the calendar
#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub request: NewEvent,
    pub event: CalendarEvent,
}

/// Routes commands to a calendar
pub struct CalendarDispatcher<'a> {
    api: &'a dyn CalendarApi,
    timezone: Tz,
    event_duration: Duration,
}

impl<'a> CalendarDispatcher<'a> {
    pub fn new(api: &'a dyn CalendarApi, timezone: Tz, event_duration: Duration) -> Self {
        Self {
            api,
            timezone,
            event_duration,
        }
    }

    /// Validate `/create_event` arguments
    pub fn parse_slash_event(
        &self,
        name: &str,
        date: &str,
        time: &str,
        description: Option<&str>,
    ) -> Result<NewEvent, DispatchError> {
        parse_slash_event(
            name,
            date,
            time,
            description,
            self.timezone,
            self.event_duration,
        )
    }

    /// Handle `/create_event`: exactly one calendar call when the arguments parse
    pub async fn create_from_slash(
        &self,
        name: &str,
        date: &str,
        time: &str,
        description: Option<&str>,
        invitee: Option<String>,
    ) -> Result<CreatedEvent, DispatchError> {
        let mut request = self.parse_slash_event(name, date, time, description)?;
        request.invitee = invitee;
        self.submit(request).await
    }

    /// Send a validated event to the calendar
    pub async fn submit(&self, request: NewEvent) -> Result<CreatedEvent, DispatchError> {
        let event = self.api.create_event(request.clone()).await?;
        Ok(CreatedEvent { request, event })
    }

    /// Events from now until `days` days from now in the configured timezone
    pub async fn list_upcoming(&self, days: u32) -> BotResult<Vec<CalendarEvent>> {
        let now = Utc::now().with_timezone(&self.timezone);
        self.api
            .list_events(TimeWindow::upcoming_days(now, days))
            .await
    }

    /// Recognise a legacy text command; `None` when the message is not one
    pub fn parse_text(&self, content: &str) -> Option<Result<TextCommand, DispatchError>> {
        let (name, args) = split_text_command(content)?;

        match name {
            "create_event" => Some(self.parse_create_args(args)),
            "list_events" => Some(parse_days(args)),
            "help_calendar" => Some(Ok(TextCommand::Help)),
            _ => None,
        }
    }

    /// `Title | start | end | description`
    fn parse_create_args(&self, args: &str) -> Result<TextCommand, DispatchError> {
        let parts: Vec<&str> = args.split('|').map(str::trim).collect();
        if parts.len() < 3 {
            return Err(usage(t!("missing_arguments"), t!("usage_create_event")));
        }

        let title = parts[0];
        if title.is_empty() {
            return Err(usage(t!("empty_title"), t!("usage_create_event")));
        }

        let start = parse_datetime_text(parts[1], self.timezone).ok_or_else(|| {
            usage(t!("invalid_start", value = parts[1]), t!("usage_create_event"))
        })?;
        let end = parse_datetime_text(parts[2], self.timezone).ok_or_else(|| {
            usage(t!("invalid_end", value = parts[2]), t!("usage_create_event"))
        })?;
        if end <= start {
            return Err(usage(t!("end_before_start"), t!("usage_create_event")));
        }

        let description = parts[3..].join(" | ");

        Ok(TextCommand::CreateEvent(NewEvent {
            title: title.to_string(),
            start,
            end,
            description: non_empty(Some(&description)),
            invitee: None,
        }))
    }

    /// Run a parsed text command and build the reply
    pub async fn execute(&self, command: TextCommand) -> String {
        match command {
            TextCommand::CreateEvent(request) => match self.submit(request).await {
                Ok(created) => format::event_created_text(&created),
                Err(e) => format::error_text(&e),
            },
            TextCommand::ListEvents { days } => match self.list_upcoming(days).await {
                Ok(events) => format::event_list_text(&events, self.timezone, days),
                Err(e) => format::error_text(&DispatchError::Calendar(e)),
            },
            TextCommand::Help => format::help_text(),
        }
    }

    /// Parse and run a legacy text command, returning the reply
    pub async fn dispatch_text(&self, content: &str, invitee: Option<String>) -> Option<String> {
        let reply = match self.parse_text(content)? {
            Ok(mut command) => {
                debug!("Dispatching text command {:?}", command);
                if let TextCommand::CreateEvent(event) = &mut command {
                    event.invitee = invitee;
                }
                self.execute(command).await
            }
            Err(e) => format::error_text(&e),
        };
        Some(reply)
    }
}

/// Validate `/create_event` arguments into an event of `event_duration`.
/// Needs no calendar, so bad input can be answered even when it is down.
pub fn parse_slash_event(
    name: &str,
    date: &str,
    time: &str,
    description: Option<&str>,
    timezone: Tz,
    event_duration: Duration,
) -> Result<NewEvent, DispatchError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DispatchError::Usage(t!("empty_title").to_string()));
    }

    let start = parse_event_datetime(date, time, timezone)
        .ok_or_else(|| DispatchError::Usage(t!("invalid_date_time").to_string()))?;

    let mut event = NewEvent::with_duration(name, start, event_duration);
    event.description = non_empty(description);
    Ok(event)
}

/// Names of the legacy text commands
pub const TEXT_COMMANDS: [&str; 3] = ["create_event", "list_events", "help_calendar"];

/// Split `!name args` into name and trimmed arguments, for known commands only
pub fn split_text_command(content: &str) -> Option<(&str, &str)> {
    let rest = content.trim().strip_prefix(TEXT_PREFIX)?;
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    TEXT_COMMANDS.contains(&name).then_some((name, args))
}

fn parse_days(args: &str) -> Result<TextCommand, DispatchError> {
    if args.is_empty() {
        return Ok(TextCommand::ListEvents {
            days: DEFAULT_LIST_DAYS,
        });
    }

    match args.parse::<u32>() {
        Ok(days) if (1..=MAX_LIST_DAYS).contains(&days) => Ok(TextCommand::ListEvents { days }),
        _ => Err(usage(
            t!("invalid_days", max = MAX_LIST_DAYS),
            t!("usage_list_events"),
        )),
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono_tz::America::Los_Angeles;

    struct NoCalendar;

    #[async_trait]
    impl CalendarApi for NoCalendar {
        async fn create_event(&self, _event: NewEvent) -> BotResult<CalendarEvent> {
            Err(crate::error::google_calendar_error("offline"))
        }

        async fn list_events(&self, _window: TimeWindow) -> BotResult<Vec<CalendarEvent>> {
            Err(crate::error::google_calendar_error("offline"))
        }
    }

    fn dispatcher(api: &NoCalendar) -> CalendarDispatcher<'_> {
        CalendarDispatcher::new(api, Los_Angeles, Duration::minutes(60))
    }

    #[test]
    fn test_parse_text_ignores_other_messages() {
        let api = NoCalendar;
        let d = dispatcher(&api);
        assert!(d.parse_text("hello there").is_none());
        assert!(d.parse_text("!ping").is_none());
        assert!(d.parse_text("create_event a | b | c").is_none());
    }

    #[test]
    fn test_parse_list_days() {
        let api = NoCalendar;
        let d = dispatcher(&api);
        assert_eq!(
            d.parse_text("!list_events").unwrap().unwrap(),
            TextCommand::ListEvents { days: 7 }
        );
        assert_eq!(
            d.parse_text("!list_events 30").unwrap().unwrap(),
            TextCommand::ListEvents { days: 30 }
        );
        assert!(d.parse_text("!list_events 0").unwrap().is_err());
        assert!(d.parse_text("!list_events 91").unwrap().is_err());
        assert!(d.parse_text("!list_events soon").unwrap().is_err());
    }

    #[test]
    fn test_parse_create_event_text() {
        let api = NoCalendar;
        let d = dispatcher(&api);
        let command = d
            .parse_text("!create_event Launch | 12/25/2025 2:00 PM | 12/25/2025 3:30 PM | Ship it | now")
            .unwrap()
            .unwrap();

        let TextCommand::CreateEvent(event) = command else {
            panic!("expected create event");
        };
        assert_eq!(event.title, "Launch");
        assert_eq!(event.end - event.start, Duration::minutes(90));
        assert_eq!(event.description.as_deref(), Some("Ship it | now"));
        assert_eq!(event.invitee, None);
    }

    #[test]
    fn test_parse_create_event_text_errors() {
        let api = NoCalendar;
        let d = dispatcher(&api);
        for content in [
            "!create_event",
            "!create_event Launch | 12/25/2025 2:00 PM",
            "!create_event  | 12/25/2025 2:00 PM | 12/25/2025 3:00 PM",
            "!create_event Launch | someday | 12/25/2025 3:00 PM",
            "!create_event Launch | 12/25/2025 2:00 PM | 12/25/2025 1:00 PM",
        ] {
            let result = d.parse_text(content).unwrap();
            assert!(
                matches!(result, Err(DispatchError::Usage(_))),
                "{} should be a usage error",
                content
            );
        }
    }

    #[test]
    fn test_parse_slash_event() {
        let api = NoCalendar;
        let d = dispatcher(&api);
        let event = d
            .parse_slash_event(" Standup ", "12/25/2025", "9:15 AM", Some("  "))
            .unwrap();
        assert_eq!(event.title, "Standup");
        assert_eq!(event.start.to_rfc3339(), "2025-12-25T09:15:00-08:00");
        assert_eq!(event.end - event.start, Duration::minutes(60));
        assert_eq!(event.description, None);

        assert!(d.parse_slash_event("", "12/25/2025", "9:15 AM", None).is_err());
        assert!(d.parse_slash_event("x", "25/12/2025", "9:15 AM", None).is_err());
    }

    #[test]
    fn test_parse_slash_event_without_calendar() {
        let result = parse_slash_event(
            "Party",
            "12/25/25",
            "2:30 PM",
            None,
            Los_Angeles,
            Duration::minutes(60),
        );
        assert!(matches!(result, Err(DispatchError::Usage(_))));

        let event = parse_slash_event(
            "Party",
            "12/25/2025",
            "2:30 PM",
            Some("cake"),
            Los_Angeles,
            Duration::minutes(90),
        )
        .unwrap();
        assert_eq!(event.end - event.start, Duration::minutes(90));
        assert_eq!(event.description.as_deref(), Some("cake"));
    }

    #[tokio::test]
    async fn test_calendar_errors_become_replies() {
        let api = NoCalendar;
        let d = dispatcher(&api);
        let reply = d.dispatch_text("!list_events", None).await.unwrap();
        assert!(reply.contains("offline"));
    }
}

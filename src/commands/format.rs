use super::dispatch::{CreatedEvent, DispatchError};
use super::{create_info_embed, create_success_embed, SUCCESS_COLOR};
use crate::components::google_calendar::time::{event_start, format_clock};
use crate::components::google_calendar::CalendarEvent;
use chrono::NaiveDate;
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;
use rust_i18n::t;

/// Discord's message length limit, with headroom for the truncation note
const MESSAGE_BUDGET: usize = 1900;

/// Discord timestamp markup rendered in each reader's own timezone
pub fn discord_timestamp(timestamp: i64) -> String {
    format!("<t:{}:F>\n(<t:{}:R>)", timestamp, timestamp)
}

/// Embed confirming a created event
pub fn event_created_embed(created: &CreatedEvent) -> serenity::CreateEmbed {
    let request = &created.request;
    let mut embed = serenity::CreateEmbed::new()
        .title(t!("event_created_title"))
        .color(SUCCESS_COLOR)
        .field(t!("field_event_name"), &request.title, false);

    if let Some(description) = &request.description {
        embed = embed.field(t!("field_description"), description, false);
    }

    embed = embed.field(
        t!("field_date_time"),
        discord_timestamp(request.start.timestamp()),
        false,
    );

    if let Some(invitee) = &request.invitee {
        embed = embed.field(t!("field_invitee"), invitee, false);
    }

    embed
}

/// Link button to the event in Google Calendar, if the API returned one
pub fn event_link_row(created: &CreatedEvent) -> Option<serenity::CreateActionRow> {
    let link = created.event.html_link.as_ref()?;
    let button = serenity::CreateButton::new_link(link).label(t!("button_open_event"));
    Some(serenity::CreateActionRow::Buttons(vec![button]))
}

/// Plain-text confirmation for the legacy `!create_event`
pub fn event_created_text(created: &CreatedEvent) -> String {
    let request = &created.request;
    let mut message = t!(
        "event_created_text",
        title = request.title.as_str(),
        start = request.start.timestamp(),
        end = request.end.timestamp()
    )
    .to_string();

    if let Some(invitee) = &request.invitee {
        message.push('\n');
        message.push_str(&t!("event_invite_sent", email = invitee));
    }
    if let Some(link) = &created.event.html_link {
        message.push('\n');
        message.push_str(link);
    }

    message
}

/// Upcoming events grouped by day, truncated to fit one message
pub fn event_list_text(events: &[CalendarEvent], timezone: Tz, days: u32) -> String {
    if events.is_empty() {
        return t!("event_list_empty", days = days).to_string();
    }

    let mut message = t!("event_list_title", days = days).to_string();
    message.push('\n');

    let mut current_date: Option<NaiveDate> = None;
    for (index, event) in events.iter().enumerate() {
        let start = event_start(event, timezone);

        let mut chunk = String::new();
        if let Some((start, _)) = &start {
            let date = start.date_naive();
            if current_date != Some(date) {
                current_date = Some(date);
                chunk.push_str(&format!("\n**{}**\n", date.format("%A, %B %d")));
            }
        }

        let when = match &start {
            Some((_, true)) => t!("calendar_all_day").to_string(),
            Some((start, false)) => format_clock(start),
            None => t!("calendar_unknown_time").to_string(),
        };
        let title = event
            .summary
            .clone()
            .unwrap_or_else(|| t!("calendar_unnamed_event").to_string());
        chunk.push_str(&format!("• **{}** - {}\n", when, title));

        if message.len() + chunk.len() > MESSAGE_BUDGET {
            message.push_str(&t!("event_list_more", count = events.len() - index));
            break;
        }
        message.push_str(&chunk);
    }

    message
}

/// Help for the calendar commands
pub fn help_text() -> String {
    t!("help_calendar").to_string()
}

/// Reply for a failed command
pub fn error_text(error: &DispatchError) -> String {
    match error {
        DispatchError::Usage(message) => format!("❌ {}", message),
        DispatchError::Calendar(e) => t!("error_reply", error = e).to_string(),
    }
}

/// Embed confirming `/register`
pub fn registration_embed(email: &str) -> serenity::CreateEmbed {
    create_success_embed(
        &t!("register_success_title"),
        &t!("register_success_description"),
    )
    .field(t!("field_email"), email, false)
    .field(t!("field_note"), t!("register_note"), false)
}

/// Embed reporting how many commands `/sync` registered
pub fn sync_embed(count: usize) -> serenity::CreateEmbed {
    create_info_embed(&t!("sync_title"), &t!("sync_success", count = count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::NewEvent;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Los_Angeles;

    fn created(link: Option<&str>) -> CreatedEvent {
        let start = Los_Angeles.with_ymd_and_hms(2025, 12, 25, 14, 30, 0).unwrap();
        let mut request = NewEvent::with_duration("Launch", start, Duration::minutes(60));
        request.description = Some("Ship it".to_string());
        CreatedEvent {
            request,
            event: CalendarEvent {
                id: "evt".to_string(),
                html_link: link.map(|s| s.to_string()),
                ..Default::default()
            },
        }
    }

    fn timed(id: &str, summary: &str, start: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            start_date_time: Some(start.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_discord_timestamp() {
        assert_eq!(discord_timestamp(1700000000), "<t:1700000000:F>\n(<t:1700000000:R>)");
    }

    #[test]
    fn test_event_created_embed_fields() {
        let embed = serde_json::to_value(event_created_embed(&created(None))).unwrap();
        let fields = embed["fields"].as_array().unwrap();
        let values: Vec<&str> = fields.iter().filter_map(|f| f["value"].as_str()).collect();
        assert_eq!(fields.len(), 3);
        assert!(values.contains(&"Launch"));
        assert!(values.contains(&"Ship it"));
        assert!(values[2].starts_with("<t:1766701800:F>"));
    }

    #[test]
    fn test_event_link_row() {
        assert!(event_link_row(&created(None)).is_none());
        assert!(event_link_row(&created(Some("https://calendar.google.com/e"))).is_some());
    }

    #[test]
    fn test_event_list_groups_by_day() {
        let events = vec![
            timed("1", "Breakfast", "2025-12-25T16:00:00Z"),
            timed("2", "Lunch", "2025-12-25T20:00:00Z"),
            CalendarEvent {
                id: "3".to_string(),
                summary: None,
                start_date: Some("2025-12-26".to_string()),
                ..Default::default()
            },
        ];
        let text = event_list_text(&events, Los_Angeles, 7);
        assert_eq!(text.matches("**Thursday, December 25**").count(), 1);
        assert!(text.contains("**Friday, December 26**"));
        assert!(text.contains("**8:00 AM** - Breakfast"));
        assert!(text.contains("**12:00 PM** - Lunch"));
    }

    #[test]
    fn test_event_list_truncates() {
        let events: Vec<CalendarEvent> = (0..200)
            .map(|i| timed(&i.to_string(), "A fairly long meeting title", "2025-12-25T16:00:00Z"))
            .collect();
        let text = event_list_text(&events, Los_Angeles, 7);
        assert!(text.chars().count() <= 2000);
    }

    #[test]
    fn test_error_text() {
        let usage = DispatchError::Usage("bad input".to_string());
        assert_eq!(error_text(&usage), "❌ bad input");

        let calendar =
            DispatchError::Calendar(crate::error::google_calendar_error("HTTP 500"));
        assert!(error_text(&calendar).contains("HTTP 500"));
    }
}

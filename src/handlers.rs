use crate::commands::dispatch::{split_text_command, CalendarDispatcher, DispatchError};
use crate::commands::{format, CommandContext};
use crate::components::GoogleCalendarHandle;
use crate::error::{BotResult, Error};
use chrono::Duration;
use chrono_tz::Tz;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

/// Event handler for non-command Discord events.
/// Legacy `!` text commands are dispatched from here.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, CommandContext, Error>,
    data: &CommandContext,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "{} is in {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        serenity::FullEvent::Message { new_message } => {
            // Ignore bot messages (including our own)
            if new_message.author.bot || split_text_command(&new_message.content).is_none() {
                return Ok(());
            }

            debug!(
                "Text command from {}: {}",
                new_message.author.name, new_message.content
            );
            let reply = text_command_reply(new_message, data).await;
            new_message.channel_id.say(&ctx.http, reply).await?;
        }
        _ => {}
    }

    Ok(())
}

async fn calendar_settings(data: &CommandContext) -> BotResult<(GoogleCalendarHandle, Tz, Duration)> {
    let (timezone, event_duration) = {
        let config = data.config.read().await;
        (config.tz()?, Duration::minutes(config.event_duration_minutes))
    };
    Ok((data.calendar().await?, timezone, event_duration))
}

async fn text_command_reply(message: &serenity::Message, data: &CommandContext) -> String {
    // Help needs no calendar
    if matches!(split_text_command(&message.content), Some(("help_calendar", _))) {
        return format::help_text();
    }

    let (calendar, timezone, event_duration) = match calendar_settings(data).await {
        Ok(settings) => settings,
        Err(e) => {
            error!("Calendar unavailable for text command: {}", e);
            return format::error_text(&DispatchError::Calendar(e));
        }
    };

    let dispatcher = CalendarDispatcher::new(&calendar, timezone, event_duration);
    let invitee = data.invitee_for(message.author.id).await;

    dispatcher
        .dispatch_text(&message.content, invitee)
        .await
        .unwrap_or_else(format::help_text)
}

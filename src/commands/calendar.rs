use super::dispatch::{parse_slash_event, CalendarDispatcher, DispatchError};
use super::format;
use crate::commands::{CommandResult, Context};
use chrono::Duration;
use tracing::{error, info};

/// Create a calendar event
#[poise::command(slash_command)]
pub async fn create_event(
    ctx: Context<'_>,
    #[description = "Event name/title"] name: String,
    #[description = "Date in MM/DD/YYYY format (e.g., 12/25/2025)"] date: String,
    #[description = "Time, e.g. 2:30 PM or 14:30"] time: String,
    #[description = "Optional event description"] description: Option<String>,
) -> CommandResult {
    let (timezone, event_duration) = {
        let config = ctx.data().config.read().await;
        (config.tz()?, Duration::minutes(config.event_duration_minutes))
    };

    // Bad input is answered privately before the calendar is touched
    let mut request = match parse_slash_event(
        &name,
        &date,
        &time,
        description.as_deref(),
        timezone,
        event_duration,
    ) {
        Ok(request) => request,
        Err(e) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format::error_text(&e))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    };
    request.invitee = ctx.data().invitee_for(ctx.author().id).await;

    let calendar = ctx.data().calendar().await?;
    let dispatcher = CalendarDispatcher::new(&calendar, timezone, event_duration);

    // Public defer: every reply after this point is visible in the channel
    ctx.defer().await?;

    match dispatcher.submit(request).await {
        Ok(created) => {
            info!(
                "{} created event '{}' ({})",
                ctx.author().name,
                created.request.title,
                created.event.id
            );

            let mut reply = poise::CreateReply::default().embed(format::event_created_embed(&created));
            if let Some(row) = format::event_link_row(&created) {
                reply = reply.components(vec![row]);
            }
            ctx.send(reply).await?;
        }
        Err(e) => {
            if let DispatchError::Calendar(inner) = &e {
                error!("Failed to create event: {}", inner);
            }
            ctx.send(poise::CreateReply::default().content(format::error_text(&e)))
                .await?;
        }
    }

    Ok(())
}

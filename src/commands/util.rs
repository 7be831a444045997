use super::format;
use crate::commands::{CommandResult, Context};
use poise::serenity_prelude as serenity;
use rust_i18n::t;
use tracing::{error, info};

/// Sync slash commands (owner only)
#[poise::command(slash_command, owners_only, ephemeral)]
pub async fn sync(ctx: Context<'_>) -> CommandResult {
    ctx.defer_ephemeral().await?;

    let guild_id = ctx.data().config.read().await.guild_id;
    let commands = poise::builtins::create_application_commands(&ctx.framework().options().commands);

    let result = match guild_id {
        Some(id) => {
            serenity::GuildId::new(id)
                .set_commands(ctx.http(), commands)
                .await
        }
        None => serenity::Command::set_global_commands(ctx.http(), commands).await,
    };

    match result {
        Ok(synced) => {
            info!("Synced {} application command(s)", synced.len());
            ctx.send(poise::CreateReply::default().embed(format::sync_embed(synced.len())))
                .await?;
        }
        Err(e) => {
            error!("Failed to sync application commands: {:?}", e);
            ctx.send(
                poise::CreateReply::default()
                    .content(t!("sync_failed", error = e))
                    .ephemeral(true),
            )
            .await?;
        }
    }

    Ok(())
}

use super::format;
use crate::commands::{CommandResult, Context};
use crate::components::user_registry::is_valid_email;
use rust_i18n::t;
use tracing::info;

/// Register your email for calendar invites
#[poise::command(slash_command, ephemeral)]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Your email address for receiving calendar invites"] email: String,
) -> CommandResult {
    let email = email.trim();
    if !is_valid_email(email) {
        ctx.send(
            poise::CreateReply::default()
                .content(t!("register_invalid_email"))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let registry = ctx.data().registry().await?;
    let author = ctx.author();
    let previous = registry.register(author.id.get(), email, &author.name).await?;

    match previous {
        Some(previous) => info!(
            "{} replaced registered email {} with {}",
            author.name, previous.email, email
        ),
        None => info!("{} registered email {}", author.name, email),
    }

    ctx.send(
        poise::CreateReply::default()
            .embed(format::registration_embed(email))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

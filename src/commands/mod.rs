use crate::components::google_calendar::GoogleCalendar;
use crate::components::user_registry::UserRegistry;
use crate::components::{ComponentManager, GoogleCalendarHandle, UserRegistryHandle};
use crate::config::Config;
use crate::error::{component_error, BotResult};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

// Export submodules
pub mod calendar;
pub mod dispatch;
pub mod format;
pub mod register;
pub mod util;

/// Shared context for all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub component_manager: Option<Arc<ComponentManager>>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            component_manager: None,
        }
    }

    /// Set the component manager
    pub fn with_component_manager(mut self, component_manager: Arc<ComponentManager>) -> Self {
        self.component_manager = Some(component_manager);
        self
    }

    /// Handle to the Google Calendar actor
    pub async fn calendar(&self) -> BotResult<GoogleCalendarHandle> {
        let component = self
            .component_manager
            .as_ref()
            .and_then(|cm| cm.get_component::<GoogleCalendar>("google_calendar"))
            .ok_or_else(|| component_error("Google Calendar component is not registered"))?;

        component
            .get_handle()
            .await
            .ok_or_else(|| component_error("Google Calendar component is not initialized"))
    }

    /// Handle to the user registry actor
    pub async fn registry(&self) -> BotResult<UserRegistryHandle> {
        let component = self
            .component_manager
            .as_ref()
            .and_then(|cm| cm.get_component::<UserRegistry>("user_registry"))
            .ok_or_else(|| component_error("User registry component is not registered"))?;

        component
            .get_handle()
            .await
            .ok_or_else(|| component_error("User registry component is not initialized"))
    }

    /// Registered email for a user, `None` when unregistered or the registry is off
    pub async fn invitee_for(&self, user_id: serenity::UserId) -> Option<String> {
        let registry = self.registry().await.ok()?;
        match registry.email_for(user_id.get()).await {
            Ok(email) => email,
            Err(e) => {
                warn!("Failed to look up registered email: {}", e);
                None
            }
        }
    }
}

/// Type alias for command result
pub type CommandResult = BotResult<()>;

/// Type alias for poise context
pub type Context<'a> = poise::Context<'a, CommandContext, crate::error::Error>;

/// All application commands
pub fn get_all_application_commands() -> Vec<poise::Command<CommandContext, crate::error::Error>> {
    vec![
        register::register(),
        calendar::create_event(),
        util::sync(),
    ]
}

/// Embed colour for successful operations
pub const SUCCESS_COLOR: u32 = 0x2E_CC_71;

/// Green embed for successful operations
pub fn create_success_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(SUCCESS_COLOR)
}

/// Red embed for failures
pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0xE7_4C_3C)
}

/// Blue embed for informational replies
pub fn create_info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x00_99_FF)
}

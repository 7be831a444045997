mod actor;
mod api;
mod handle;
pub mod models;
pub mod time;
pub mod token;

pub use actor::{GoogleCalendarActor, GoogleCalendarActorHandle, CALENDAR_API_BASE};
pub use api::CalendarApi;
pub use handle::GoogleCalendarHandle;
pub use models::{CalendarEvent, NewEvent, TimeWindow};

use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Google Calendar component for integration with Discord
#[derive(Default)]
pub struct GoogleCalendar {
    handle: RwLock<Option<GoogleCalendarHandle>>,
}

impl GoogleCalendar {
    /// Create a new Google Calendar component
    pub fn new() -> Self {
        Self {
            handle: RwLock::new(None),
        }
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<GoogleCalendarHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::Component for GoogleCalendar {
    fn name(&self) -> &'static str {
        "google_calendar"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> BotResult<()> {
        let config = config.read().await;

        if !config.token_path.exists() {
            warn!(
                "No Google token at {}; run get_calendar_token before using calendar commands",
                config.token_path.display()
            );
        }

        // Create a new handle if one doesn't exist
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            *handle_lock = Some(GoogleCalendarHandle::new(&config));
        }

        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

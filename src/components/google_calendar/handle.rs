use super::actor::{GoogleCalendarActor, GoogleCalendarActorHandle};
use super::api::CalendarApi;
use super::models::{CalendarEvent, NewEvent, TimeWindow};
use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: &Config) -> Self {
        let (actor, handle) = GoogleCalendarActor::new(config);
        Self::spawn(actor, handle)
    }

    /// Spawn an actor built by the caller
    pub fn spawn(mut actor: GoogleCalendarActor, handle: GoogleCalendarActorHandle) -> Self {
        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarHandle {
    async fn create_event(&self, event: NewEvent) -> BotResult<CalendarEvent> {
        self.actor_handle.create_event(event).await
    }

    async fn list_events(&self, window: TimeWindow) -> BotResult<Vec<CalendarEvent>> {
        self.actor_handle.list_events(window).await
    }
}

use super::models::{CalendarEvent, NewEvent, TimeWindow};
use crate::error::BotResult;
use async_trait::async_trait;

/// Operations the bot performs against a calendar
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Insert an event and return it as stored by the calendar
    async fn create_event(&self, event: NewEvent) -> BotResult<CalendarEvent>;

    /// Events starting within the window, ordered by start time
    async fn list_events(&self, window: TimeWindow) -> BotResult<Vec<CalendarEvent>>;
}

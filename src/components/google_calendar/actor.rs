use super::models::{CalendarEvent, NewEvent, TimeWindow};
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{auth_error, google_calendar_error, BotResult};
use chrono::SecondsFormat;
use reqwest::{Client, Response, StatusCode};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

/// Google Calendar REST API root
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    calendar_id: String,
    api_base: String,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    CreateEvent(NewEvent, oneshot::Sender<BotResult<CalendarEvent>>),
    ListEvents(TimeWindow, oneshot::Sender<BotResult<Vec<CalendarEvent>>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Create an event in the calendar
    pub async fn create_event(&self, event: NewEvent) -> BotResult<CalendarEvent> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::CreateEvent(event, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| google_calendar_error("Response channel closed"))?
    }

    /// List events within a time window
    pub async fn list_events(&self, window: TimeWindow) -> BotResult<Vec<CalendarEvent>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(GoogleCalendarCommand::ListEvents(window, response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(config: &Config) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let client = Client::new();

        let actor = Self {
            calendar_id: config.google_calendar_id.clone(),
            api_base: CALENDAR_API_BASE.to_string(),
            token_manager: TokenManager::new(
                config.credentials_path.clone(),
                config.token_path.clone(),
                client.clone(),
            ),
            client,
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Point the actor at a different API root
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::CreateEvent(event, response_tx) => {
                    let result = self.create_event(event).await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::ListEvents(window, response_tx) => {
                    let result = self.list_events(window).await;
                    let _ = response_tx.send(result);
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    /// `{api_base}/calendars/{calendar_id}/events`
    fn events_url(&self) -> BotResult<Url> {
        let mut url = Url::parse(&format!("{}/calendars", self.api_base))
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API base cannot be a base URL"))?
            .push(&self.calendar_id)
            .push("events");

        Ok(url)
    }

    /// Insert an event into the calendar
    async fn create_event(&mut self, event: NewEvent) -> BotResult<CalendarEvent> {
        let access_token = self.token_manager.access_token().await?;

        let mut url = self.events_url()?;
        // Email invitations only go out when someone is invited
        let send_updates = if event.invitee.is_some() { "all" } else { "none" };
        url.query_pairs_mut().append_pair("sendUpdates", send_updates);

        debug!("Creating calendar event '{}'", event.title);
        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&event.to_request_body())
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        let body = self.read_json(response, "create event").await?;
        let created = CalendarEvent::from_api(&body);
        info!("Created calendar event {}", created.id);

        Ok(created)
    }

    /// List events starting within the window
    async fn list_events(&mut self, window: TimeWindow) -> BotResult<Vec<CalendarEvent>> {
        let access_token = self.token_manager.access_token().await?;

        let mut url = self.events_url()?;
        url.query_pairs_mut()
            .append_pair(
                "timeMin",
                &window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .append_pair(
                "timeMax",
                &window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        let body = self.read_json(response, "fetch events").await?;

        // Parse events from response
        let items = body
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| google_calendar_error("No items in response"))?;

        Ok(items.iter().map(CalendarEvent::from_api).collect())
    }

    async fn read_json(
        &mut self,
        response: Response,
        action: &str,
    ) -> BotResult<serde_json::Value> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // The token file may have been replaced or revoked
            self.token_manager.invalidate();
            return Err(auth_error(&format!(
                "Google rejected the access token while trying to {}",
                action
            )));
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response: {}", e)))
    }
}

use async_trait::async_trait;
use calbot::commands::{get_all_application_commands, CommandContext};
use calbot::components::google_calendar::GoogleCalendar;
use calbot::components::user_registry::UserRegistry;
use calbot::components::{Component, ComponentManager};
use calbot::config::Config;
use calbot::error::{component_error, BotResult};
use poise::serenity_prelude::UserId;
use std::any::Any;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::sync::RwLock;

fn config_in(dir: &Path) -> Config {
    let user_data = dir.join("user_data.json");
    let token = dir.join("token.json");
    Config::from_lookup(|key| match key {
        "DISCORD_TOKEN" => Some("discord".to_string()),
        "USER_DATA_FILE" => Some(user_data.display().to_string()),
        "GOOGLE_TOKEN_FILE" => Some(token.display().to_string()),
        _ => None,
    })
    .unwrap()
}

/// Records the order components are started in
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
}

#[async_trait]
impl Component for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn init(&self, _config: Arc<RwLock<Config>>) -> BotResult<()> {
        self.log.lock().unwrap().push(self.name);
        if self.fail {
            return Err(component_error("boom"));
        }
        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_config_defaults() {
    let config = Config::from_lookup(|key| (key == "DISCORD_TOKEN").then(|| "t".to_string())).unwrap();

    assert_eq!(config.google_calendar_id, "primary");
    assert_eq!(config.timezone, "America/Los_Angeles");
    assert_eq!(config.event_duration_minutes, 60);
    assert!(config.guild_id.is_none());
    assert!(config.is_component_enabled("google_calendar"));
    assert!(config.is_component_enabled("user_registry"));
}

#[test]
fn test_application_commands() {
    let names: Vec<String> = get_all_application_commands()
        .into_iter()
        .map(|command| command.name)
        .collect();
    assert_eq!(names, ["register", "create_event", "sync"]);
}

#[tokio::test]
async fn test_components_init_in_order_and_skip_disabled() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path());
    config
        .merge_components("first = true\nsecond = false\nthird = true\n")
        .unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut manager = ComponentManager::new(Arc::new(RwLock::new(config)));
    for (name, fail) in [("first", true), ("second", false), ("third", false)] {
        manager.register(Recorder {
            name,
            log: Arc::clone(&log),
            fail,
        });
    }

    // A failing component does not stop the rest
    manager.init_all().await.unwrap();
    assert_eq!(*log.lock().unwrap(), ["first", "third"]);

    assert!(manager.get_component::<Recorder>("third").is_some());
    assert!(manager.get_component::<UserRegistry>("third").is_none());
    assert!(manager.get_component_by_name("missing").is_none());
    manager.shutdown_all().await.unwrap();
}

#[tokio::test]
async fn test_command_context_reaches_components() {
    let dir = tempdir().unwrap();
    let config = Arc::new(RwLock::new(config_in(dir.path())));

    let mut manager = ComponentManager::new(Arc::clone(&config));
    manager.register(UserRegistry::new());
    manager.register(GoogleCalendar::new());
    manager.init_all().await.unwrap();

    let data = CommandContext::new(config).with_component_manager(Arc::new(manager));
    assert!(data.calendar().await.is_ok());

    let registry = data.registry().await.unwrap();
    registry.register(99, "carol@example.com", "carol").await.unwrap();
    assert_eq!(
        data.invitee_for(UserId::new(99)).await.as_deref(),
        Some("carol@example.com")
    );
    assert_eq!(data.invitee_for(UserId::new(100)).await, None);
}

#[tokio::test]
async fn test_command_context_without_components() {
    let dir = tempdir().unwrap();
    let data = CommandContext::new(Arc::new(RwLock::new(config_in(dir.path()))));

    assert!(data.calendar().await.is_err());
    assert!(data.registry().await.is_err());
    assert_eq!(data.invitee_for(UserId::new(1)).await, None);
}

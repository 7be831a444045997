mod actor;
pub mod models;

pub use actor::{UserRegistryActor, UserRegistryHandle};
pub use models::{is_valid_email, RegisteredUser};

use crate::config::Config;
use crate::error::BotResult;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

impl UserRegistryHandle {
    /// Open the registry file and spawn its actor
    pub async fn spawn(path: PathBuf) -> BotResult<Self> {
        let (mut actor, handle) = UserRegistryActor::open(path).await?;
        tokio::spawn(async move {
            actor.run().await;
        });
        Ok(handle)
    }
}

/// Registered emails, used as invitees on created events
#[derive(Default)]
pub struct UserRegistry {
    handle: RwLock<Option<UserRegistryHandle>>,
}

impl UserRegistry {
    /// Create a new user registry component
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<UserRegistryHandle> {
        self.handle.read().await.clone()
    }
}

#[async_trait]
impl super::Component for UserRegistry {
    fn name(&self) -> &'static str {
        "user_registry"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> BotResult<()> {
        let path = config.read().await.user_data_path.clone();

        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            *handle_lock = Some(UserRegistryHandle::spawn(path).await?);
        }

        Ok(())
    }

    async fn shutdown(&self) -> BotResult<()> {
        if let Some(handle) = &*self.handle.read().await {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

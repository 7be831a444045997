use super::models::RegisteredUser;
use crate::error::{registry_error, BotResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// The user registry actor, sole owner of the user map
pub struct UserRegistryActor {
    path: PathBuf,
    users: BTreeMap<String, RegisteredUser>,
    command_rx: mpsc::Receiver<UserRegistryCommand>,
}

/// Commands that can be sent to the user registry actor
pub enum UserRegistryCommand {
    Register(
        String,
        RegisteredUser,
        oneshot::Sender<BotResult<Option<RegisteredUser>>>,
    ),
    Lookup(String, oneshot::Sender<Option<RegisteredUser>>),
    Shutdown,
}

/// Handle for communicating with the user registry actor
#[derive(Clone)]
pub struct UserRegistryHandle {
    command_tx: mpsc::Sender<UserRegistryCommand>,
}

impl UserRegistryHandle {
    /// Register or replace the email for a Discord user, returning the previous entry
    pub async fn register(
        &self,
        user_id: u64,
        email: &str,
        username: &str,
    ) -> BotResult<Option<RegisteredUser>> {
        let user = RegisteredUser {
            email: email.to_string(),
            username: username.to_string(),
        };

        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(UserRegistryCommand::Register(
                user_id.to_string(),
                user,
                response_tx,
            ))
            .await
            .map_err(|e| registry_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| registry_error("Response channel closed"))?
    }

    /// Registered entry for a Discord user
    pub async fn lookup(&self, user_id: u64) -> BotResult<Option<RegisteredUser>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(UserRegistryCommand::Lookup(user_id.to_string(), response_tx))
            .await
            .map_err(|e| registry_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| registry_error("Response channel closed"))
    }

    /// Registered email for a Discord user
    pub async fn email_for(&self, user_id: u64) -> BotResult<Option<String>> {
        Ok(self.lookup(user_id).await?.map(|user| user.email))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(UserRegistryCommand::Shutdown).await;
        Ok(())
    }
}

impl UserRegistryActor {
    /// Load the registry file and return the actor with its handle
    pub async fn open(path: PathBuf) -> BotResult<(Self, UserRegistryHandle)> {
        let users = Self::load(&path).await?;
        info!("Loaded {} registered users from {}", users.len(), path.display());

        let (command_tx, command_rx) = mpsc::channel(32);
        let actor = Self {
            path,
            users,
            command_rx,
        };

        Ok((actor, UserRegistryHandle { command_tx }))
    }

    async fn load(path: &Path) -> BotResult<BTreeMap<String, RegisteredUser>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                registry_error(&format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("User registry actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                UserRegistryCommand::Register(user_id, user, response_tx) => {
                    let result = self.register(user_id, user).await;
                    let _ = response_tx.send(result);
                }
                UserRegistryCommand::Lookup(user_id, response_tx) => {
                    let _ = response_tx.send(self.users.get(&user_id).cloned());
                }
                UserRegistryCommand::Shutdown => {
                    info!("User registry actor shutting down");
                    break;
                }
            }
        }

        info!("User registry actor shut down");
    }

    async fn register(
        &mut self,
        user_id: String,
        user: RegisteredUser,
    ) -> BotResult<Option<RegisteredUser>> {
        debug!("Registering email for user {}", user_id);
        let previous = self.users.insert(user_id.clone(), user);

        // Memory must match the file: undo the change when the write fails
        if let Err(e) = self.save().await {
            match &previous {
                Some(previous) => {
                    self.users.insert(user_id, previous.clone());
                }
                None => {
                    self.users.remove(&user_id);
                }
            }
            return Err(e);
        }

        Ok(previous)
    }

    async fn save(&self) -> BotResult<()> {
        let content = serde_json::to_string_pretty(&self.users)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

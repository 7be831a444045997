use crate::error::{auth_error, BotResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// OAuth scope for reading and writing calendar events
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Seconds before expiry at which a token is treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// OAuth client from `credentials.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Parse the JSON downloaded from the Google Cloud console
    pub fn from_json(content: &str) -> BotResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)
            .map_err(|e| auth_error(&format!("Failed to parse client secret: {}", e)))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| auth_error("Client secret has no 'installed' or 'web' section"))
    }

    /// Read the client secret file
    pub async fn from_file(path: &Path) -> BotResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            auth_error(&format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Consent screen URL for the installed-app flow
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> BotResult<Url> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", CALENDAR_SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| auth_error(&format!("Invalid auth URI: {}", e)))
    }
}

/// Token as returned by the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    token_type: Option<String>,
}

/// Cached OAuth token persisted in the token file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp
    pub expires_at: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl StoredToken {
    /// Whether the access token is expired or about to expire
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }

    fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token,
            // Google omits the refresh token on refresh responses
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + response.expires_in.unwrap_or(3600),
            scope: response.scope,
            token_type: response.token_type,
        }
    }

    /// Read a token from disk, `None` if the file does not exist
    pub async fn load(path: &Path) -> BotResult<Option<Self>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let token = serde_json::from_str(&content).map_err(|e| {
                    auth_error(&format!("Failed to parse {}: {}", path.display(), e))
                })?;
                Ok(Some(token))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the token to disk
    pub async fn save(&self, path: &Path) -> BotResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> BotResult<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to reach token endpoint: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!(
            "Token request failed: HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))
}

/// Exchange an authorization code from the consent redirect for a token
pub async fn exchange_code(
    client: &Client,
    secret: &ClientSecret,
    code: &str,
    redirect_uri: &str,
) -> BotResult<StoredToken> {
    let response = request_token(
        client,
        &secret.token_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await?;

    Ok(StoredToken::from_response(response, None))
}

/// Supplies valid access tokens from the token file, refreshing as needed
pub struct TokenManager {
    credentials_path: PathBuf,
    token_path: PathBuf,
    client: Client,
    cached: Option<StoredToken>,
}

impl TokenManager {
    pub fn new(credentials_path: PathBuf, token_path: PathBuf, client: Client) -> Self {
        Self {
            credentials_path,
            token_path,
            client,
            cached: None,
        }
    }

    /// Get a non-expired access token
    pub async fn access_token(&mut self) -> BotResult<String> {
        let token = match self.cached.take() {
            Some(token) => token,
            None => StoredToken::load(&self.token_path).await?.ok_or_else(|| {
                auth_error(&format!(
                    "No token found at {}",
                    self.token_path.display()
                ))
            })?,
        };

        let token = if token.is_expired(Utc::now().timestamp()) {
            self.refresh(token).await?
        } else {
            token
        };

        let access_token = token.access_token.clone();
        self.cached = Some(token);
        Ok(access_token)
    }

    /// Drop the in-memory token so the next call re-reads the token file
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    async fn refresh(&self, token: StoredToken) -> BotResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .ok_or_else(|| auth_error("Token expired and has no refresh token"))?;

        debug!("Refreshing Google access token");
        let secret = ClientSecret::from_file(&self.credentials_path).await?;

        let response = request_token(
            &self.client,
            &secret.token_uri,
            &[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        let refreshed = StoredToken::from_response(response, Some(refresh_token));
        refreshed.save(&self.token_path).await?;
        info!("Google access token refreshed");

        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_secret_installed() {
        let secret = ClientSecret::from_json(
            r#"{"installed":{"client_id":"id","client_secret":"shh","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();
        assert_eq!(secret.client_id, "id");
        assert_eq!(secret.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(secret.redirect_uris.len(), 1);
    }

    #[test]
    fn test_client_secret_web_and_missing() {
        let secret = ClientSecret::from_json(
            r#"{"web":{"client_id":"w","client_secret":"s","token_uri":"http://t"}}"#,
        )
        .unwrap();
        assert_eq!(secret.token_uri, "http://t");

        assert!(ClientSecret::from_json(r#"{"other":{}}"#).is_err());
        assert!(ClientSecret::from_json("not json").is_err());
    }

    #[test]
    fn test_authorization_url() {
        let secret = ClientSecret::from_json(r#"{"installed":{"client_id":"id","client_secret":"s"}}"#)
            .unwrap();
        let url = secret
            .authorization_url("http://127.0.0.1:8080", "xyz")
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("scope".to_string(), CALENDAR_SCOPE.to_string())));
        assert!(pairs.contains(&("state".to_string(), "xyz".to_string())));
        assert!(pairs.contains(&("access_type".to_string(), "offline".to_string())));
    }

    #[test]
    fn test_is_expired() {
        let token = StoredToken {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: 1_000,
            scope: None,
            token_type: None,
        };
        assert!(!token.is_expired(900));
        assert!(token.is_expired(940));
        assert!(token.is_expired(2_000));
    }
}

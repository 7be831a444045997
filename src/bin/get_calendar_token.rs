use calbot::components::google_calendar::token::{exchange_code, ClientSecret};
use calbot::config::Config;
use calbot::error::{auth_error, other_error, BotResult};
use tiny_http::{Request, Response, Server, StatusCode};
use url::Url;

/// Query parameters Google appends to the loopback redirect
struct Callback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl Callback {
    fn from_request(request: &Request) -> BotResult<Self> {
        let url = Url::parse(&format!("http://127.0.0.1{}", request.url()))
            .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

        let mut callback = Self {
            code: None,
            state: None,
            error: None,
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => callback.code = Some(value.into_owned()),
                "state" => callback.state = Some(value.into_owned()),
                "error" => callback.error = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(callback)
    }
}

/// Block until the browser hits the redirect with a code or an error
fn wait_for_callback(server: &Server) -> BotResult<(Request, Callback)> {
    loop {
        let request = server.recv()?;
        let callback = Callback::from_request(&request)?;
        if callback.code.is_some() || callback.error.is_some() {
            return Ok((request, callback));
        }
        // Browsers also ask for /favicon.ico and the like
        let _ = request.respond(Response::from_string("Waiting for authorization...").with_status_code(StatusCode(404)));
    }
}

#[tokio::main]
async fn main() -> BotResult<()> {
    let (credentials_path, token_path) = Config::load_auth_paths();
    let secret = ClientSecret::from_file(&credentials_path).await?;

    // Loopback redirect on any free port
    let server = Server::http("127.0.0.1:0")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .ok_or_else(|| other_error("Callback server is not listening on an IP address"))?;
    let redirect_uri = format!("http://127.0.0.1:{}", port);

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = secret.authorization_url(&redirect_uri, &state)?;

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser. Visit this URL to continue:\n{}", auth_url);
    }

    println!("Waiting for authorization callback on {}...", redirect_uri);
    let (request, callback) = tokio::task::spawn_blocking(move || wait_for_callback(&server))
        .await
        .map_err(|e| other_error(&format!("Callback task failed: {}", e)))??;

    if let Some(error) = callback.error {
        let _ = request.respond(Response::from_string("Authorization was denied."));
        return Err(auth_error(&format!("Authorization denied: {}", error)));
    }
    if callback.state.as_deref() != Some(state.as_str()) {
        let _ = request.respond(Response::from_string("State mismatch, please try again."));
        return Err(auth_error("State mismatch in authorization callback"));
    }
    let code = callback
        .code
        .ok_or_else(|| auth_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let token = exchange_code(&client, &secret, &code, &redirect_uri).await?;
    if token.refresh_token.is_none() {
        println!("Warning: no refresh token returned, the bot will need a new token when this one expires");
    }
    token.save(&token_path).await?;

    // Send success response to browser
    request.respond(Response::from_string(
        "Authorization successful! You can close this window.",
    ))?;

    println!("Token saved to {}", token_path.display());

    Ok(())
}

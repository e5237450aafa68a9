//! Minimal host application for Steam sign-in.
//!
//! Redirects to Steam, verifies the callback and shows the resulting SteamID.
//! There are no sessions here; a real application would store the SteamID
//! once `verify_login` succeeds.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use ras_identity_steam::{SteamAuthError, SteamSignIn, SteamSignInConfig};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CALLBACK_ROUTE: &str = "/auth/steam/callback";

/// Configuration for the Steam sign-in demo
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Externally visible base URL; also used as the OpenID realm
    pub public_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub http_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let server_port = std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid port number")?;

        Ok(Self {
            public_url: std::env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            http_timeout_seconds: std::env::var("STEAM_HTTP_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("STEAM_HTTP_TIMEOUT must be a number of seconds")?,
        })
    }

    fn return_url(&self) -> String {
        format!("{}{}", self.public_url.trim_end_matches('/'), CALLBACK_ROUTE)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sign_in: Arc<SteamSignIn>,
    pub return_url: String,
}

async fn index_handler() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head><title>Steam Sign-In</title></head>
<body>
    <a href="/auth/steam">Sign in through Steam</a>
</body>
</html>
    "#,
    )
}

async fn start_login_handler(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.sign_in.auth_url(&state.return_url))
}

async fn callback_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    match state.sign_in.verify_login(&uri.to_string()).await {
        Ok(steam_id) => {
            info!(steam_id = %steam_id, "User signed in");
            Html(format!(
                r#"
<!DOCTYPE html>
<html>
<head><title>Signed In</title></head>
<body>
    <p>Your SteamID is: <b>{}</b></p>
    <p>steam2: {} / steam3: {}</p>
    <a href="/">Back</a>
</body>
</html>
                "#,
                steam_id,
                steam_id.steam2(false).unwrap_or_default(),
                steam_id.steam3()
            ))
            .into_response()
        }
        Err(e) => {
            warn!("Steam sign-in failed: {}", e);
            (error_status(&e), format!("Sign-in failed: {}", e)).into_response()
        }
    }
}

fn error_status(error: &SteamAuthError) -> StatusCode {
    match error {
        SteamAuthError::RemoteHttpError(_) | SteamAuthError::NetworkError(_) => {
            StatusCode::BAD_GATEWAY
        }
        SteamAuthError::InvalidCallbackUrl(_) | SteamAuthError::Config(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::UNAUTHORIZED,
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/auth/steam", get(start_login_handler))
        .route(CALLBACK_ROUTE, get(callback_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steam_signin_server=info,ras_identity_steam=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let steam_config = SteamSignInConfig::new().with_http_timeout(config.http_timeout_seconds);
    let sign_in = SteamSignIn::with_config(&config.public_url, steam_config)
        .context("PUBLIC_URL is not a valid realm")?;
    info!("Steam sign-in realm: {}", sign_in.realm());

    let app = create_router(AppState {
        sign_in: Arc::new(sign_in),
        return_url: config.return_url(),
    });

    let bind_addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

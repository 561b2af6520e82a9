//! HTTP surface for Focus Buddy.
//!
//! Every response uses the `{success, data | error}` envelope. Routes:
//!
//! - `GET  /api/motivational-tip`
//! - `POST /api/verify-payment`
//! - `GET|POST /api/paystack-webhook`
//! - `GET|POST /api/rewards`
//! - `POST /api/sessions`
//! - `GET  /api/health`

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    routing::{get, post},
    Router,
};
use focusbuddy_core::billing::SIGNATURE_HEADER;
use focusbuddy_core::Config;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod routes;
pub mod state;

use error::ServerError;
use routes::*;
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(SIGNATURE_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/api/motivational-tip",
            get(motivational_tip_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/verify-payment",
            post(verify_payment_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/paystack-webhook",
            post(webhook_handler)
                .get(webhook_status_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/rewards",
            get(list_rewards_handler)
                .post(save_reward_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/sessions",
            post(save_session_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/health",
            get(health_handler).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind to `[server]` from the config and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    let address = config.server.addr();
    info!("Initializing state...");
    let state = AppState::new(config)?;
    if state.config.billing.webhook_secret.is_none() {
        warn!("no webhook secret configured; webhook deliveries will be rejected");
    }

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

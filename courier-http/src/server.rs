//! The courier HTTP server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use courier_common::{Signal, status::StatusRecord};
use courier_delivery::{DeliveryError, DeliveryOrchestrator, Message};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{HttpConfig, HttpError};

/// The HTTP boundary over a [`DeliveryOrchestrator`].
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    /// Create a new server bound to the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the specified address fails.
    pub async fn new(
        config: HttpConfig,
        orchestrator: Arc<DeliveryOrchestrator>,
    ) -> Result<Self, HttpError> {
        let listener =
            TcpListener::bind(&config.listen_address)
                .await
                .map_err(|e| HttpError::Bind {
                    address: config.listen_address.clone(),
                    source: e,
                })?;

        tracing::info!(
            address = %config.listen_address,
            "HTTP server bound successfully"
        );

        let router = Router::new()
            .route("/api/messages/send", post(send_handler))
            .route("/api/messages/status-log", get(status_log_handler))
            .with_state(orchestrator)
            .layer(TraceLayer::new_for_http());

        Ok(Self { listener, router })
    }

    /// Run the server until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a runtime error.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), HttpError> {
        tracing::info!("HTTP server starting");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await
            .map_err(|e| HttpError::Server(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ApiResponse {
    status: &'static str,
    message: String,
}

/// Submit handler.
///
/// Responds once the delivery attempt has actually completed: `200` on a
/// successful send, `409` for duplicates, `500` for rate-limit,
/// circuit-open, or exhausted-retries failures.
async fn send_handler(
    State(orchestrator): State<Arc<DeliveryOrchestrator>>,
    Json(message): Json<Message>,
) -> Response {
    match orchestrator.submit(message).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                status: "success",
                message: "Email sent successfully.".to_string(),
            }),
        )
            .into_response(),
        Err(DeliveryError::Duplicate) => (
            StatusCode::CONFLICT,
            Json(ApiResponse {
                status: "duplicate",
                message: "Email is a duplicate.".to_string(),
            }),
        )
            .into_response(),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse {
                status: "error",
                message: error.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Status-log handler: the full ordered audit log as plain data.
async fn status_log_handler(
    State(orchestrator): State<Arc<DeliveryOrchestrator>>,
) -> Json<Vec<StatusRecord>> {
    Json(orchestrator.status_log())
}

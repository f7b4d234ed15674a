//! HTTP/WebSocket-Listener – nimmt Verbindungen am festen Pfad `/ws` an
//!
//! Der `SignalingListener` bindet den HTTP-Socket der Anwendung und startet
//! fuer jede Upgrade-Anfrage einen eigenen Verbindungs-Task. Kein Retry,
//! keine Backpressure – Verbindungen sind voneinander unabhaengig.

use agricall_directory::VerzeichnisRepository;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::SignalingResult;
use crate::server_state::SignalingState;
use crate::verbindung::ClientVerbindung;

/// Erstellt den Router mit Signaling- und Health-Routen
pub fn signaling_router<V: VerzeichnisRepository + 'static>() -> Router<Arc<SignalingState<V>>> {
    Router::new()
        .route("/ws", get(ws_handler::<V>))
        .route("/health", get(health_handler))
}

/// Upgrade-Handler: hebt die HTTP-Anfrage auf WebSocket und startet den
/// Verbindungs-Task
async fn ws_handler<V: VerzeichnisRepository + 'static>(
    State(state): State<Arc<SignalingState<V>>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ClientVerbindung::neu(state).verarbeiten(socket))
}

/// Liveness-Endpunkt
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// HTTP-Listener des Signaling-Service
///
/// Bindet den Socket und bedient `/ws` sowie `/health`. Nur ein
/// Bind-Fehler ist fatal; alles danach wird pro Verbindung behandelt.
pub struct SignalingListener<V: VerzeichnisRepository + 'static> {
    state: Arc<SignalingState<V>>,
    bind_addr: SocketAddr,
}

impl<V: VerzeichnisRepository + 'static> SignalingListener<V> {
    /// Erstellt einen neuen SignalingListener
    pub fn neu(state: Arc<SignalingState<V>>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Bindet den Socket und bedient Anfragen bis zum Shutdown-Signal
    pub async fn starten(self) -> SignalingResult<()> {
        let app = signaling_router()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state);

        let listener = TcpListener::bind(self.bind_addr).await?;
        let lokale_addr = listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "Signaling-Listener gestartet (/ws)");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Signaling-Listener gestoppt");
        Ok(())
    }

    /// Gibt die Bind-Adresse zurueck
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Wartet auf Ctrl-C
async fn shutdown_signal() {
    if let Err(fehler) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %fehler, "Shutdown-Signal konnte nicht installiert werden");
    }
}

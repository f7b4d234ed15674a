//! Client-Verbindung – verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede akzeptierte Verbindung bekommt eine `ClientVerbindung` in einem
//! eigenen tokio-Task plus einen Sende-Task der die Send-Queue auf den
//! Socket schreibt.
//!
//! ## State Machine
//! ```text
//! Unauthentifiziert -> Identifiziert -> Geschlossen
//! ```
//! Der Zustand steckt im `VerbindungsKontext` (`user_id: Option<UserId>`).
//! Negotiation-Nachrichten werden auch unauthentifiziert verarbeitet, da
//! das Routing ueber die Ziel-Identitaet laeuft.

use agricall_directory::VerzeichnisRepository;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

use crate::presence::ClientHandle;
use crate::relay::{SignalRelay, VerbindungsKontext};
use crate::server_state::SignalingState;

/// Verarbeitet eine einzelne WebSocket-Verbindung
///
/// Liest Text-Frames, reicht sie ans `SignalRelay` durch und traegt die
/// Identitaet beim Verbindungsende wieder aus. Verbindungen sind
/// unabhaengig: das Scheitern einer Verbindung beruehrt keine andere.
pub struct ClientVerbindung<V: VerzeichnisRepository + 'static> {
    state: Arc<SignalingState<V>>,
}

impl<V: VerzeichnisRepository + 'static> ClientVerbindung<V> {
    /// Erstellt eine neue ClientVerbindung
    pub fn neu(state: Arc<SignalingState<V>>) -> Self {
        Self { state }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client die Verbindung schliesst oder ein
    /// Transport-Fehler auftritt.
    pub async fn verarbeiten(self, socket: WebSocket) {
        let verbindungs_id = Uuid::new_v4();
        tracing::debug!(verbindung = %verbindungs_id, "Neue WebSocket-Verbindung");

        let (mut sink, mut stream) = socket.split();
        let (handle, mut sende_rx) = ClientHandle::neu(verbindungs_id);

        // Sende-Task: Queue -> Socket. Sendefehler beenden nur diesen Task;
        // die Leseschleife laeuft bis zum Close-Frame weiter.
        let sende_task = tokio::spawn(async move {
            while let Some(ausgehend) = sende_rx.recv().await {
                if sink
                    .send(Message::Text(ausgehend.als_json()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        let relay = SignalRelay::neu(Arc::clone(&self.state));
        let mut ctx = VerbindungsKontext::neu(verbindungs_id, handle);

        // Leseschleife: Nachrichten einer Verbindung werden strikt in
        // Empfangsreihenfolge verarbeitet
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    relay.verarbeiten(&text, &mut ctx).await;
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(verbindung = %verbindungs_id, "Close-Frame empfangen");
                    break;
                }
                // Ping/Pong beantwortet axum selbst, Binary ist nicht Teil
                // des Protokolls
                Ok(_) => {}
                Err(fehler) => {
                    tracing::warn!(
                        verbindung = %verbindungs_id,
                        fehler = %fehler,
                        "WebSocket-Lesefehler – Verbindung wird geschlossen"
                    );
                    break;
                }
            }
        }

        // Cleanup: Bindung nur loesen wenn sie noch dieser Verbindung gehoert
        relay.verbindung_schliessen(&ctx);
        sende_task.abort();

        tracing::debug!(verbindung = %verbindungs_id, "Verbindungs-Task beendet");
    }
}

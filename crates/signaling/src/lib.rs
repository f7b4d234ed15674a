//! agricall-signaling – WebSocket Signaling- und Presence-Relay
//!
//! Dieser Crate implementiert den Signaling-Service fuer AgriCall. Er nimmt
//! WebSocket-Verbindungen an, bindet Identitaeten an Verbindungen und routet
//! WebRTC-Negotiation, Call-Status und Chat zwischen Farmer und Spezialist.
//!
//! ## Architektur
//!
//! ```text
//! HTTP Listener (SignalingListener, /ws)
//!     |
//!     v
//! ClientVerbindung (pro Verbindung ein Task + Sende-Task)
//!     |  State Machine: Unauthentifiziert -> Identifiziert -> Geschlossen
//!     |
//!     v
//! SignalRelay
//!     |
//!     +-- auth                 (Identitaets-Claim -> PresenceRegistry)
//!     +-- offer/answer/ice     (zustandslose Weiterleitung an das Ziel)
//!     +-- call-status-update   (Verzeichnis-Update + Fan-out an beide)
//!     +-- chat-message         (persistieren + Zustellung an den anderen)
//!
//! PresenceRegistry   – Identitaet -> lebendiges Verbindungs-Handle
//! VerzeichnisRepository – Calls, Benutzer, Nachrichten (externer Kollaborateur)
//! ```
//!
//! Zustellung ist durchgehend best-effort: kein Queuing, keine Retries,
//! keine Fehler-Rueckmeldung an den Absender.

pub mod error;
pub mod presence;
pub mod relay;
pub mod server_state;
pub mod verbindung;
pub mod ws;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{SignalingError, SignalingResult};
pub use presence::{ClientHandle, PresenceRegistry};
pub use relay::{SignalRelay, VerbindungsKontext};
pub use server_state::SignalingState;
pub use verbindung::ClientVerbindung;
pub use ws::SignalingListener;

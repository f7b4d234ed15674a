//! Repository-Trait des Call-Verzeichnisses
//!
//! Das Relay haengt nur an diesem Trait, nicht an der konkreten
//! Implementierung. "Nicht gefunden" ist kein Fehler sondern `Ok(None)` –
//! das Relay behandelt fehlende Ziele als stilles No-op.

use agricall_core::types::{CallId, CallStatus, UserId};
use async_trait::async_trait;

use crate::error::VerzeichnisResult;
use crate::models::{
    BenutzerRecord, CallRecord, NachrichtRecord, NeueNachricht, NeuerBenutzer, NeuerCall,
};

/// Zugriff auf Benutzer, Calls und Chat-Nachrichten
///
/// `async_trait` damit die Futures `Send` sind – die Verbindungs-Tasks
/// laufen auf dem multi-threaded tokio-Executor.
#[async_trait]
pub trait VerzeichnisRepository: Send + Sync {
    // --- Benutzer ---

    /// Einen Benutzer anhand seiner ID laden
    async fn benutzer_laden(&self, id: UserId) -> VerzeichnisResult<Option<BenutzerRecord>>;

    /// Einen neuen Benutzer anlegen
    async fn benutzer_erstellen(&self, neu: NeuerBenutzer<'_>)
        -> VerzeichnisResult<BenutzerRecord>;

    // --- Calls ---

    /// Einen Call anhand seiner ID laden
    async fn call_laden(&self, id: CallId) -> VerzeichnisResult<Option<CallRecord>>;

    /// Einen neuen Call anlegen (normalerweise von der REST-Seite)
    async fn call_erstellen(&self, neu: NeuerCall<'_>) -> VerzeichnisResult<CallRecord>;

    /// Den Status eines Calls setzen
    ///
    /// Gibt den aktualisierten Datensatz zurueck, `None` wenn der Call
    /// nicht existiert.
    async fn call_status_setzen(
        &self,
        id: CallId,
        status: CallStatus,
    ) -> VerzeichnisResult<Option<CallRecord>>;

    // --- Chat-Nachrichten ---

    /// Eine neue Chat-Nachricht ablegen
    async fn nachricht_erstellen(
        &self,
        neu: NeueNachricht<'_>,
    ) -> VerzeichnisResult<NachrichtRecord>;

    /// Alle Nachrichten eines Calls in Empfangsreihenfolge laden
    async fn nachrichten_nach_call(
        &self,
        call_id: CallId,
    ) -> VerzeichnisResult<Vec<NachrichtRecord>>;
}

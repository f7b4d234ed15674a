//! Datensaetze des Call-Verzeichnisses
//!
//! Diese Typen repraesentieren gespeicherte Eintraege. Sie sind von den
//! Wire-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use agricall_core::types::{CallId, CallStatus, Rolle, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus dem Verzeichnis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub rolle: Rolle,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    /// Bewertung mal 10 gespeichert (45 = 4.5 Sterne)
    pub rating: i32,
    pub total_calls: i32,
}

/// Daten zum Anlegen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub username: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
    pub rolle: Rolle,
    pub specialization: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Call-Datensatz: eine geplante Beratung zwischen Farmer und Spezialist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: CallId,
    pub farmer_id: UserId,
    pub specialist_id: UserId,
    pub scheduled_time: DateTime<Utc>,
    /// Geplante Dauer in Minuten
    pub dauer_minuten: i32,
    pub status: CallStatus,
    pub topic: Option<String>,
    pub notes: Option<String>,
}

/// Daten zum Anlegen eines neuen Calls
#[derive(Debug, Clone)]
pub struct NeuerCall<'a> {
    pub farmer_id: UserId,
    pub specialist_id: UserId,
    pub scheduled_time: DateTime<Utc>,
    pub dauer_minuten: i32,
    pub status: CallStatus,
    pub topic: Option<&'a str>,
    pub notes: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Chat-Nachrichten
// ---------------------------------------------------------------------------

/// Gespeicherte Chat-Nachricht eines Calls; nach dem Anlegen unveraenderlich
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NachrichtRecord {
    pub id: i64,
    pub call_id: CallId,
    pub sender_id: UserId,
    pub content: String,
    /// Vom Relay beim Empfang vergeben, nie vom Client geliefert
    pub timestamp: DateTime<Utc>,
}

/// Daten zum Anlegen einer neuen Chat-Nachricht
#[derive(Debug, Clone)]
pub struct NeueNachricht<'a> {
    pub call_id: CallId,
    pub sender_id: UserId,
    pub content: &'a str,
    pub timestamp: DateTime<Utc>,
}

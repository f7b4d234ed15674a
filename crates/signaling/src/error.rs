//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
///
/// Kein Fehler hier ist fatal fuer den Relay-Prozess; nur Bind-Fehler des
/// Listeners beenden den Start. Handler-Fehler werden pro Nachricht
/// geloggt, die Verbindung bleibt offen.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// IO-Fehler (Socket-Bind, Listener)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Fehler aus dem Call-Verzeichnis
    #[error("Verzeichnis-Fehler: {0}")]
    Verzeichnis(#[from] agricall_directory::VerzeichnisError),

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;

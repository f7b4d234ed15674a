//! Fehlertypen fuer das Verzeichnis-Crate

use thiserror::Error;

/// Verzeichnis-Fehlertypen
#[derive(Debug, Error)]
pub enum VerzeichnisError {
    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    #[error("Call nicht gefunden: {0}")]
    CallNichtGefunden(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Speicher-Fehler: {0}")]
    Speicher(String),
}

pub type VerzeichnisResult<T> = Result<T, VerzeichnisError>;

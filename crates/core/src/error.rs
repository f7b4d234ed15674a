//! Fehlertypen fuer AgriCall
//!
//! Zentraler Fehler-Enum der die crate-uebergreifenden Fehlerzustaende
//! abdeckt. Untermodule definieren eigene Fehler und konvertieren via
//! `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer AgriCall
pub type Result<T> = std::result::Result<T, AgriCallError>;

/// Crate-uebergreifende Fehler im AgriCall-System
#[derive(Debug, Error)]
pub enum AgriCallError {
    // --- Verbindung & Netzwerk ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    // --- Ressourcen ---
    #[error("Call nicht gefunden: {0}")]
    CallNichtGefunden(String),

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AgriCallError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = AgriCallError::CallNichtGefunden("call:9".into());
        assert_eq!(e.to_string(), "Call nicht gefunden: call:9");
    }

    #[test]
    fn intern_hilfsfunktion() {
        let e = AgriCallError::intern("kaputt");
        assert!(matches!(e, AgriCallError::Intern(_)));
    }
}

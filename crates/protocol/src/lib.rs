//! agricall-protocol – Signaling-Wire-Protokoll
//!
//! Definiert die JSON-Nachrichten die ueber die WebSocket-Verbindung
//! zwischen Browser-Client und Relay ausgetauscht werden.
//!
//! ## Design
//! - Diskriminator-Feld `type` (kebab-case), Felder in camelCase –
//!   kompatibel zum bestehenden Browser-Client
//! - Tagged Enums fuer typsichere Nachrichtentypen
//! - Keine Acknowledgments, keine Sequenznummern: Zustellung ist
//!   best-effort

pub mod signal;

// Bequeme Re-Exporte
pub use signal::{
    nachricht_parsen, NegotiationsArt, NegotiationsDaten, ParseErgebnis, ParseFehler,
    SignalAusgehend, SignalEingehend, WeitergeleiteteNegotiation,
};

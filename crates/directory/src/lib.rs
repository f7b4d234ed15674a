//! agricall-directory – Call-Verzeichnis
//!
//! Das Verzeichnis ist der dauerhafte Speicher fuer Benutzer, Calls und
//! Chat-Nachrichten. Das Signaling-Relay konsultiert und mutiert es, besitzt
//! es aber nicht: Calls werden von der REST-Seite angelegt, das Relay setzt
//! nur Status und legt Chat-Nachrichten ab.
//!
//! Das Repository-Pattern entkoppelt das Relay von der konkreten
//! Speicher-Implementierung. Enthalten ist die In-Memory-Variante
//! (`MemoryVerzeichnis`); eine SQL-Variante kann den Trait spaeter
//! zusaetzlich implementieren.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

// Bequeme Re-Exporte
pub use error::{VerzeichnisError, VerzeichnisResult};
pub use memory::MemoryVerzeichnis;
pub use models::{
    BenutzerRecord, CallRecord, NachrichtRecord, NeueNachricht, NeuerBenutzer, NeuerCall,
};
pub use repository::VerzeichnisRepository;

//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt das Call-Verzeichnis und die Presence-Registry als geteilte
//! Referenzen, die sicher zwischen tokio-Tasks geteilt werden koennen.
//! Die Registry ist die einzige geteilte veraenderliche Struktur des Kerns.

use agricall_directory::VerzeichnisRepository;
use std::sync::Arc;

use crate::presence::PresenceRegistry;

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState<V: VerzeichnisRepository + 'static> {
    /// Call-Verzeichnis (externer Kollaborateur: Calls, Benutzer, Chat)
    pub verzeichnis: Arc<V>,
    /// Presence-Registry (Identitaet -> Verbindungs-Handle)
    pub presence: PresenceRegistry,
}

impl<V: VerzeichnisRepository + 'static> SignalingState<V> {
    /// Erstellt einen neuen SignalingState
    pub fn neu(verzeichnis: Arc<V>) -> Arc<Self> {
        Arc::new(Self {
            verzeichnis,
            presence: PresenceRegistry::neu(),
        })
    }
}

//! Presence-Registry – Identitaet -> lebendiges Verbindungs-Handle
//!
//! Haelt den ephemeren Zustand aller identifizierten Verbindungen.
//! Invariante: hoechstens ein Handle pro Identitaet; eine Neuregistrierung
//! ersetzt die alte Bindung stillschweigend (letzte Verbindung gewinnt).
//!
//! `registrieren` und `austragen` sind Einzelschritt-Mutationen auf der
//! DashMap – kein Read-Modify-Write ueber mehrere Schritte. `austragen`
//! entfernt nur wenn die Verbindungs-ID noch uebereinstimmt, damit ein
//! verspaetetes Close-Event einer ersetzten Verbindung die frischere
//! Registrierung nicht verdraengt.

use agricall_core::types::UserId;
use agricall_protocol::SignalAusgehend;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Groesse der Send-Queue pro Client
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientHandle
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer lebenden WebSocket-Verbindung
///
/// Das Handle besitzt die Verbindung nicht; der Verbindungs-Task liest aus
/// der Queue und schreibt auf den Socket.
#[derive(Clone, Debug)]
pub struct ClientHandle {
    /// Eindeutige ID der Verbindungs-Instanz (nicht der Identitaet)
    pub verbindungs_id: Uuid,
    tx: mpsc::Sender<SignalAusgehend>,
}

impl ClientHandle {
    /// Erstellt ein neues Handle samt Empfangs-Queue
    ///
    /// Der Verbindungs-Task liest aus dem Receiver und sendet via WebSocket.
    pub fn neu(verbindungs_id: Uuid) -> (Self, mpsc::Receiver<SignalAusgehend>) {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        (Self { verbindungs_id, tx }, rx)
    }

    /// Prueft ob die Verbindung noch offen ist
    pub fn ist_offen(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Sendet eine Nachricht nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder die Verbindung
    /// geschlossen ist – die Nachricht wird dann verworfen (best-effort).
    pub fn senden(&self, nachricht: SignalAusgehend) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    verbindung = %self.verbindungs_id,
                    "Send-Queue voll – Nachricht verworfen"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    verbindung = %self.verbindungs_id,
                    "Send-Queue geschlossen (Client getrennt)"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PresenceRegistry
// ---------------------------------------------------------------------------

/// Registry aller identifizierten Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct PresenceRegistry {
    inner: Arc<PresenceRegistryInner>,
}

struct PresenceRegistryInner {
    /// Verbindungs-Handles, indiziert nach Identitaet
    clients: DashMap<UserId, ClientHandle>,
}

impl PresenceRegistry {
    /// Erstellt eine neue, leere Registry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(PresenceRegistryInner {
                clients: DashMap::new(),
            }),
        }
    }

    /// Bindet eine Identitaet an ein Verbindungs-Handle
    ///
    /// Ueberschreibt eine bestehende Bindung vorbehaltlos. Die ersetzte
    /// Verbindung wird nicht geschlossen, nur unroutbar.
    pub fn registrieren(&self, user_id: UserId, handle: ClientHandle) {
        let ersetzt = self.inner.clients.insert(user_id, handle).is_some();
        if ersetzt {
            tracing::info!(user_id = %user_id, "Identitaet neu gebunden (alte Verbindung ersetzt)");
        } else {
            tracing::info!(user_id = %user_id, "Identitaet verbunden");
        }
    }

    /// Loest die Bindung einer Identitaet, aber nur fuer die angegebene
    /// Verbindungs-Instanz
    ///
    /// No-op wenn die Identitaet inzwischen an eine andere Verbindung
    /// gebunden ist. Gibt `true` zurueck wenn ein Eintrag entfernt wurde.
    pub fn austragen(&self, user_id: &UserId, verbindungs_id: Uuid) -> bool {
        let entfernt = self
            .inner
            .clients
            .remove_if(user_id, |_, handle| handle.verbindungs_id == verbindungs_id)
            .is_some();

        if entfernt {
            tracing::info!(user_id = %user_id, "Identitaet getrennt");
        } else {
            tracing::debug!(
                user_id = %user_id,
                "Austragen uebersprungen – Identitaet gehoert einer neueren Verbindung"
            );
        }
        entfernt
    }

    /// Gibt das aktuelle Handle einer Identitaet zurueck
    pub fn nachschlagen(&self, user_id: &UserId) -> Option<ClientHandle> {
        self.inner.clients.get(user_id).map(|e| e.clone())
    }

    /// Sendet eine Nachricht an die Verbindung einer Identitaet
    ///
    /// Gibt `true` zurueck wenn ein offenes Handle gefunden und die
    /// Nachricht eingereiht wurde; sonst wird sie still verworfen.
    pub fn senden_an(&self, user_id: &UserId, nachricht: SignalAusgehend) -> bool {
        match self.inner.clients.get(user_id) {
            Some(handle) => handle.senden(nachricht),
            None => {
                tracing::trace!(user_id = %user_id, "Ziel nicht verbunden – Nachricht verworfen");
                false
            }
        }
    }

    /// Prueft ob eine Identitaet aktuell gebunden ist
    pub fn ist_verbunden(&self, user_id: &UserId) -> bool {
        self.inner.clients.contains_key(user_id)
    }

    /// Gibt die Anzahl der gebundenen Identitaeten zurueck
    pub fn online_anzahl(&self) -> usize {
        self.inner.clients.len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use agricall_core::types::{CallId, CallStatus};

    fn test_nachricht() -> SignalAusgehend {
        SignalAusgehend::CallStatusUpdate {
            call_id: CallId(1),
            status: CallStatus::Ongoing,
        }
    }

    #[test]
    fn registrieren_und_senden() {
        let registry = PresenceRegistry::neu();
        let (handle, mut rx) = ClientHandle::neu(Uuid::new_v4());

        registry.registrieren(UserId(1), handle);
        assert!(registry.ist_verbunden(&UserId(1)));
        assert_eq!(registry.online_anzahl(), 1);

        assert!(registry.senden_an(&UserId(1), test_nachricht()));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn senden_an_unbekannte_identitaet_ist_false() {
        let registry = PresenceRegistry::neu();
        assert!(!registry.senden_an(&UserId(42), test_nachricht()));
    }

    #[test]
    fn neuregistrierung_ersetzt_alte_bindung() {
        let registry = PresenceRegistry::neu();
        let (alt, mut alt_rx) = ClientHandle::neu(Uuid::new_v4());
        let (neu, mut neu_rx) = ClientHandle::neu(Uuid::new_v4());

        registry.registrieren(UserId(1), alt);
        registry.registrieren(UserId(1), neu);
        assert_eq!(registry.online_anzahl(), 1);

        registry.senden_an(&UserId(1), test_nachricht());
        assert!(alt_rx.try_recv().is_err(), "Alte Verbindung darf nichts empfangen");
        assert!(neu_rx.try_recv().is_ok());
    }

    #[test]
    fn austragen_nur_bei_passender_verbindung() {
        let registry = PresenceRegistry::neu();
        let alte_id = Uuid::new_v4();
        let (alt, _alt_rx) = ClientHandle::neu(alte_id);
        let (neu, mut neu_rx) = ClientHandle::neu(Uuid::new_v4());

        registry.registrieren(UserId(1), alt);
        registry.registrieren(UserId(1), neu);

        // Verspaetetes Close-Event der ersetzten Verbindung
        assert!(!registry.austragen(&UserId(1), alte_id));
        assert!(registry.ist_verbunden(&UserId(1)));

        // Die frische Bindung routet weiterhin
        assert!(registry.senden_an(&UserId(1), test_nachricht()));
        assert!(neu_rx.try_recv().is_ok());
    }

    #[test]
    fn austragen_mit_passender_verbindung_entfernt() {
        let registry = PresenceRegistry::neu();
        let verbindungs_id = Uuid::new_v4();
        let (handle, _rx) = ClientHandle::neu(verbindungs_id);

        registry.registrieren(UserId(1), handle);
        assert!(registry.austragen(&UserId(1), verbindungs_id));
        assert!(!registry.ist_verbunden(&UserId(1)));
    }

    #[test]
    fn austragen_unbekannter_identitaet_ist_noop() {
        let registry = PresenceRegistry::neu();
        assert!(!registry.austragen(&UserId(9), Uuid::new_v4()));
    }

    #[test]
    fn geschlossenes_handle_ist_nicht_offen() {
        let (handle, rx) = ClientHandle::neu(Uuid::new_v4());
        assert!(handle.ist_offen());
        drop(rx);
        assert!(!handle.ist_offen());
        assert!(!handle.senden(test_nachricht()));
    }

    #[test]
    fn volle_queue_verwirft() {
        let (handle, _rx) = ClientHandle::neu(Uuid::new_v4());
        for _ in 0..SEND_QUEUE_GROESSE {
            assert!(handle.senden(test_nachricht()));
        }
        assert!(!handle.senden(test_nachricht()), "Volle Queue muss verwerfen");
    }

    #[test]
    fn clone_teilt_inneren_state() {
        let r1 = PresenceRegistry::neu();
        let r2 = r1.clone();
        let (handle, _rx) = ClientHandle::neu(Uuid::new_v4());

        r1.registrieren(UserId(5), handle);
        assert!(r2.ist_verbunden(&UserId(5)));
    }
}

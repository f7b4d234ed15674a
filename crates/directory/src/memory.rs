//! In-Memory-Implementierung des Call-Verzeichnisses
//!
//! Thread-safe via DashMap; IDs werden fortlaufend aus Atomic-Zaehlern
//! vergeben. Reicht fuer Single-Instance-Betrieb und Tests; Persistenz
//! ist bewusst nicht Teil des Relay-Kerns.

use std::sync::atomic::{AtomicI64, Ordering};

use agricall_core::types::{CallId, CallStatus, Rolle, UserId};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;

use crate::error::{VerzeichnisError, VerzeichnisResult};
use crate::models::{
    BenutzerRecord, CallRecord, NachrichtRecord, NeueNachricht, NeuerBenutzer, NeuerCall,
};
use crate::repository::VerzeichnisRepository;

/// In-Memory-Verzeichnis
///
/// Clone teilt keinen Zustand – das Verzeichnis wird als `Arc` geteilt.
#[derive(Default)]
pub struct MemoryVerzeichnis {
    benutzer: DashMap<UserId, BenutzerRecord>,
    calls: DashMap<CallId, CallRecord>,
    nachrichten: DashMap<i64, NachrichtRecord>,
    benutzer_zaehler: AtomicI64,
    call_zaehler: AtomicI64,
    nachricht_zaehler: AtomicI64,
}

impl MemoryVerzeichnis {
    /// Erstellt ein leeres Verzeichnis
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt ein Verzeichnis mit Demo-Daten
    ///
    /// Ein Farmer, zwei Spezialisten und ein geplanter Call – genug um
    /// das Relay ohne REST-Seite auszuprobieren.
    pub async fn mit_demo_daten() -> Self {
        let verzeichnis = Self::neu();

        let farmer = verzeichnis
            .benutzer_erstellen(NeuerBenutzer {
                username: "john_farmer",
                full_name: "John Peterson",
                email: "john@example.com",
                rolle: Rolle::Farmer,
                specialization: None,
                bio: Some("Corn and soybean farmer from Iowa"),
                profile_picture: None,
            })
            .await
            .expect("Demo-Farmer anlegen");

        let spezialistin = verzeichnis
            .benutzer_erstellen(NeuerBenutzer {
                username: "maria_specialist",
                full_name: "Dr. Maria Rodriguez",
                email: "maria@example.com",
                rolle: Rolle::Specialist,
                specialization: Some("Crop Disease"),
                bio: Some("Plant pathologist with 10 years of experience"),
                profile_picture: None,
            })
            .await
            .expect("Demo-Spezialistin anlegen");

        verzeichnis
            .benutzer_erstellen(NeuerBenutzer {
                username: "james_specialist",
                full_name: "Dr. James Wilson",
                email: "james@example.com",
                rolle: Rolle::Specialist,
                specialization: Some("Soil Expert"),
                bio: Some("Soil scientist specializing in soil health"),
                profile_picture: None,
            })
            .await
            .expect("Demo-Spezialist anlegen");

        verzeichnis
            .call_erstellen(NeuerCall {
                farmer_id: farmer.id,
                specialist_id: spezialistin.id,
                scheduled_time: Utc::now() + Duration::hours(1),
                dauer_minuten: 30,
                status: CallStatus::Scheduled,
                topic: Some("Leaf spots on corn"),
                notes: None,
            })
            .await
            .expect("Demo-Call anlegen");

        tracing::info!(
            benutzer = verzeichnis.benutzer.len(),
            calls = verzeichnis.calls.len(),
            "Demo-Daten geladen"
        );

        verzeichnis
    }
}

#[async_trait]
impl VerzeichnisRepository for MemoryVerzeichnis {
    async fn benutzer_laden(&self, id: UserId) -> VerzeichnisResult<Option<BenutzerRecord>> {
        Ok(self.benutzer.get(&id).map(|e| e.clone()))
    }

    async fn benutzer_erstellen(
        &self,
        neu: NeuerBenutzer<'_>,
    ) -> VerzeichnisResult<BenutzerRecord> {
        if neu.username.trim().is_empty() {
            return Err(VerzeichnisError::UngueltigeEingabe(
                "Benutzername darf nicht leer sein".into(),
            ));
        }

        let id = UserId(self.benutzer_zaehler.fetch_add(1, Ordering::Relaxed) + 1);
        let record = BenutzerRecord {
            id,
            username: neu.username.to_string(),
            full_name: neu.full_name.to_string(),
            email: neu.email.to_string(),
            rolle: neu.rolle,
            specialization: neu.specialization.map(str::to_string),
            bio: neu.bio.map(str::to_string),
            profile_picture: neu.profile_picture.map(str::to_string),
            rating: 0,
            total_calls: 0,
        };
        self.benutzer.insert(id, record.clone());
        Ok(record)
    }

    async fn call_laden(&self, id: CallId) -> VerzeichnisResult<Option<CallRecord>> {
        Ok(self.calls.get(&id).map(|e| e.clone()))
    }

    async fn call_erstellen(&self, neu: NeuerCall<'_>) -> VerzeichnisResult<CallRecord> {
        let id = CallId(self.call_zaehler.fetch_add(1, Ordering::Relaxed) + 1);
        let record = CallRecord {
            id,
            farmer_id: neu.farmer_id,
            specialist_id: neu.specialist_id,
            scheduled_time: neu.scheduled_time,
            dauer_minuten: neu.dauer_minuten,
            status: neu.status,
            topic: neu.topic.map(str::to_string),
            notes: neu.notes.map(str::to_string),
        };
        self.calls.insert(id, record.clone());
        Ok(record)
    }

    async fn call_status_setzen(
        &self,
        id: CallId,
        status: CallStatus,
    ) -> VerzeichnisResult<Option<CallRecord>> {
        match self.calls.get_mut(&id) {
            Some(mut eintrag) => {
                eintrag.status = status;
                Ok(Some(eintrag.clone()))
            }
            None => Ok(None),
        }
    }

    async fn nachricht_erstellen(
        &self,
        neu: NeueNachricht<'_>,
    ) -> VerzeichnisResult<NachrichtRecord> {
        let id = self.nachricht_zaehler.fetch_add(1, Ordering::Relaxed) + 1;
        let record = NachrichtRecord {
            id,
            call_id: neu.call_id,
            sender_id: neu.sender_id,
            content: neu.content.to_string(),
            timestamp: neu.timestamp,
        };
        self.nachrichten.insert(id, record.clone());
        Ok(record)
    }

    async fn nachrichten_nach_call(
        &self,
        call_id: CallId,
    ) -> VerzeichnisResult<Vec<NachrichtRecord>> {
        let mut treffer: Vec<NachrichtRecord> = self
            .nachrichten
            .iter()
            .filter(|e| e.call_id == call_id)
            .map(|e| e.clone())
            .collect();
        // DashMap-Iteration hat keine stabile Reihenfolge
        treffer.sort_by_key(|n| n.id);
        Ok(treffer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_benutzer(name: &str, rolle: Rolle) -> NeuerBenutzer<'_> {
        NeuerBenutzer {
            username: name,
            full_name: name,
            email: "test@example.com",
            rolle,
            specialization: None,
            bio: None,
            profile_picture: None,
        }
    }

    async fn test_call(v: &MemoryVerzeichnis) -> CallRecord {
        let farmer = v
            .benutzer_erstellen(test_benutzer("farmer", Rolle::Farmer))
            .await
            .unwrap();
        let spezialist = v
            .benutzer_erstellen(test_benutzer("spezialist", Rolle::Specialist))
            .await
            .unwrap();
        v.call_erstellen(NeuerCall {
            farmer_id: farmer.id,
            specialist_id: spezialist.id,
            scheduled_time: Utc::now(),
            dauer_minuten: 30,
            status: CallStatus::Scheduled,
            topic: None,
            notes: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn benutzer_anlegen_und_laden() {
        let v = MemoryVerzeichnis::neu();
        let angelegt = v
            .benutzer_erstellen(test_benutzer("anna", Rolle::Farmer))
            .await
            .unwrap();

        let geladen = v.benutzer_laden(angelegt.id).await.unwrap().unwrap();
        assert_eq!(geladen.username, "anna");
        assert_eq!(geladen.rolle, Rolle::Farmer);
        assert_eq!(geladen.rating, 0);
    }

    #[tokio::test]
    async fn ids_sind_fortlaufend() {
        let v = MemoryVerzeichnis::neu();
        let a = v
            .benutzer_erstellen(test_benutzer("a", Rolle::Farmer))
            .await
            .unwrap();
        let b = v
            .benutzer_erstellen(test_benutzer("b", Rolle::Farmer))
            .await
            .unwrap();
        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
    }

    #[tokio::test]
    async fn leerer_benutzername_abgelehnt() {
        let v = MemoryVerzeichnis::neu();
        let ergebnis = v.benutzer_erstellen(test_benutzer("  ", Rolle::Farmer)).await;
        assert!(matches!(
            ergebnis,
            Err(VerzeichnisError::UngueltigeEingabe(_))
        ));
    }

    #[tokio::test]
    async fn unbekannter_benutzer_ist_none() {
        let v = MemoryVerzeichnis::neu();
        assert!(v.benutzer_laden(UserId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn call_status_setzen_aktualisiert() {
        let v = MemoryVerzeichnis::neu();
        let call = test_call(&v).await;

        let aktualisiert = v
            .call_status_setzen(call.id, CallStatus::Ongoing)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(aktualisiert.status, CallStatus::Ongoing);

        let geladen = v.call_laden(call.id).await.unwrap().unwrap();
        assert_eq!(geladen.status, CallStatus::Ongoing);
    }

    #[tokio::test]
    async fn status_fuer_unbekannten_call_ist_none() {
        let v = MemoryVerzeichnis::neu();
        let ergebnis = v
            .call_status_setzen(CallId(404), CallStatus::Completed)
            .await
            .unwrap();
        assert!(ergebnis.is_none());
    }

    #[tokio::test]
    async fn nachrichten_in_empfangsreihenfolge() {
        let v = MemoryVerzeichnis::neu();
        let call = test_call(&v).await;

        for inhalt in ["erste", "zweite", "dritte"] {
            v.nachricht_erstellen(NeueNachricht {
                call_id: call.id,
                sender_id: call.farmer_id,
                content: inhalt,
                timestamp: Utc::now(),
            })
            .await
            .unwrap();
        }

        let nachrichten = v.nachrichten_nach_call(call.id).await.unwrap();
        assert_eq!(nachrichten.len(), 3);
        assert_eq!(nachrichten[0].content, "erste");
        assert_eq!(nachrichten[2].content, "dritte");
    }

    #[tokio::test]
    async fn demo_daten_enthalten_call() {
        let v = MemoryVerzeichnis::mit_demo_daten().await;
        let call = v.call_laden(CallId(1)).await.unwrap().unwrap();
        assert_eq!(call.status, CallStatus::Scheduled);

        let farmer = v.benutzer_laden(call.farmer_id).await.unwrap().unwrap();
        assert_eq!(farmer.rolle, Rolle::Farmer);
    }
}

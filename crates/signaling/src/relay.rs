//! Signal-Relay – klassifiziert und routet eingehende Nachrichten
//!
//! Das Relay verarbeitet jede eingehende Roh-Nachricht einer Verbindung:
//! parsen am Transport-Rand, dann Dispatch nach Art. Jede Nachricht wird
//! isoliert behandelt – ein Handler-Fehler wird geloggt und beendet weder
//! die Verbindung noch den Prozess.
//!
//! ## Zustandspruefung
//! - `auth` bindet die Identitaet dieser Verbindung
//! - Negotiation-Nachrichten brauchen keine Identitaet (Routing laeuft
//!   ueber die Ziel-ID)
//! - `chat-message` ist ohne Identitaet ein No-op

use std::sync::Arc;

use agricall_core::types::{CallId, CallStatus, UserId};
use agricall_directory::{NeueNachricht, VerzeichnisRepository};
use agricall_protocol::{
    nachricht_parsen, NegotiationsArt, NegotiationsDaten, ParseErgebnis, SignalAusgehend,
    SignalEingehend, WeitergeleiteteNegotiation,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::SignalingResult;
use crate::presence::ClientHandle;
use crate::server_state::SignalingState;

// ---------------------------------------------------------------------------
// Verbindungs-Kontext
// ---------------------------------------------------------------------------

/// Kontext einer einzelnen Verbindung
///
/// `user_id` traegt den Verbindungszustand: `None` solange die Verbindung
/// unauthentifiziert ist, `Some` nach dem Identitaets-Claim.
pub struct VerbindungsKontext {
    /// Eindeutige ID dieser Verbindungs-Instanz
    pub verbindungs_id: Uuid,
    /// Gebundene Identitaet (None vor dem Auth-Claim)
    pub user_id: Option<UserId>,
    /// Handle auf die eigene Send-Queue (fuer die Registrierung bei Auth)
    handle: ClientHandle,
}

impl VerbindungsKontext {
    /// Erstellt einen Kontext fuer eine frisch akzeptierte Verbindung
    pub fn neu(verbindungs_id: Uuid, handle: ClientHandle) -> Self {
        Self {
            verbindungs_id,
            user_id: None,
            handle,
        }
    }
}

// ---------------------------------------------------------------------------
// SignalRelay
// ---------------------------------------------------------------------------

/// Zentrales Relay fuer Signaling-Nachrichten
///
/// Zustandslos bis auf den geteilten `SignalingState`; pro Verbindung wird
/// ein Relay-Wert angelegt (billig, zwei Arc-Klone).
pub struct SignalRelay<V: VerzeichnisRepository + 'static> {
    state: Arc<SignalingState<V>>,
}

impl<V: VerzeichnisRepository + 'static> SignalRelay<V> {
    /// Erstellt ein neues Relay
    pub fn neu(state: Arc<SignalingState<V>>) -> Self {
        Self { state }
    }

    /// Verarbeitet eine Roh-Nachricht vom Client
    ///
    /// Fehlerhafte Payloads und unbekannte Arten werden hier abgefangen;
    /// die Verbindung bleibt in jedem Fall offen.
    pub async fn verarbeiten(&self, roh: &str, ctx: &mut VerbindungsKontext) {
        let nachricht = match nachricht_parsen(roh) {
            Ok(ParseErgebnis::Nachricht(n)) => n,
            Ok(ParseErgebnis::UnbekannteArt(art)) => {
                tracing::debug!(
                    verbindung = %ctx.verbindungs_id,
                    art = %art,
                    "Unbekannte Nachrichten-Art ignoriert"
                );
                return;
            }
            Err(fehler) => {
                tracing::warn!(
                    verbindung = %ctx.verbindungs_id,
                    fehler = %fehler,
                    "Fehlerhafte Nachricht verworfen – Verbindung bleibt offen"
                );
                return;
            }
        };

        let art = nachricht.art();
        if let Err(fehler) = self.dispatch(nachricht, ctx).await {
            tracing::warn!(
                verbindung = %ctx.verbindungs_id,
                art,
                fehler = %fehler,
                "Nachrichten-Handler fehlgeschlagen – kein Retry, keine Antwort"
            );
        }
    }

    /// Routet eine geparste Nachricht an den passenden Handler
    async fn dispatch(
        &self,
        nachricht: SignalEingehend,
        ctx: &mut VerbindungsKontext,
    ) -> SignalingResult<()> {
        match nachricht {
            SignalEingehend::Auth { user_id } => {
                self.identitaet_binden(user_id, ctx);
                Ok(())
            }

            SignalEingehend::Offer(_)
            | SignalEingehend::Answer(_)
            | SignalEingehend::IceCandidate(_) => {
                // Nach dem Match oben ist als_negotiation hier immer Some
                if let Some((art, daten)) = nachricht.als_negotiation() {
                    self.negotiation_weiterleiten(art, daten, ctx);
                }
                Ok(())
            }

            SignalEingehend::CallStatusUpdate { call_id, status } => {
                self.status_update(call_id, status).await
            }

            SignalEingehend::ChatMessage { call_id, content } => {
                self.chat_nachricht(call_id, &content, ctx).await
            }
        }
    }

    // -----------------------------------------------------------------------
    // Handler
    // -----------------------------------------------------------------------

    /// `auth`: bindet die Identitaet an diese Verbindung
    fn identitaet_binden(&self, user_id: UserId, ctx: &mut VerbindungsKontext) {
        // Gleiche Verbindung beansprucht eine andere Identitaet: die alte
        // Bindung dieser Verbindung zuerst loesen
        if let Some(vorherige) = ctx.user_id.replace(user_id) {
            if vorherige != user_id {
                self.state
                    .presence
                    .austragen(&vorherige, ctx.verbindungs_id);
            }
        }

        self.state.presence.registrieren(user_id, ctx.handle.clone());
    }

    /// `offer`/`answer`/`ice-candidate`: zustandslose Weiterleitung
    ///
    /// Ziel nicht verbunden oder Queue zu: stilles Verwerfen, keine
    /// Rueckmeldung an den Absender.
    fn negotiation_weiterleiten(
        &self,
        art: NegotiationsArt,
        daten: NegotiationsDaten,
        ctx: &VerbindungsKontext,
    ) {
        let ziel = daten.target_id;
        let weitergeleitet = WeitergeleiteteNegotiation {
            from_id: ctx.user_id,
            call_id: daten.call_id,
            data: daten.data,
        };

        let zugestellt = self
            .state
            .presence
            .senden_an(&ziel, SignalAusgehend::negotiation(art, weitergeleitet));

        if !zugestellt {
            tracing::trace!(
                art = art.als_str(),
                ziel = %ziel,
                "Negotiation-Ziel nicht erreichbar – verworfen"
            );
        }
    }

    /// `call-status-update`: Verzeichnis aktualisieren und den identischen
    /// Status an beide Teilnehmer verteilen (der Absender kann einer davon
    /// sein)
    async fn status_update(&self, call_id: CallId, status: CallStatus) -> SignalingResult<()> {
        let call = match self
            .state
            .verzeichnis
            .call_status_setzen(call_id, status)
            .await?
        {
            Some(call) => call,
            None => {
                tracing::debug!(call_id = %call_id, "Status-Update fuer unbekannten Call ignoriert");
                return Ok(());
            }
        };

        tracing::info!(call_id = %call_id, status = %status, "Call-Status aktualisiert");

        let nachricht = SignalAusgehend::CallStatusUpdate { call_id, status };
        self.state
            .presence
            .senden_an(&call.farmer_id, nachricht.clone());
        self.state.presence.senden_an(&call.specialist_id, nachricht);

        Ok(())
    }

    /// `chat-message`: persistieren und nur dem anderen Teilnehmer
    /// zustellen, nie als Echo an den Absender
    async fn chat_nachricht(
        &self,
        call_id: CallId,
        content: &str,
        ctx: &VerbindungsKontext,
    ) -> SignalingResult<()> {
        // Ohne gebundene Identitaet gibt es keinen Absender: No-op
        let Some(sender_id) = ctx.user_id else {
            tracing::debug!(
                verbindung = %ctx.verbindungs_id,
                "Chat-Nachricht ohne Identitaet verworfen"
            );
            return Ok(());
        };

        // Zeitstempel vergibt das Relay beim Empfang, nie der Client
        let record = self
            .state
            .verzeichnis
            .nachricht_erstellen(NeueNachricht {
                call_id,
                sender_id,
                content,
                timestamp: Utc::now(),
            })
            .await?;

        let Some(call) = self.state.verzeichnis.call_laden(call_id).await? else {
            tracing::debug!(call_id = %call_id, "Chat fuer unbekannten Call – keine Zustellung");
            return Ok(());
        };

        let empfaenger = if sender_id == call.farmer_id {
            call.specialist_id
        } else {
            call.farmer_id
        };

        if self.state.presence.nachschlagen(&empfaenger).is_some() {
            let sender_name = self
                .state
                .verzeichnis
                .benutzer_laden(sender_id)
                .await?
                .map(|b| b.full_name);

            self.state.presence.senden_an(
                &empfaenger,
                SignalAusgehend::ChatMessage {
                    call_id,
                    sender_id,
                    sender_name,
                    content: record.content,
                    timestamp: record.timestamp,
                },
            );
        }

        Ok(())
    }

    /// Bereinigt die Presence-Bindung beim Verbindungsende
    ///
    /// Laeuft nur fuer die eigene Verbindungs-Instanz – eine inzwischen
    /// neu gebundene Identitaet bleibt unberuehrt.
    pub fn verbindung_schliessen(&self, ctx: &VerbindungsKontext) {
        if let Some(user_id) = ctx.user_id {
            self.state.presence.austragen(&user_id, ctx.verbindungs_id);
        }
    }
}

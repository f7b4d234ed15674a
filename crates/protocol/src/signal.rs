//! Signaling-Nachrichten – eingehend und ausgehend
//!
//! Jede eingehende Nachricht ist ein einzelnes JSON-Objekt mit dem
//! Pflichtfeld `type`. Unbekannte Arten sind ein No-op (kein Fehler),
//! fehlerhafte Payloads sind ein Parse-Fehler – die Verbindung bleibt in
//! beiden Faellen offen, die Entscheidung trifft das Relay.

use agricall_core::types::{CallId, CallStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Negotiation-Payloads (Offer / Answer / ICE-Candidate)
// ---------------------------------------------------------------------------

/// Art einer WebRTC-Negotiation-Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationsArt {
    Offer,
    Answer,
    IceCandidate,
}

impl NegotiationsArt {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceCandidate => "ice-candidate",
        }
    }
}

/// Eingehende Negotiation-Nachricht
///
/// `data` ist ein opakes JSON-Payload (SDP oder ICE-Candidate) das das
/// Relay unveraendert weiterreicht.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationsDaten {
    /// Ziel-Identitaet – das Routing laeuft ueber den Empfaenger, nicht
    /// den Absender
    pub target_id: UserId,
    pub call_id: CallId,
    pub data: serde_json::Value,
}

/// Weitergeleitete Negotiation-Nachricht (Server -> Ziel-Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeitergeleiteteNegotiation {
    /// Absender-Identitaet; fehlt wenn der Absender nie Auth gesendet hat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_id: Option<UserId>,
    pub call_id: CallId,
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Eingehende Nachrichten
// ---------------------------------------------------------------------------

/// Alle vom Client akzeptierten Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalEingehend {
    /// Identitaets-Claim: bindet diese Verbindung an eine User-ID
    Auth {
        /// Bestehende Clients senden die ID teils als String, teils als Zahl
        #[serde(rename = "userId", deserialize_with = "user_id_flexibel")]
        user_id: UserId,
    },
    Offer(NegotiationsDaten),
    Answer(NegotiationsDaten),
    IceCandidate(NegotiationsDaten),
    #[serde(rename_all = "camelCase")]
    CallStatusUpdate { call_id: CallId, status: CallStatus },
    #[serde(rename_all = "camelCase")]
    ChatMessage { call_id: CallId, content: String },
}

impl SignalEingehend {
    /// Gibt den Diskriminator-String der Nachricht zurueck (fuer Logging)
    pub fn art(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
            Self::CallStatusUpdate { .. } => "call-status-update",
            Self::ChatMessage { .. } => "chat-message",
        }
    }

    /// Zerlegt eine Negotiation-Nachricht in Art und Payload
    pub fn als_negotiation(self) -> Option<(NegotiationsArt, NegotiationsDaten)> {
        match self {
            Self::Offer(d) => Some((NegotiationsArt::Offer, d)),
            Self::Answer(d) => Some((NegotiationsArt::Answer, d)),
            Self::IceCandidate(d) => Some((NegotiationsArt::IceCandidate, d)),
            _ => None,
        }
    }
}

/// Deserialisiert eine User-ID die als Zahl oder als numerischer String
/// ankommen kann
fn user_id_flexibel<'de, D>(deserializer: D) -> Result<UserId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ZahlOderString {
        Zahl(i64),
        Text(String),
    }

    match ZahlOderString::deserialize(deserializer)? {
        ZahlOderString::Zahl(n) => Ok(UserId(n)),
        ZahlOderString::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| serde::de::Error::custom(format!("userId ist nicht numerisch: {s:?}"))),
    }
}

// ---------------------------------------------------------------------------
// Ausgehende Nachrichten
// ---------------------------------------------------------------------------

/// Alle vom Server an Clients gesendeten Nachrichten
///
/// Spiegelt die eingehende Envelope-Form; `fromId`, `senderId`,
/// `senderName` und `timestamp` fuegt der Server hinzu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalAusgehend {
    Offer(WeitergeleiteteNegotiation),
    Answer(WeitergeleiteteNegotiation),
    IceCandidate(WeitergeleiteteNegotiation),
    #[serde(rename_all = "camelCase")]
    CallStatusUpdate { call_id: CallId, status: CallStatus },
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        call_id: CallId,
        sender_id: UserId,
        /// Fehlt wenn das Verzeichnis den Absender nicht kennt
        #[serde(skip_serializing_if = "Option::is_none")]
        sender_name: Option<String>,
        content: String,
        timestamp: DateTime<Utc>,
    },
}

impl SignalAusgehend {
    /// Baut die Weiterleitung einer Negotiation-Nachricht
    pub fn negotiation(art: NegotiationsArt, weitergeleitet: WeitergeleiteteNegotiation) -> Self {
        match art {
            NegotiationsArt::Offer => Self::Offer(weitergeleitet),
            NegotiationsArt::Answer => Self::Answer(weitergeleitet),
            NegotiationsArt::IceCandidate => Self::IceCandidate(weitergeleitet),
        }
    }

    /// Serialisiert die Nachricht als JSON-Text
    pub fn als_json(&self) -> String {
        // Ausgehende Nachrichten enthalten nur serialisierbare Typen
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Parsen am Transport-Rand
// ---------------------------------------------------------------------------

/// Arten die dieses Relay versteht
const BEKANNTE_ARTEN: [&str; 6] = [
    "auth",
    "offer",
    "answer",
    "ice-candidate",
    "call-status-update",
    "chat-message",
];

/// Ergebnis des Parsens einer eingehenden Roh-Nachricht
#[derive(Debug)]
pub enum ParseErgebnis {
    /// Gueltige, bekannte Nachricht
    Nachricht(SignalEingehend),
    /// Wohlgeformtes JSON mit unbekanntem `type` – stilles No-op
    UnbekannteArt(String),
}

/// Parse-Fehler fuer fehlerhafte Payloads
#[derive(Debug, Error)]
pub enum ParseFehler {
    #[error("Ungueltiges JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Diskriminator-Feld `type` fehlt oder ist kein String")]
    DiskriminatorFehlt,

    #[error("Ungueltige Felder fuer `{art}`: {quelle}")]
    Felder {
        art: String,
        #[source]
        quelle: serde_json::Error,
    },
}

/// Parst eine Roh-Nachricht vom Client
///
/// Trennt die drei Faelle die das Relay unterscheiden muss: gueltige
/// Nachricht, unbekannte Art (No-op) und fehlerhafte Payload (Fehler,
/// wird geloggt, Verbindung bleibt offen).
pub fn nachricht_parsen(roh: &str) -> Result<ParseErgebnis, ParseFehler> {
    let wert: serde_json::Value = serde_json::from_str(roh).map_err(ParseFehler::Json)?;

    let art = wert
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(ParseFehler::DiskriminatorFehlt)?;

    if !BEKANNTE_ARTEN.contains(&art) {
        return Ok(ParseErgebnis::UnbekannteArt(art.to_string()));
    }

    let art = art.to_string();
    serde_json::from_value(wert)
        .map(ParseErgebnis::Nachricht)
        .map_err(|quelle| ParseFehler::Felder { art, quelle })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mit_zahl_parsen() {
        let ergebnis = nachricht_parsen(r#"{"type":"auth","userId":7}"#).unwrap();
        match ergebnis {
            ParseErgebnis::Nachricht(SignalEingehend::Auth { user_id }) => {
                assert_eq!(user_id, UserId(7));
            }
            other => panic!("Unerwartetes Ergebnis: {other:?}"),
        }
    }

    #[test]
    fn auth_mit_string_parsen() {
        let ergebnis = nachricht_parsen(r#"{"type":"auth","userId":"12"}"#).unwrap();
        match ergebnis {
            ParseErgebnis::Nachricht(SignalEingehend::Auth { user_id }) => {
                assert_eq!(user_id, UserId(12));
            }
            other => panic!("Unerwartetes Ergebnis: {other:?}"),
        }
    }

    #[test]
    fn auth_mit_nicht_numerischem_string_ist_fehler() {
        let ergebnis = nachricht_parsen(r#"{"type":"auth","userId":"abc"}"#);
        assert!(matches!(ergebnis, Err(ParseFehler::Felder { .. })));
    }

    #[test]
    fn offer_parsen() {
        let roh = r#"{"type":"offer","targetId":1,"callId":10,"data":"sdp..."}"#;
        let ergebnis = nachricht_parsen(roh).unwrap();
        match ergebnis {
            ParseErgebnis::Nachricht(nachricht) => {
                assert_eq!(nachricht.art(), "offer");
                let (art, daten) = nachricht.als_negotiation().unwrap();
                assert_eq!(art, NegotiationsArt::Offer);
                assert_eq!(daten.target_id, UserId(1));
                assert_eq!(daten.call_id, CallId(10));
                assert_eq!(daten.data, serde_json::json!("sdp..."));
            }
            other => panic!("Unerwartetes Ergebnis: {other:?}"),
        }
    }

    #[test]
    fn call_status_update_parsen() {
        let roh = r#"{"type":"call-status-update","callId":10,"status":"ongoing"}"#;
        let ergebnis = nachricht_parsen(roh).unwrap();
        match ergebnis {
            ParseErgebnis::Nachricht(SignalEingehend::CallStatusUpdate { call_id, status }) => {
                assert_eq!(call_id, CallId(10));
                assert_eq!(status, CallStatus::Ongoing);
            }
            other => panic!("Unerwartetes Ergebnis: {other:?}"),
        }
    }

    #[test]
    fn unbekannte_art_ist_kein_fehler() {
        let ergebnis = nachricht_parsen(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ergebnis, ParseErgebnis::UnbekannteArt(art) if art == "ping"));
    }

    #[test]
    fn fehlender_diskriminator() {
        let ergebnis = nachricht_parsen(r#"{"userId":1}"#);
        assert!(matches!(ergebnis, Err(ParseFehler::DiskriminatorFehlt)));
    }

    #[test]
    fn diskriminator_kein_string() {
        let ergebnis = nachricht_parsen(r#"{"type":3}"#);
        assert!(matches!(ergebnis, Err(ParseFehler::DiskriminatorFehlt)));
    }

    #[test]
    fn ungueltiges_json() {
        let ergebnis = nachricht_parsen("kein json {");
        assert!(matches!(ergebnis, Err(ParseFehler::Json(_))));
    }

    #[test]
    fn status_ausserhalb_der_menge_abgelehnt() {
        let roh = r#"{"type":"call-status-update","callId":10,"status":"paused"}"#;
        assert!(matches!(
            nachricht_parsen(roh),
            Err(ParseFehler::Felder { .. })
        ));
    }

    #[test]
    fn weiterleitung_serialisiert_erwartete_felder() {
        let nachricht = SignalAusgehend::negotiation(
            NegotiationsArt::Offer,
            WeitergeleiteteNegotiation {
                from_id: Some(UserId(2)),
                call_id: CallId(10),
                data: serde_json::json!("sdp..."),
            },
        );
        let json: serde_json::Value = serde_json::from_str(&nachricht.als_json()).unwrap();
        assert_eq!(json["type"], "offer");
        assert_eq!(json["fromId"], 2);
        assert_eq!(json["callId"], 10);
        assert_eq!(json["data"], "sdp...");
    }

    #[test]
    fn fehlende_absender_id_wird_ausgelassen() {
        let nachricht = SignalAusgehend::negotiation(
            NegotiationsArt::IceCandidate,
            WeitergeleiteteNegotiation {
                from_id: None,
                call_id: CallId(10),
                data: serde_json::json!({"candidate": "..."}),
            },
        );
        let json: serde_json::Value = serde_json::from_str(&nachricht.als_json()).unwrap();
        assert_eq!(json["type"], "ice-candidate");
        assert!(json.get("fromId").is_none());
    }

    #[test]
    fn chat_nachricht_serialisiert_sender_felder() {
        let nachricht = SignalAusgehend::ChatMessage {
            call_id: CallId(10),
            sender_id: UserId(1),
            sender_name: Some("Anna Bauer".into()),
            content: "Hallo".into(),
            timestamp: chrono::Utc::now(),
        };
        let json: serde_json::Value = serde_json::from_str(&nachricht.als_json()).unwrap();
        assert_eq!(json["type"], "chat-message");
        assert_eq!(json["senderId"], 1);
        assert_eq!(json["senderName"], "Anna Bauer");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn status_fanout_serialisiert_kebab_case() {
        let nachricht = SignalAusgehend::CallStatusUpdate {
            call_id: CallId(10),
            status: CallStatus::Ongoing,
        };
        let json: serde_json::Value = serde_json::from_str(&nachricht.als_json()).unwrap();
        assert_eq!(json["type"], "call-status-update");
        assert_eq!(json["status"], "ongoing");
    }
}

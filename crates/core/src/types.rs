//! Gemeinsame Identifikations- und Statustypen fuer AgriCall
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen. Die IDs werden
//! extern vergeben (fortlaufende Integer aus dem Call-Verzeichnis), das
//! Relay erzeugt selbst keine.

use serde::{Deserialize, Serialize};

/// Benutzer-ID (Farmer oder Spezialist), extern vergeben
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Gibt den inneren Wert zurueck
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Call-ID einer geplanten Beratung, extern vergeben
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub i64);

impl CallId {
    /// Gibt den inneren Wert zurueck
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl From<i64> for CallId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call:{}", self.0)
    }
}

/// Rolle eines Benutzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    Farmer,
    Specialist,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Specialist => "specialist",
        }
    }
}

impl std::str::FromStr for Rolle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Self::Farmer),
            "specialist" => Ok(Self::Specialist),
            other => Err(format!("Unbekannte Rolle: {other}")),
        }
    }
}

/// Status einer Beratung (geschlossene Menge, Lebenszyklus im Verzeichnis)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl CallStatus {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unbekannter Call-Status: {other}")),
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

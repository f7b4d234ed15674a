//! agricall-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use agricall_directory::MemoryVerzeichnis;
use agricall_signaling::{SignalingListener, SignalingState};
use config::ServerConfig;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Signaling-Listener und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Call-Verzeichnis anlegen (optional mit Demo-Daten)
    /// 2. Geteilten Signaling-Zustand aufbauen
    /// 3. HTTP/WebSocket-Listener binden und bedienen
    pub async fn starten(self) -> Result<()> {
        let bind_addr: SocketAddr = self
            .config
            .bind_adresse()
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{}'", self.config.bind_adresse()))?;

        let verzeichnis = if self.config.verzeichnis.demo_daten {
            MemoryVerzeichnis::mit_demo_daten().await
        } else {
            MemoryVerzeichnis::neu()
        };

        let state = SignalingState::neu(Arc::new(verzeichnis));

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %bind_addr,
            demo_daten = self.config.verzeichnis.demo_daten,
            "Server startet"
        );

        let listener = SignalingListener::neu(state, bind_addr);
        listener
            .starten()
            .await
            .context("Signaling-Listener beendet mit Fehler")?;

        tracing::info!("Server wird beendet");
        Ok(())
    }
}

//! Boucle de surveillance
//!
//! Lit un bloc, mesure sa norme, joue l'alerte si le seuil est dépassé.
//! Tout est synchrone : pendant l'alerte, aucun échantillon n'est lu.

use crate::alert::AlertSink;
use crate::audio::{BlockSource, MicrophoneError};
use crate::config::MonitorConfig;
use thiserror::Error;

/// Erreurs remontées par la boucle
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Erreur audio: {0}")]
    AudioError(#[from] MicrophoneError),
}

/// État de la boucle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Lecture des blocs en cours
    Listening,
    /// Alerte en cours de lecture
    Alerting,
    /// Boucle terminée, périphérique libéré
    Stopped,
}

/// Bilan d'une exécution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSummary {
    pub blocks_read: u64,
    pub alerts_played: u64,
    /// Norme la plus élevée observée
    pub loudest: f64,
}

/// Moniteur de niveau sonore
pub struct Monitor<S: BlockSource, A: AlertSink> {
    config: MonitorConfig,
    source: S,
    alert: A,
    state: MonitorState,
    summary: MonitorSummary,
}

impl<S: BlockSource, A: AlertSink> Monitor<S, A> {
    /// Crée le moniteur autour d'une source déjà ouverte
    pub fn new(source: S, alert: A, config: MonitorConfig) -> Self {
        Self {
            config,
            source,
            alert,
            state: MonitorState::Listening,
            summary: MonitorSummary::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Exécute la boucle jusqu'à l'interruption
    ///
    /// La source est fermée exactement une fois, quelle que soit l'issue.
    /// Une interruption n'est pas une erreur.
    pub fn run(&mut self) -> Result<MonitorSummary, MonitorError> {
        if self.state == MonitorState::Stopped {
            return Ok(self.summary.clone());
        }

        tracing::info!(
            "Surveillance démarrée (seuil {}, alerte {})",
            self.config.threshold,
            self.config.alert_path.display()
        );

        let result = self.listen();

        self.source.close();
        self.set_state(MonitorState::Stopped);

        match result {
            Ok(()) | Err(MicrophoneError::Interrupted) => Ok(self.summary.clone()),
            Err(e) => Err(e.into()),
        }
    }

    fn listen(&mut self) -> Result<(), MicrophoneError> {
        loop {
            let block = self.source.read_block()?;
            self.summary.blocks_read += 1;

            let norm = block.norm();
            if norm > self.summary.loudest {
                self.summary.loudest = norm;
            }

            if norm > self.config.threshold {
                tracing::info!(norm, "Seuil dépassé, alerte");
                self.set_state(MonitorState::Alerting);
                self.alert.play(&self.config.alert_path);
                self.summary.alerts_played += 1;
                self.source.discard_pending();
                self.set_state(MonitorState::Listening);
            }
        }
    }

    fn set_state(&mut self, state: MonitorState) {
        if self.state != state {
            tracing::debug!("État: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}

//! Signal d'arrêt partagé
//!
//! Levé par le handler Ctrl-C, consulté par les appels bloquants de capture
//! et de lecture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drapeau d'arrêt clonable entre la boucle et les composants audio
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installe le handler Ctrl-C du processus
    ///
    /// Le premier Ctrl-C lève le drapeau. Un second, pendant l'arrêt,
    /// termine le processus immédiatement.
    pub fn install_ctrlc(&self) -> Result<(), ctrlc::Error> {
        let signal = self.clone();
        ctrlc::set_handler(move || {
            if signal.is_stopped() {
                tracing::warn!("Second Ctrl-C, sortie immédiate");
                std::process::exit(130);
            }
            tracing::info!("Interruption reçue, arrêt en cours");
            signal.stop();
        })
    }

    /// Demande l'arrêt
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Indique si l'arrêt a été demandé
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

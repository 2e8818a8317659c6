//! Configuration de la surveillance
//!
//! Valeurs fixées au démarrage du processus, sans surface de configuration
//! à l'exécution.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration du moniteur et de la capture
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seuil de déclenchement, comparé à la norme L2 d'un bloc
    pub threshold: f64,
    /// Nombre d'échantillons par bloc
    pub block_size: usize,
    /// Taux d'échantillonnage de la capture (Hz)
    pub sample_rate: u32,
    /// Nombre de canaux (1 = mono)
    pub channels: u16,
    /// Fichier WAV joué à chaque déclenchement
    pub alert_path: PathBuf,
    /// Capacité du ring buffer de capture, en blocs
    pub buffer_blocks: usize,
    /// Intervalle d'attente entre deux vérifications du buffer
    pub poll_interval: Duration,
}

impl MonitorConfig {
    /// Capacité totale du ring buffer en échantillons
    pub fn buffer_capacity(&self) -> usize {
        self.block_size * self.buffer_blocks.max(1)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: 5000.0,
            block_size: 1024,
            sample_rate: 44100,
            channels: 1,
            alert_path: PathBuf::from("alarm.wav"),
            buffer_blocks: 8,
            poll_interval: Duration::from_millis(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_capture_format() {
        let config = MonitorConfig::default();
        assert_eq!(config.threshold, 5000.0);
        assert_eq!(config.block_size, 1024);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 1);
        assert_eq!(config.alert_path, PathBuf::from("alarm.wav"));
    }

    #[test]
    fn test_buffer_capacity_never_below_one_block() {
        let config = MonitorConfig {
            buffer_blocks: 0,
            ..Default::default()
        };
        assert_eq!(config.buffer_capacity(), 1024);
    }
}

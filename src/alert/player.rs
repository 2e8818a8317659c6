//! Lecture bloquante de l'alerte sonore
//!
//! Toute erreur de chargement ou de lecture est absorbée ici : une alerte
//! ratée ne doit jamais arrêter la surveillance.

use crate::signal::StopSignal;
use rodio::decoder::DecoderError;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::path::Path;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Erreurs de lecture de l'alerte
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Fichier d'alerte illisible: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format d'alerte invalide: {0}")]
    Decode(#[from] DecoderError),

    #[error("Sortie audio indisponible: {0}")]
    Output(#[from] rodio::StreamError),

    #[error("Lecture interrompue")]
    Interrupted,
}

/// Action d'alerte déclenchée par le moniteur
#[cfg_attr(test, mockall::automock)]
pub trait AlertSink {
    /// Joue l'alerte jusqu'au bout, sans jamais échouer
    fn play(&self, path: &Path);
}

/// Lecteur d'alerte sur le périphérique de sortie par défaut
pub struct AlertPlayer {
    stop: StopSignal,
    poll_interval: Duration,
}

impl AlertPlayer {
    pub fn new(stop: StopSignal, poll_interval: Duration) -> Self {
        Self {
            stop,
            poll_interval,
        }
    }

    /// Joue le fichier et bloque jusqu'à la fin de la lecture
    ///
    /// Seul point d'absorption des `AlertError`.
    pub fn play(&self, path: &Path) {
        match self.try_play(path) {
            Ok(()) => tracing::debug!("Alerte jouée"),
            Err(AlertError::Interrupted) => tracing::debug!("Alerte interrompue"),
            Err(e) => tracing::warn!("Alerte ignorée ({}): {}", path.display(), e),
        }
    }

    /// Variante faillible de [`AlertPlayer::play`]
    pub fn try_play(&self, path: &Path) -> Result<(), AlertError> {
        // Rechargé à chaque déclenchement
        let source = load(path)?;

        let mut stream = OutputStreamBuilder::open_default_stream()?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());

        sink.append(source);
        self.wait_until_end(&sink)
    }

    /// Équivalent interruptible de `Sink::sleep_until_end`
    fn wait_until_end(&self, sink: &Sink) -> Result<(), AlertError> {
        loop {
            if self.stop.is_stopped() {
                sink.stop();
                return Err(AlertError::Interrupted);
            }
            if sink.empty() {
                return Ok(());
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl AlertSink for AlertPlayer {
    fn play(&self, path: &Path) {
        AlertPlayer::play(self, path)
    }
}

/// Lit le fichier entier en mémoire et prépare son décodage
fn load(path: &Path) -> Result<Decoder<Cursor<Vec<u8>>>, AlertError> {
    let bytes = std::fs::read(path)?;
    tracing::debug!("Alerte chargée: {} ({} octets)", path.display(), bytes.len());
    Ok(Decoder::new(Cursor::new(bytes))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use rodio::Source;
    use tempfile::TempDir;

    fn player() -> AlertPlayer {
        AlertPlayer::new(StopSignal::new(), Duration::from_millis(1))
    }

    #[test]
    fn test_load_decodes_wav() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alarm.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for s in [0i16, 1000, -1000, 0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let source = load(&path).unwrap();
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 8000);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load(&dir.path().join("absent.wav"));
        assert!(matches!(result, Err(AlertError::Io(_))));
    }

    #[test]
    fn test_load_not_a_wav() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alarm.wav");
        std::fs::write(&path, b"definitely not riff data").unwrap();

        assert!(matches!(load(&path), Err(AlertError::Decode(_))));
    }

    #[test]
    fn test_missing_file_is_absorbed() {
        let dir = TempDir::new().unwrap();
        // Ne doit ni paniquer ni retourner d'erreur
        player().play(&dir.path().join("absent.wav"));
    }

    #[test]
    fn test_try_play_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = player().try_play(&dir.path().join("absent.wav"));
        assert!(matches!(result, Err(AlertError::Io(_))));
    }

    #[test]
    fn test_corrupt_file_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alarm.wav");
        std::fs::write(&path, b"RIFF....WAVEjunk").unwrap();

        player().play(&path);
    }

    #[test]
    fn test_wait_until_end_on_empty_sink() {
        let (sink, _queue) = Sink::new();
        assert!(player().wait_until_end(&sink).is_ok());
    }

    #[test]
    fn test_wait_until_end_interrupted() {
        let stop = StopSignal::new();
        let player = AlertPlayer::new(stop.clone(), Duration::from_millis(1));
        let (sink, _queue) = Sink::new();
        sink.append(rodio::source::Zero::new(1, 8000));
        stop.stop();

        let result = player.wait_until_end(&sink);
        assert!(matches!(result, Err(AlertError::Interrupted)));
    }
}

//! Capture audio depuis le microphone
//!
//! Utilise cpal pour la capture cross-platform et ringbuf pour le buffering.

use super::block::AudioBlock;
use super::buffer::{CaptureBuffer, CaptureWriter};
use crate::config::MonitorConfig;
use crate::signal::StopSignal;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};
use thiserror::Error;

/// Erreurs liées à la capture microphone
#[derive(Error, Debug)]
pub enum MicrophoneError {
    #[error("Aucun périphérique audio trouvé")]
    NoDevice,

    #[error("Erreur de configuration: {0}")]
    ConfigError(String),

    #[error("Erreur de stream: {0}")]
    StreamError(String),

    #[error("Microphone non initialisé")]
    NotInitialized,

    #[error("Capture interrompue")]
    Interrupted,
}

/// Source de blocs audio consommée par le moniteur
#[cfg_attr(test, mockall::automock)]
pub trait BlockSource {
    /// Bloque jusqu'au prochain bloc complet
    fn read_block(&mut self) -> Result<AudioBlock, MicrophoneError>;

    /// Jette les échantillons accumulés pendant une alerte
    fn discard_pending(&mut self);

    /// Arrête la capture et libère le périphérique
    fn close(&mut self);
}

/// Plage de configuration proposée par un périphérique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConfigCandidate {
    channels: u16,
    min_rate: u32,
    max_rate: u32,
    format: SampleFormat,
}

/// Choisit le format d'échantillon à demander au périphérique
///
/// i16 natif si disponible, sinon le premier format offert au même taux et
/// au même nombre de canaux (converti en i16 dans le callback).
fn choose_sample_format(
    candidates: &[ConfigCandidate],
    channels: u16,
    sample_rate: u32,
) -> Option<SampleFormat> {
    let matching: Vec<SampleFormat> = candidates
        .iter()
        .filter(|c| {
            c.channels == channels && c.min_rate <= sample_rate && sample_rate <= c.max_rate
        })
        .map(|c| c.format)
        .filter(|f| is_convertible(*f))
        .collect();

    if matching.contains(&SampleFormat::I16) {
        return Some(SampleFormat::I16);
    }
    matching.into_iter().next()
}

fn is_convertible(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::I16
            | SampleFormat::I32
            | SampleFormat::U8
            | SampleFormat::U16
            | SampleFormat::F32
            | SampleFormat::F64
    )
}

/// Stream audio depuis le microphone
pub struct AudioStream {
    stream: Option<Stream>,
    buffer: CaptureBuffer,
}

impl AudioStream {
    /// Ouvre le périphérique d'entrée par défaut et démarre la capture
    pub fn open(config: &MonitorConfig, stop: StopSignal) -> Result<Self, MicrophoneError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(MicrophoneError::NoDevice)?;

        tracing::info!(
            "Périphérique d'entrée: {}",
            device.name().unwrap_or_else(|_| "inconnu".to_string())
        );

        let candidates: Vec<ConfigCandidate> = device
            .supported_input_configs()
            .map_err(|e| MicrophoneError::ConfigError(e.to_string()))?
            .map(|range| ConfigCandidate {
                channels: range.channels(),
                min_rate: range.min_sample_rate().0,
                max_rate: range.max_sample_rate().0,
                format: range.sample_format(),
            })
            .collect();

        let format = choose_sample_format(&candidates, config.channels, config.sample_rate)
            .ok_or_else(|| {
                MicrophoneError::ConfigError(format!(
                    "aucune configuration {}Hz {}ch supportée",
                    config.sample_rate, config.channels
                ))
            })?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        tracing::info!(
            "Configuration capture: {}Hz {}ch {:?} -> i16, blocs de {}",
            config.sample_rate,
            config.channels,
            format,
            config.block_size
        );

        let (writer, buffer) = CaptureBuffer::new(
            config.buffer_capacity(),
            config.block_size,
            config.poll_interval,
            stop,
        );

        let stream = match format {
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, writer),
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, writer),
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, writer),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, writer),
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, writer),
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, writer),
            other => Err(MicrophoneError::ConfigError(format!(
                "format non supporté: {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| MicrophoneError::StreamError(e.to_string()))?;
        tracing::info!("Capture audio démarrée");

        Ok(Self {
            stream: Some(stream),
            buffer,
        })
    }

    /// Lit le prochain bloc complet
    pub fn read_block(&mut self) -> Result<AudioBlock, MicrophoneError> {
        if self.stream.is_none() {
            return Err(MicrophoneError::NotInitialized);
        }
        self.buffer.read_block()
    }

    /// Arrête la capture et libère le périphérique
    ///
    /// Idempotent : les appels suivants sont sans effet.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::warn!("Arrêt du stream: {}", e);
            }
            drop(stream);
            tracing::info!("Capture audio arrêtée");
        }
    }

    /// Liste les périphériques d'entrée disponibles
    pub fn list_devices() -> Vec<String> {
        let host = cpal::default_host();
        host.input_devices()
            .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
            .unwrap_or_default()
    }
}

impl BlockSource for AudioStream {
    fn read_block(&mut self) -> Result<AudioBlock, MicrophoneError> {
        AudioStream::read_block(self)
    }

    fn discard_pending(&mut self) {
        let discarded = self.buffer.clear();
        if discarded > 0 {
            tracing::debug!(discarded, "Échantillons capturés pendant l'alerte ignorés");
        }
    }

    fn close(&mut self) {
        AudioStream::close(self)
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        self.close();
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut writer: CaptureWriter,
) -> Result<Stream, MicrophoneError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                writer.push(data);
            },
            |err| {
                tracing::error!("Erreur stream audio: {}", err);
            },
            None,
        )
        .map_err(|e| MicrophoneError::StreamError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        channels: u16,
        min_rate: u32,
        max_rate: u32,
        format: SampleFormat,
    ) -> ConfigCandidate {
        ConfigCandidate {
            channels,
            min_rate,
            max_rate,
            format,
        }
    }

    #[test]
    fn test_prefers_native_i16() {
        let candidates = [
            candidate(1, 8000, 48000, SampleFormat::F32),
            candidate(1, 8000, 48000, SampleFormat::I16),
        ];
        assert_eq!(
            choose_sample_format(&candidates, 1, 44100),
            Some(SampleFormat::I16)
        );
    }

    #[test]
    fn test_falls_back_to_convertible_format() {
        let candidates = [
            candidate(2, 8000, 48000, SampleFormat::I16),
            candidate(1, 44100, 44100, SampleFormat::F32),
        ];
        assert_eq!(
            choose_sample_format(&candidates, 1, 44100),
            Some(SampleFormat::F32)
        );
    }

    #[test]
    fn test_rejects_unmatched_rate_or_channels() {
        let candidates = [
            candidate(2, 8000, 48000, SampleFormat::I16),
            candidate(1, 48000, 48000, SampleFormat::I16),
        ];
        assert_eq!(choose_sample_format(&candidates, 1, 44100), None);
    }
}

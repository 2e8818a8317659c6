//! Buffer de capture entre le callback cpal et la boucle de lecture
//!
//! Le callback audio écrit dans un ring buffer SPSC, la boucle en extrait des
//! blocs de taille fixe. Un buffer plein perd les échantillons excédentaires
//! sans erreur.

use super::block::AudioBlock;
use super::microphone::MicrophoneError;
use crate::signal::StopSignal;
use cpal::{FromSample, Sample};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Côté écriture, déplacé dans le callback de capture
pub struct CaptureWriter {
    producer: HeapProd<i16>,
    dropped: Arc<AtomicUsize>,
}

impl CaptureWriter {
    /// Convertit et pousse les échantillons du périphérique
    ///
    /// N'alloue pas et ne bloque pas : appelé depuis le thread audio.
    pub fn push<T>(&mut self, data: &[T])
    where
        T: Sample,
        i16: FromSample<T>,
    {
        let mut dropped = 0;
        for &sample in data {
            if self.producer.try_push(i16::from_sample(sample)).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            self.dropped.fetch_add(dropped, Ordering::Relaxed);
        }
    }
}

/// Côté lecture, possédé par le flux de capture
pub struct CaptureBuffer {
    consumer: HeapCons<i16>,
    dropped: Arc<AtomicUsize>,
    block_size: usize,
    poll_interval: Duration,
    stop: StopSignal,
}

impl CaptureBuffer {
    /// Crée la paire écriture/lecture autour d'un ring buffer de `capacity`
    /// échantillons
    pub fn new(
        capacity: usize,
        block_size: usize,
        poll_interval: Duration,
        stop: StopSignal,
    ) -> (CaptureWriter, Self) {
        let rb = HeapRb::<i16>::new(capacity.max(block_size));
        let (producer, consumer) = rb.split();
        let dropped = Arc::new(AtomicUsize::new(0));

        let writer = CaptureWriter {
            producer,
            dropped: Arc::clone(&dropped),
        };
        let reader = Self {
            consumer,
            dropped,
            block_size,
            poll_interval,
            stop,
        };
        (writer, reader)
    }

    /// Attend qu'un bloc complet soit disponible et le retourne
    ///
    /// Retourne `Interrupted` dès que le signal d'arrêt est levé.
    pub fn read_block(&mut self) -> Result<AudioBlock, MicrophoneError> {
        loop {
            if self.stop.is_stopped() {
                return Err(MicrophoneError::Interrupted);
            }

            self.report_overflow();

            if self.consumer.occupied_len() >= self.block_size {
                let mut samples = vec![0i16; self.block_size];
                let read = self.consumer.pop_slice(&mut samples);
                samples.truncate(read);
                return Ok(AudioBlock::new(samples));
            }

            thread::sleep(self.poll_interval);
        }
    }

    /// Vide le buffer, retourne le nombre d'échantillons jetés
    pub fn clear(&mut self) -> usize {
        self.take_dropped();
        self.consumer.clear()
    }

    /// Nombre d'échantillons perdus depuis le dernier rapport
    pub fn take_dropped(&self) -> usize {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    fn report_overflow(&self) {
        let dropped = self.take_dropped();
        if dropped > 0 {
            tracing::debug!(dropped, "Buffer de capture plein, échantillons perdus");
        }
    }
}

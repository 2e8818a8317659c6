//! Module de capture audio
//!
//! Gère la capture du microphone et le découpage en blocs de taille fixe.

mod block;
mod buffer;
mod microphone;

pub use block::AudioBlock;
pub use microphone::{AudioStream, BlockSource, MicrophoneError};

#[cfg(test)]
pub use microphone::MockBlockSource;

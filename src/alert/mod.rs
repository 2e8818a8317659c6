//! Module d'alerte sonore
//!
//! Charge le fichier WAV d'alerte et le joue sur la sortie par défaut.

mod player;

pub use player::{AlertPlayer, AlertSink};

#[cfg(test)]
pub use player::MockAlertSink;

//! Sentinelle - Alarme sonore sur dépassement de niveau
//!
//! Écoute le microphone en continu et joue `alarm.wav` dès qu'un bloc
//! dépasse le seuil d'énergie. S'arrête sur Ctrl-C.

mod alert;
mod audio;
mod config;
mod monitor;
mod signal;

use alert::AlertPlayer;
use anyhow::Context;
use audio::AudioStream;
use config::MonitorConfig;
use monitor::Monitor;
use signal::StopSignal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentinelle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Sentinelle v{}", env!("CARGO_PKG_VERSION"));

    let devices = AudioStream::list_devices();
    tracing::debug!("Périphériques audio détectés: {:?}", devices);

    let config = MonitorConfig::default();
    let stop = StopSignal::new();
    stop.install_ctrlc().context("Impossible d'installer le handler Ctrl-C")?;

    // Seule erreur fatale : le périphérique d'entrée ne peut pas être ouvert
    let source = AudioStream::open(&config, stop.clone())
        .context("Périphérique d'entrée indisponible")?;
    let player = AlertPlayer::new(stop, config.poll_interval);

    let mut monitor = Monitor::new(source, player, config);
    let summary = monitor.run()?;

    tracing::info!(
        blocks = summary.blocks_read,
        alerts = summary.alerts_played,
        loudest = summary.loudest,
        "Surveillance arrêtée"
    );
    Ok(())
}

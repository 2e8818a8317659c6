//! Module de surveillance
//!
//! Relie la capture audio à l'alerte.

mod watcher;

pub use watcher::{Monitor, MonitorError, MonitorState, MonitorSummary};

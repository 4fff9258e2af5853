//! Debounced autosave of the open note.
//!
//! The scheduler is a free-standing task watching the store. Any edit, or a
//! different note being opened, restarts the countdown; when the countdown
//! runs out the open note is saved, but only if its content hash differs
//! from the last saved one. Nothing is scheduled while no note is open.
//! Ticks are serialized: the countdown is not re-armed until the previous
//! save has returned.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, warn};

use marknote_core::{defaults, Error, NoteGateway, Result};

use crate::store::{NoteStore, StoreState};

/// Autosave settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before a save fires.
    pub period: Duration,
    pub enabled: bool,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            period: defaults::AUTOSAVE_PERIOD,
            enabled: true,
        }
    }
}

impl AutosaveConfig {
    /// Load from `MARKNOTE_AUTOSAVE_SECS` and `MARKNOTE_AUTOSAVE_ENABLED`.
    pub fn from_env() -> Self {
        let secs = std::env::var("MARKNOTE_AUTOSAVE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults::AUTOSAVE_PERIOD_SECS);
        let enabled = std::env::var("MARKNOTE_AUTOSAVE_ENABLED")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        Self {
            period: Duration::from_secs(secs),
            enabled,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.period.is_zero() {
            return Err(Error::Config("autosave period must be positive".into()));
        }
        Ok(())
    }
}

/// What the scheduler is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutosavePhase {
    /// No note is open.
    #[default]
    Idle,
    /// A note is open: counting down to the next tick, or waiting for the
    /// next edit after one.
    Armed,
    /// A save is in flight.
    Saving,
}

/// Observable scheduler state, suitable for a "saved at" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutosaveStatus {
    pub phase: AutosavePhase,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Handle to a running scheduler. Dropping it stops the scheduler.
pub struct AutosaveHandle {
    shutdown_tx: mpsc::Sender<()>,
    status_rx: watch::Receiver<AutosaveStatus>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    pub fn status(&self) -> AutosaveStatus {
        *self.status_rx.borrow()
    }

    /// Observe status changes.
    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status_rx.clone()
    }

    /// Stop the scheduler and wait for it to exit. A save already in flight
    /// is allowed to finish.
    pub async fn shutdown(self) -> Result<()> {
        // The task may already be gone if the store was dropped.
        let _ = self.shutdown_tx.send(()).await;
        self.task
            .await
            .map_err(|e| Error::transport(format!("autosave task failed: {}", e)))
    }
}

/// Autosave task builder.
pub struct AutosaveScheduler<G> {
    store: Arc<NoteStore<G>>,
    config: AutosaveConfig,
}

impl<G: NoteGateway + 'static> AutosaveScheduler<G> {
    pub fn new(store: Arc<NoteStore<G>>, config: AutosaveConfig) -> Self {
        Self { store, config }
    }

    /// Spawn the scheduler on the current tokio runtime.
    pub fn start(self) -> AutosaveHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (status_tx, status_rx) = watch::channel(AutosaveStatus::default());
        let state_rx = self.store.subscribe();

        let task = tokio::spawn(async move {
            self.run(state_rx, shutdown_rx, status_tx).await;
        });

        AutosaveHandle {
            shutdown_tx,
            status_rx,
            task,
        }
    }

    #[instrument(skip_all, fields(subsystem = "autosave", component = "scheduler"))]
    async fn run(
        self,
        mut state_rx: watch::Receiver<StoreState>,
        mut shutdown_rx: mpsc::Receiver<()>,
        status_tx: watch::Sender<AutosaveStatus>,
    ) {
        if !self.config.enabled {
            info!("Autosave is disabled, not starting");
            return;
        }
        info!(period_ms = self.config.period.as_millis() as u64, "Autosave started");

        // (open note id, revision) the current countdown belongs to.
        let mut armed_for: Option<(String, u64)> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            {
                let state = state_rx.borrow_and_update();
                match state.open_note_id() {
                    None => {
                        armed_for = None;
                        deadline = None;
                    }
                    Some(note_id) => {
                        let current = (note_id.to_string(), state.revision);
                        if armed_for.as_ref() != Some(&current) {
                            armed_for = Some(current);
                            deadline = Some(Instant::now() + self.config.period);
                        }
                    }
                }
                let phase = if armed_for.is_some() {
                    AutosavePhase::Armed
                } else {
                    AutosavePhase::Idle
                };
                publish(&status_tx, phase, state.last_saved_at);
            }

            match deadline {
                None => {
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        changed = state_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
                Some(at) => {
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        changed = state_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                        _ = sleep_until(at) => {
                            deadline = if self.tick(&status_tx).await {
                                None
                            } else {
                                Some(Instant::now() + self.config.period)
                            };
                        }
                    }
                }
            }
        }

        info!("Autosave stopped");
    }

    /// Save the open note if its content changed. Returns `false` when a save
    /// was attempted and failed, so the caller can try again next period.
    async fn tick(&self, status_tx: &watch::Sender<AutosaveStatus>) -> bool {
        if !self.store.has_unsaved_changes() {
            debug!(op = "tick", "Content unchanged since last save, skipping");
            return true;
        }

        publish(status_tx, AutosavePhase::Saving, self.store.last_saved_at());
        match self.store.save_from_autosave().await {
            Ok(_) => true,
            Err(e) => {
                warn!(op = "tick", error = %e, "Autosave failed");
                publish(status_tx, AutosavePhase::Armed, self.store.last_saved_at());
                // A read-only note will never save; wait for the next edit.
                matches!(e, Error::Permission(_))
            }
        }
    }
}

fn publish(
    status_tx: &watch::Sender<AutosaveStatus>,
    phase: AutosavePhase,
    last_saved_at: Option<DateTime<Utc>>,
) {
    status_tx.send_if_modified(|status| {
        let next = AutosaveStatus {
            phase,
            last_saved_at,
        };
        if *status == next {
            return false;
        }
        *status = next;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutosaveConfig::default();
        assert_eq!(config.period, Duration::from_secs(5));
        assert!(config.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_period_is_invalid() {
        let config = AutosaveConfig::default().with_period(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_publish_skips_identical_status() {
        let (tx, mut rx) = watch::channel(AutosaveStatus::default());
        rx.borrow_and_update();
        publish(&tx, AutosavePhase::Idle, None);
        assert!(!rx.has_changed().unwrap());
        publish(&tx, AutosavePhase::Armed, None);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().phase, AutosavePhase::Armed);
    }
}

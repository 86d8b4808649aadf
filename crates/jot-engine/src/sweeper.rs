//! Background trash sweeper.
//!
//! Periodically purges notes whose trash retention window has expired.
//! Purging is a single bulk operation against the store, so a sweep racing
//! a restore can never delete a note that was brought back in time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{error, info};

use jot_core::{
    defaults::{SWEEP_INTERVAL_SECS, TRASH_RETENTION_DAYS},
    Error, NoteStore, Result,
};

/// Capacity of the sweeper event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for the trash sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Interval between sweep passes.
    pub interval: Duration,
    /// Days a trashed note is retained before it may be purged.
    pub retention_days: i64,
    /// Whether to run sweeps at all.
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(SWEEP_INTERVAL_SECS),
            retention_days: TRASH_RETENTION_DAYS,
            enabled: true,
        }
    }
}

impl SweeperConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `TRASH_SWEEP_ENABLED` | `true` | Enable/disable background sweeps |
    /// | `TRASH_SWEEP_INTERVAL_SECS` | `3600` | Seconds between sweep passes |
    /// | `TRASH_RETENTION_DAYS` | `7` | Days before trashed notes are purged |
    pub fn from_env() -> Self {
        let enabled = std::env::var("TRASH_SWEEP_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let interval_secs = std::env::var("TRASH_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(SWEEP_INTERVAL_SECS)
            .max(1);

        let retention_days = std::env::var("TRASH_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(TRASH_RETENTION_DAYS)
            .max(0);

        Self {
            interval: Duration::from_secs(interval_secs),
            retention_days,
            enabled,
        }
    }

    /// Set the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the retention window in days.
    pub fn with_retention_days(mut self, days: i64) -> Self {
        self.retention_days = days;
        self
    }

    /// Enable or disable sweeping.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Event emitted by the sweeper.
#[derive(Debug, Clone)]
pub enum SweeperEvent {
    /// Sweeper started.
    Started,
    /// A sweep pass finished; `purged` notes were removed.
    SweepCompleted { purged: u64 },
    /// A sweep pass failed; the sweeper keeps running.
    SweepFailed { error: String },
    /// Sweeper stopped.
    Stopped,
}

/// Handle for controlling a running sweeper.
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<SweeperEvent>,
}

impl SweeperHandle {
    /// Signal the sweeper to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }

    /// Get a receiver for sweeper events.
    pub fn events(&self) -> broadcast::Receiver<SweeperEvent> {
        self.event_rx.resubscribe()
    }
}

/// Background task purging expired trash on a fixed interval.
pub struct TrashSweeper {
    store: Arc<dyn NoteStore>,
    config: SweeperConfig,
    event_tx: broadcast::Sender<SweeperEvent>,
}

impl TrashSweeper {
    /// Create a new sweeper over the given store.
    pub fn new(store: Arc<dyn NoteStore>, config: SweeperConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            config,
            event_tx,
        }
    }

    /// Start the sweeper and return a handle for control.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        SweeperHandle {
            shutdown_tx,
            event_rx,
        }
    }

    /// Run one sweep pass immediately.
    pub async fn sweep_once(&self) -> Result<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(self.config.retention_days);
        let purged = self.store.purge_expired(cutoff).await?;
        info!(
            subsystem = "engine",
            component = "sweeper",
            op = "sweep",
            purged_count = purged,
            "Trash sweep completed"
        );
        Ok(purged)
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("Trash sweeper is disabled, not starting");
            return;
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            retention_days = self.config.retention_days,
            "Trash sweeper started"
        );
        let _ = self.event_tx.send(SweeperEvent::Started);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Trash sweeper received shutdown signal");
                    break;
                }
                _ = sleep(self.config.interval) => {
                    match self.sweep_once().await {
                        Ok(purged) => {
                            let _ = self.event_tx.send(SweeperEvent::SweepCompleted { purged });
                        }
                        Err(e) => {
                            error!(
                                subsystem = "engine",
                                component = "sweeper",
                                "Trash sweep failed: {}",
                                e
                            );
                            let _ = self
                                .event_tx
                                .send(SweeperEvent::SweepFailed { error: e.to_string() });
                        }
                    }
                }
            }
        }

        let _ = self.event_tx.send(SweeperEvent::Stopped);
    }
}

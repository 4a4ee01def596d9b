//! Contact sync engine
//!
//! The SyncEngine is responsible for:
//! - Skipping passes when sync is not configured
//! - Reading the local and remote contact lists
//! - Creating local-only contacts on the remote
//! - Adding remote-only contacts to the local store
//!
//! ## Architecture
//!
//! ```text
//!                         ┌──────────────┐
//!    SyncConfig ─────────▶│  SyncEngine  │──── SyncEvent ───▶ (monitoring)
//!                         └──────────────┘
//!                                │
//!              ┌─────────────────┼─────────────────┐
//!              │                                   │
//!              ▼                                   ▼
//!     ┌─────────────────┐                ┌──────────────────┐
//!     │  ContactStore   │                │   RemoteClient   │
//!     │ (get_all / add) │                │ (fetch / create) │
//!     └─────────────────┘                └──────────────────┘
//! ```
//!
//! ## Pass Flow
//!
//! 1. Incomplete settings → `NotConfigured`, nothing touched
//! 2. Another pass in flight on this engine → `AlreadyRunning`, nothing touched
//! 3. Read local contacts, fetch remote contacts
//! 4. Remote fetch failed → `RemoteUnavailable`, nothing written
//! 5. Push local-only contacts, one create per contact, failures counted
//! 6. Add remote-only contacts locally
//!
//! Contacts present on both sides are never compared field by field.

pub mod plan;

pub use plan::ReconcilePlan;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::config::{EngineConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::traits::{ContactStore, RemoteClientFactory};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A configured pass started
    PassStarted,

    /// Pass skipped because sync settings are incomplete
    NotConfigured,

    /// Pass skipped because another one is in progress
    AlreadyRunning,

    /// Remote list could not be fetched; pass aborted without writes
    RemoteFetchFailed {
        error: String,
    },

    /// A local contact was created on the remote
    ContactPushed {
        id: Uuid,
    },

    /// Creating a local contact on the remote failed
    PushFailed {
        id: Uuid,
        error: String,
    },

    /// A remote contact was added to the local store
    ContactPulled {
        id: Uuid,
    },

    /// Pass finished
    PassCompleted {
        pushed: usize,
        push_failed: usize,
        pulled: usize,
    },
}

/// Counts and timing of a completed pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// When the pass finished
    pub finished_at: DateTime<Utc>,
    /// Local contacts created on the remote
    pub pushed: usize,
    /// Local contacts whose remote create failed (retried by the next pass)
    pub push_failed: usize,
    /// Remote contacts added to the local store
    pub pulled: usize,
}

impl SyncReport {
    fn started(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            pushed: 0,
            push_failed: 0,
            pulled: 0,
        }
    }

    /// Whether the pass wrote nothing on either side
    pub fn is_noop(&self) -> bool {
        self.pushed == 0 && self.push_failed == 0 && self.pulled == 0
    }
}

/// Result of one call to [`SyncEngine::run_sync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Server URL, username or password is empty
    NotConfigured,

    /// Another pass was in progress on the same engine
    AlreadyRunning,

    /// The remote list could not be fetched; nothing was written
    RemoteUnavailable {
        error: String,
    },

    /// The pass ran to completion
    Completed(SyncReport),
}

impl SyncOutcome {
    /// The pass report, if the pass ran to completion
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Handle to a pass started with [`SyncEngine::trigger`]
///
/// Dropping the handle does not cancel the pass.
#[derive(Debug)]
pub struct SyncHandle {
    inner: JoinHandle<Result<SyncOutcome>>,
}

impl SyncHandle {
    /// Wait for the pass to finish
    pub async fn wait(self) -> Result<SyncOutcome> {
        self.inner
            .await
            .map_err(|e| Error::Other(format!("Sync task failed: {}", e)))?
    }

    /// Whether the pass has finished
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

/// Contact sync engine
///
/// Runs presence-based reconciliation passes between a local
/// [`ContactStore`] and the remote service reached through a
/// [`RemoteClientFactory`].
///
/// ## Threading
///
/// The engine is cheap to clone; clones share the store, the factory, the
/// event channel and the in-progress token. At most one pass runs at a time
/// per engine (and its clones). Overlapping requests are coalesced into the
/// running pass and report [`SyncOutcome::AlreadyRunning`].
#[derive(Clone)]
pub struct SyncEngine {
    /// Local contact collection
    store: Arc<dyn ContactStore>,

    /// Builds a remote client from the settings of each pass
    remote_factory: Arc<dyn RemoteClientFactory>,

    /// Held for the duration of a pass
    pass_lock: Arc<Mutex<()>>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields sync events
    pub fn new(
        store: Arc<dyn ContactStore>,
        remote_factory: Arc<dyn RemoteClientFactory>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            store,
            remote_factory,
            pass_lock: Arc::new(Mutex::new(())),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one reconciliation pass and wait for it
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome)`: The pass ran, or was skipped, or the remote was
    ///   unreachable. Remote failures never surface as `Err`.
    /// - `Err(Error)`: The local store failed; the pass stopped there.
    pub async fn run_sync(&self, config: &SyncConfig) -> Result<SyncOutcome> {
        if !config.is_complete() {
            debug!("Sync not configured, skipping pass");
            self.emit_event(SyncEvent::NotConfigured);
            return Ok(SyncOutcome::NotConfigured);
        }

        let Ok(_pass_guard) = self.pass_lock.try_lock() else {
            info!("Sync pass already in progress, coalescing request");
            self.emit_event(SyncEvent::AlreadyRunning);
            return Ok(SyncOutcome::AlreadyRunning);
        };

        self.run_pass(config).await
    }

    /// Start a pass in the background
    ///
    /// The caller is never blocked. Await the returned handle to get the
    /// outcome, or drop it to let the pass finish on its own.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self, config: SyncConfig) -> SyncHandle {
        let engine = self.clone();
        let inner = tokio::spawn(async move {
            let result = engine.run_sync(&config).await;
            if let Err(ref e) = result {
                error!("Sync pass failed: {}", e);
            }
            result
        });

        SyncHandle { inner }
    }

    /// Body of a configured pass; the caller holds the pass lock
    async fn run_pass(&self, config: &SyncConfig) -> Result<SyncOutcome> {
        let mut report = SyncReport::started(Utc::now());
        self.emit_event(SyncEvent::PassStarted);
        info!("Starting sync pass against {}", config.server_base_url);

        let remote = match self.remote_factory.create(config) {
            Ok(remote) => remote,
            Err(e) => return Ok(self.remote_unavailable(e)),
        };

        let local_contacts = self.store.get_all().await?;

        let remote_contacts = match remote.fetch_all().await {
            Ok(contacts) => contacts,
            Err(e) => return Ok(self.remote_unavailable(e)),
        };

        debug!(
            "Fetched {} local and {} remote contact(s) via {}",
            local_contacts.len(),
            remote_contacts.len(),
            remote.remote_name()
        );

        let plan = ReconcilePlan::compute(local_contacts, remote_contacts);
        if plan.is_empty() {
            debug!("Identifier sets already match");
        }

        // Update remote
        for contact in &plan.to_push {
            match remote.create(contact).await {
                Ok(()) => {
                    debug!("Pushed contact {}", contact.id());
                    report.pushed += 1;
                    self.emit_event(SyncEvent::ContactPushed { id: contact.id() });
                }
                Err(e) => {
                    warn!("Failed to push contact {}: {}", contact.id(), e);
                    report.push_failed += 1;
                    self.emit_event(SyncEvent::PushFailed {
                        id: contact.id(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Update local
        for contact in &plan.to_pull {
            self.store.add(contact).await?;
            debug!("Pulled contact {}", contact.id());
            report.pulled += 1;
            self.emit_event(SyncEvent::ContactPulled { id: contact.id() });
        }

        report.finished_at = Utc::now();
        info!(
            "Sync pass finished: {} pushed, {} push failure(s), {} pulled",
            report.pushed, report.push_failed, report.pulled
        );
        self.emit_event(SyncEvent::PassCompleted {
            pushed: report.pushed,
            push_failed: report.push_failed,
            pulled: report.pulled,
        });

        Ok(SyncOutcome::Completed(report))
    }

    fn remote_unavailable(&self, error: Error) -> SyncOutcome {
        warn!("Remote contacts unavailable, aborting pass: {}", error);
        let error = error.to_string();
        self.emit_event(SyncEvent::RemoteFetchFailed {
            error: error.clone(),
        });
        SyncOutcome::RemoteUnavailable { error }
    }

    /// Emit a sync event
    fn emit_event(&self, event: SyncEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!("Event receiver dropped, event discarded");
            }
        }
    }
}

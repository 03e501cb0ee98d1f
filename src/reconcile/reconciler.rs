//! The reconciliation loop.

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::discovery::{canonicalize, EndpointSource};
use crate::error::ControllerError;
use crate::observability::metrics;
use crate::reconcile::ReconcilerState;
use crate::render::{ConfigDocument, ConfigRenderer};
use crate::store::ConfigStore;
use crate::supervisor::{ProcessExit, ProcessSupervisor};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Rendered document equals the last applied one.
    Unchanged,
    /// New document persisted; the process slot was updated.
    Applied {
        /// Completion of the instance that was replaced, if any.
        stopped: Option<ProcessExit>,
        /// Pid of the new instance, unless the pool is empty.
        started: Option<u32>,
    },
}

/// Drives resolve → render → diff → act on a fixed interval.
pub struct Reconciler<S, R> {
    pool: String,
    source: S,
    renderer: R,
    store: ConfigStore,
    interval: Duration,
    state: ReconcilerState,
}

impl<S, R> Reconciler<S, R>
where
    S: EndpointSource,
    R: ConfigRenderer,
{
    pub fn new(
        pool: impl Into<String>,
        source: S,
        renderer: R,
        store: ConfigStore,
        supervisor: ProcessSupervisor,
        interval: Duration,
    ) -> Self {
        Self {
            pool: pool.into(),
            source,
            renderer,
            store,
            interval,
            state: ReconcilerState::new(supervisor),
        }
    }

    pub fn last_applied(&self) -> &ConfigDocument {
        &self.state.last_applied
    }

    pub fn process_pid(&self) -> Option<u32> {
        self.state.process.pid()
    }

    /// One reconciliation pass.
    pub async fn tick(&mut self) -> Result<TickOutcome, ControllerError> {
        metrics::record_tick();

        let endpoints = canonicalize(self.source.resolve(&self.pool).await?);
        metrics::record_endpoints(&self.pool, endpoints.len());

        let document = if endpoints.is_empty() {
            ConfigDocument::empty()
        } else {
            self.renderer.render(&endpoints)?
        };

        if document == self.state.last_applied {
            tracing::trace!(pool = %self.pool, "Endpoints unchanged");
            return Ok(TickOutcome::Unchanged);
        }

        tracing::info!(
            pool = %self.pool,
            endpoints = endpoints.len(),
            bytes = document.len(),
            "Endpoints changed, writing new config"
        );
        self.store.persist(&document).await?;
        metrics::record_config_change();

        let stopped = self.state.process.stop().await;

        let started = if document.is_empty() {
            tracing::info!(pool = %self.pool, "No endpoints available, proxy stays down");
            None
        } else {
            Some(self.state.process.start(self.store.path())?)
        };

        self.state.last_applied = document;
        Ok(TickOutcome::Applied { stopped, started })
    }

    /// Run until a fatal condition, then kill the process and return the cause.
    ///
    /// The first tick fires immediately.
    pub async fn run(mut self) -> ControllerError {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            pool = %self.pool,
            interval_secs = self.interval.as_secs_f64(),
            config = %self.store.path().display(),
            "Reconciler starting"
        );

        let error = loop {
            tokio::select! {
                biased;
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        break e;
                    }
                }
                exit = self.state.process.wait_exit() => {
                    tracing::error!(pid = exit.pid, outcome = %exit.outcome, "Supervised process died");
                    break ControllerError::ProcessCrash {
                        pid: exit.pid,
                        outcome: exit.outcome,
                    };
                }
            }
        };

        self.state.process.stop().await;
        error
    }
}

//! Periodic integrity monitor.
//!
//! Runs every configured [`IntegrityCheck`] on a fixed interval. A failed
//! check is logged and retried on the next tick; it never stops the loop.

use crate::context::AppContext;
use crate::error::SdkError;
use crate::integrity::{IntegrityCheck, ValidationOutcome};
use crate::stream::StreamKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type RoundResult = Vec<(StreamKind, Result<ValidationOutcome, SdkError>)>;

pub struct IntegrityMonitor {
    ctx: Arc<AppContext>,
    checks: Vec<IntegrityCheck>,
    interval: Duration,
}

impl IntegrityMonitor {
    /// Monitor running the unscoped check for every entity kind.
    pub fn new(ctx: Arc<AppContext>, interval: Duration) -> Self {
        Self {
            ctx,
            checks: IntegrityCheck::all(),
            interval,
        }
    }

    pub fn with_checks(mut self, checks: Vec<IntegrityCheck>) -> Self {
        self.checks = checks;
        self
    }

    pub fn checks(&self) -> &[IntegrityCheck] {
        &self.checks
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Run each check once, in order.
    pub async fn run_once(&self) -> RoundResult {
        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let kind = check.kind();
            let result = check.validate(&self.ctx).await;
            if let Err(e) = &result {
                tracing::warn!(kind = %kind, error = %e, "Integrity check failed");
            }
            results.push((kind, result));
        }
        results
    }

    /// Start the loop on the current tokio runtime. The first round runs
    /// one interval after spawning. A zero interval is rejected.
    pub fn spawn(self) -> Result<MonitorHandle, SdkError> {
        if self.interval.is_zero() {
            return Err(SdkError::Validation(
                "integrity monitor interval must be non-zero".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| SdkError::Other("integrity monitor needs a tokio runtime".to_string()))?;

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let results = self.run_once().await;
                let resynced = results
                    .iter()
                    .filter(|(_, r)| matches!(r, Ok(o) if o.is_resynced()))
                    .count();
                if resynced > 0 {
                    tracing::info!(resynced, "Integrity round resynced caches");
                }
            }
        });

        Ok(MonitorHandle { task })
    }
}

impl std::fmt::Debug for IntegrityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrityMonitor")
            .field("checks", &self.checks)
            .field("interval", &self.interval)
            .finish()
    }
}

/// Owns the monitor task; dropping it stops the loop.
#[derive(Debug)]
pub struct MonitorHandle {
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

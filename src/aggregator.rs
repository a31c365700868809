//! Orchestration of every registered source into one report.
//!
//! The [`Aggregator`] invokes each source adapter, isolates failures and
//! assembles an [`AggregateReport`]. It never fails: a run where every source
//! fails still produces a report, with `successCount = 0`.
//!
//! # Execution
//!
//! - Each invocation runs in its own tokio task under its own timeout, so a
//!   slow, failing or panicking adapter cannot affect its siblings. Dropping
//!   the [`Aggregator::run`] future aborts every task still in flight.
//! - With `concurrency == 1` sources run one after another, separated by the
//!   configured courtesy delay.
//! - With `concurrency > 1` up to that many run at once; the delay is not
//!   used. Outcomes are put back into registration order before the report
//!   is built, so completion order never leaks into it.
//!
//! # Logging
//!
//! The aggregator carries the parent [`Span`] it was built with; every
//! invocation runs in a child `source` span under it.

use crate::error::SourceError;
use crate::models::{AggregateReport, SourceOutcome};
use crate::sources::SourceAdapter;
use chrono::Utc;
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{Instrument, Span, debug, info, info_span, warn};

/// Default per-invocation time budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Problems detected while registering sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("source {0:?} is registered more than once")]
    DuplicateSource(String),

    #[error("source names must not be empty")]
    EmptyName,
}

struct Registration {
    name: String,
    adapter: Arc<dyn SourceAdapter>,
}

/// Builder for an [`Aggregator`].
pub struct AggregatorBuilder {
    sources: Vec<Registration>,
    names: HashSet<String>,
    timeout: Duration,
    delay: Duration,
    concurrency: usize,
    span: Option<Span>,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            names: HashSet::new(),
            timeout: DEFAULT_TIMEOUT,
            delay: Duration::ZERO,
            concurrency: 1,
            span: None,
        }
    }
}

impl AggregatorBuilder {
    /// Register `adapter` under `name`. Registration order is report order.
    pub fn register(
        mut self,
        name: impl Into<String>,
        adapter: Arc<dyn SourceAdapter>,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if !self.names.insert(name.clone()) {
            return Err(RegistrationError::DuplicateSource(name));
        }
        self.sources.push(Registration { name, adapter });
        Ok(self)
    }

    /// Register an adapter under its own name.
    pub fn register_adapter(self, adapter: impl SourceAdapter + 'static) -> Result<Self, RegistrationError> {
        let name = adapter.name().to_string();
        self.register(name, Arc::new(adapter))
    }

    /// Time budget for each invocation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pause between sequential invocations.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Maximum number of invocations in flight. Zero is treated as one.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Parent span for all logging done by the aggregator.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Aggregator {
        Aggregator {
            sources: self.sources,
            timeout: self.timeout,
            delay: self.delay,
            concurrency: self.concurrency,
            span: self.span.unwrap_or_else(|| info_span!("aggregate")),
        }
    }
}

/// Runs every registered source and builds the report.
pub struct Aggregator {
    sources: Vec<Registration>,
    timeout: Duration,
    delay: Duration,
    concurrency: usize,
    span: Span,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Aborts the task when dropped; a no-op once it has finished.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Invoke one adapter in its own task and record exactly one outcome.
async fn invoke(name: String, adapter: Arc<dyn SourceAdapter>, budget: Duration) -> SourceOutcome {
    let t0 = Instant::now();
    let mut task = AbortOnDrop(tokio::spawn(
        async move { timeout(budget, adapter.fetch()).await }.instrument(Span::current()),
    ));

    let result = match (&mut task.0).await {
        Ok(Ok(fetched)) => fetched,
        Ok(Err(_elapsed)) => Err(SourceError::Timeout(budget)),
        Err(join) if join.is_panic() => Err(SourceError::Panicked(panic_message(join.into_panic()))),
        Err(join) => Err(SourceError::Panicked(join.to_string())),
    };
    let fetched_at = Utc::now();
    let elapsed_ms = t0.elapsed().as_millis() as u64;

    match result {
        Ok(fetched) if fetched.synthetic => {
            warn!(count = fetched.items.len(), elapsed_ms, "Recorded canned items as synthetic");
            SourceOutcome::synthetic(name, fetched.items, fetched_at)
        }
        Ok(fetched) => {
            info!(count = fetched.items.len(), elapsed_ms, "Source succeeded");
            SourceOutcome::success(name, fetched.items, fetched_at)
        }
        Err(e) => {
            warn!(error = %e, kind = e.kind(), elapsed_ms, "Source failed");
            SourceOutcome::failure(name, e.to_string(), fetched_at)
        }
    }
}

impl Aggregator {
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    /// Registered source names, in registration order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn invocation(&self, index: usize) -> impl Future<Output = (usize, SourceOutcome)> + Send + 'static {
        let reg = &self.sources[index];
        let span = info_span!(parent: &self.span, "source", name = %reg.name);
        invoke(reg.name.clone(), Arc::clone(&reg.adapter), self.timeout)
            .instrument(span)
            .map(move |outcome| (index, outcome))
    }

    /// Invoke every source and assemble the report.
    pub async fn run(&self) -> AggregateReport {
        let t0 = Instant::now();
        info!(
            parent: &self.span,
            sources = self.sources.len(),
            concurrency = self.concurrency,
            timeout_ms = self.timeout.as_millis() as u64,
            "Starting aggregation"
        );

        let mut outcomes: Vec<(usize, SourceOutcome)> = if self.concurrency <= 1 {
            let mut done = Vec::with_capacity(self.sources.len());
            for index in 0..self.sources.len() {
                if index > 0 && !self.delay.is_zero() {
                    debug!(parent: &self.span, delay_ms = self.delay.as_millis() as u64, "Throttling before next source");
                    sleep(self.delay).await;
                }
                done.push(self.invocation(index).await);
            }
            done
        } else {
            stream::iter((0..self.sources.len()).map(|index| self.invocation(index)))
                .buffer_unordered(self.concurrency)
                .collect()
                .await
        };

        outcomes.sort_by_key(|(index, _)| *index);
        let report = AggregateReport::assemble(
            outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            Utc::now(),
        );

        info!(
            parent: &self.span,
            total_items = report.total_items(),
            succeeded = report.success_count(),
            failed = report.failure_count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        report
    }
}

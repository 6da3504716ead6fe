use chrono::{DateTime, Utc};
use radar_core::{
    normalize_ticker, AnalysisBackend, Candidate, JobPhase, JobStatus, RadarError, RadarResult,
    TickerAnalysis,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};

use crate::poller::PollHandle;
use crate::reconciler::{ResultMode, SelectionReconciler};

const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Delay between status polls while a job is running
    pub poll_interval: Duration,
    /// Caller-side limit applied to every backend request
    pub request_timeout: Duration,
}

impl ControllerConfig {
    /// Read `RADAR_POLL_INTERVAL_MS` and `RADAR_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let poll_ms = std::env::var("RADAR_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|ms: &u64| *ms > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let timeout_secs = std::env::var("RADAR_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            poll_interval: Duration::from_millis(poll_ms),
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Point-in-time view of job progress and the candidate set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub phase: JobPhase,
    pub progress: u8,
    pub candidates: Vec<Candidate>,
    pub macro_regime: Option<String>,
    pub selected: Option<String>,
    pub mode: ResultMode,
    pub epoch: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn selection(&self) -> Option<&Candidate> {
        let ticker = self.selected.as_deref()?;
        self.candidates.iter().find(|c| c.ticker == ticker)
    }

    pub fn is_running(&self) -> bool {
        self.phase == JobPhase::Running
    }
}

/// Mutable state shared by the controller and its poll loop
struct DashboardState {
    phase: JobPhase,
    progress: u8,
    reconciler: SelectionReconciler,
    /// Bumped by every action that supersedes in-flight work
    epoch: u64,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl DashboardState {
    fn publish(&self) {
        self.snapshots.send_replace(DashboardSnapshot {
            phase: self.phase,
            progress: self.progress,
            candidates: self.reconciler.candidates().to_vec(),
            macro_regime: self.reconciler.macro_regime().map(str::to_string),
            selected: self.reconciler.selected_ticker().map(str::to_string),
            mode: self.reconciler.mode(),
            epoch: self.epoch,
            updated_at: Some(Utc::now()),
        });
    }

    fn go_idle(&mut self) {
        self.phase = JobPhase::Idle;
        self.progress = 0;
    }

    /// Apply one poll response. Returns whether polling should continue.
    fn apply_poll(&mut self, response: RadarResult<JobStatus>) -> bool {
        let status = match response {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Status poll failed, resetting job to idle: {}", e);
                self.go_idle();
                return false;
            }
        };

        self.phase = status.phase;
        self.progress = status.progress.min(100);

        match status.phase {
            JobPhase::Running => {
                tracing::debug!("Batch analysis running ({}%)", status.progress);
                true
            }
            JobPhase::Completed => {
                match status.batch.filter(|b| !b.is_empty()) {
                    Some(batch) => {
                        tracing::info!("Batch analysis completed with {} candidates", batch.len());
                        self.reconciler.replace_with_batch(batch);
                    }
                    None => tracing::info!("Batch analysis completed without candidates"),
                }
                false
            }
            JobPhase::Failed => {
                tracing::warn!("Batch analysis failed on the server ({}%)", status.progress);
                false
            }
            JobPhase::Idle => {
                tracing::info!("Server reports no running job; polling stopped");
                false
            }
        }
    }
}

/// Batch job state machine: `Idle -> Running -> Completed | Failed`.
///
/// While `Running`, a single owned poll loop fetches `/api/status` every
/// `poll_interval`. Every superseding action (`start`, `run_single`, `reset`)
/// cancels the loop and bumps the epoch; responses from an older epoch are
/// discarded instead of applied.
pub struct JobPollingController<B: AnalysisBackend + 'static> {
    backend: Arc<B>,
    config: ControllerConfig,
    state: Arc<Mutex<DashboardState>>,
    poller: Mutex<Option<PollHandle>>,
    snapshots: watch::Receiver<DashboardSnapshot>,
}

impl<B: AnalysisBackend + 'static> JobPollingController<B> {
    pub fn new(backend: Arc<B>, config: ControllerConfig) -> Self {
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        let state = DashboardState {
            phase: JobPhase::Idle,
            progress: 0,
            reconciler: SelectionReconciler::new(),
            epoch: 0,
            snapshots: tx,
        };

        Self {
            backend,
            config,
            state: Arc::new(Mutex::new(state)),
            poller: Mutex::new(None),
            snapshots: rx,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(PollHandle::is_active)
    }

    /// Start a batch analysis of the top `top_n` tickers.
    ///
    /// The job only enters `Running` after the backend acknowledges the request.
    pub async fn start(&self, top_n: u32) -> RadarResult<()> {
        if top_n == 0 {
            return Err(RadarError::Validation("top_n must be at least 1".to_string()));
        }

        let epoch = self.supersede().await;
        let result = with_timeout(self.config.request_timeout, self.backend.start_job(top_n)).await;

        let mut slot = self.poller.lock().await;
        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!("Discarding start acknowledgment from epoch {}", epoch);
            return Err(RadarError::Superseded);
        }

        if let Err(e) = result {
            tracing::warn!("Failed to start batch analysis: {}", e);
            state.go_idle();
            state.publish();
            return Err(e);
        }

        state.phase = JobPhase::Running;
        state.progress = 0;
        state.reconciler.clear();
        state.publish();
        tracing::info!("Batch analysis started (top_n={}, epoch={})", top_n, epoch);

        *slot = Some(PollHandle::spawn(
            epoch,
            poll_loop(
                Arc::clone(&self.backend),
                Arc::clone(&self.state),
                epoch,
                self.config.clone(),
            ),
        ));
        Ok(())
    }

    /// Analyze one ticker and show it alone, overriding any batch job.
    ///
    /// Polling stops as soon as the query is issued. If another action supersedes
    /// the query before it returns, the result is discarded with `Superseded`.
    pub async fn run_single(&self, ticker: &str) -> RadarResult<Candidate> {
        let ticker = normalize_ticker(ticker)?;
        let epoch = self.supersede().await;

        let result = with_timeout(
            self.config.request_timeout,
            self.backend.fetch_single_ticker_analysis(&ticker),
        )
        .await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!("Discarding stale single-ticker result for {}", ticker);
            return Err(RadarError::Superseded);
        }

        let TickerAnalysis {
            candidate,
            macro_regime,
        } = result?;

        state.go_idle();
        state.reconciler.replace_with_single(candidate.clone(), macro_regime);
        state.publish();
        tracing::info!("Single-ticker analysis loaded for {}", candidate.ticker);
        Ok(candidate)
    }

    /// Select a ticker from the current candidate set.
    pub async fn select(&self, ticker: &str) -> RadarResult<Candidate> {
        let mut state = self.state.lock().await;
        let selected = state.reconciler.select(ticker)?.clone();
        state.publish();
        Ok(selected)
    }

    /// Return to `Idle` with an empty candidate set.
    pub async fn reset(&self) {
        self.supersede().await;
        let mut state = self.state.lock().await;
        state.go_idle();
        state.reconciler.clear();
        state.publish();
    }

    /// Stop polling without touching the candidate set.
    pub async fn shutdown(&self) {
        self.supersede().await;
    }

    /// Cancel the poll loop and open a new epoch. A running job drops to `Idle`
    /// since nothing will poll it any more.
    async fn supersede(&self) -> u64 {
        let mut slot = self.poller.lock().await;
        if let Some(handle) = slot.take() {
            tracing::debug!("Cancelling poll loop from epoch {}", handle.epoch());
        }

        let mut state = self.state.lock().await;
        state.epoch += 1;
        if state.phase == JobPhase::Running {
            state.go_idle();
        }
        state.publish();
        state.epoch
    }
}

async fn poll_loop<B: AnalysisBackend + 'static>(
    backend: Arc<B>,
    state: Arc<Mutex<DashboardState>>,
    epoch: u64,
    config: ControllerConfig,
) {
    let mut timer = tokio::time::interval_at(Instant::now() + config.poll_interval, config.poll_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        let response = with_timeout(config.request_timeout, backend.fetch_status()).await;

        let mut guard = state.lock().await;
        if guard.epoch != epoch {
            tracing::debug!("Discarding status response from stale epoch {}", epoch);
            return;
        }

        let keep_polling = guard.apply_poll(response);
        guard.publish();
        if !keep_polling {
            return;
        }
    }
}

/// Bound a backend call; expiry is reported as a network error.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    request: impl Future<Output = RadarResult<T>>,
) -> RadarResult<T> {
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(RadarError::Network(format!(
            "request timed out after {}ms",
            limit.as_millis()
        ))),
    }
}

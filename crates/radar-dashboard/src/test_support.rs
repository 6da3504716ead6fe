use async_trait::async_trait;
use radar_core::{
    AnalysisBackend, Candidate, DimensionScores, ForecastSeries, JobPhase, JobStatus, RadarError,
    RadarResult, TickerAnalysis,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn candidate(ticker: &str) -> Candidate {
    Candidate {
        ticker: ticker.to_string(),
        company_name: format!("{} Inc.", ticker),
        current_price: Some(150.0),
        sector: Some("Technology".to_string()),
        fusion_score: Some(72.5),
        dimension_scores: DimensionScores {
            macro_score: Some(60.0),
            fundamental: Some(80.0),
            quant: Some(70.0),
            timing: Some(75.0),
        },
    }
}

pub(crate) fn running(progress: u8) -> JobStatus {
    JobStatus::new(JobPhase::Running, progress)
}

/// In-memory backend answering from scripted queues, counting calls.
///
/// Once the status queue is drained every poll reports `RUNNING 10%`.
pub(crate) struct ScriptedBackend {
    starts: Mutex<VecDeque<RadarResult<()>>>,
    statuses: Mutex<VecDeque<RadarResult<JobStatus>>>,
    singles: Mutex<HashMap<String, RadarResult<TickerAnalysis>>>,
    forecasts: Mutex<HashMap<String, RadarResult<ForecastSeries>>>,
    start_calls: AtomicUsize,
    status_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
    status_delay: Duration,
    single_delay: Duration,
    forecast_delay: Duration,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            starts: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            singles: Mutex::new(HashMap::new()),
            forecasts: Mutex::new(HashMap::new()),
            start_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
            status_delay: Duration::ZERO,
            single_delay: Duration::ZERO,
            forecast_delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub(crate) fn with_single_delay(mut self, delay: Duration) -> Self {
        self.single_delay = delay;
        self
    }

    pub(crate) fn with_forecast_delay(mut self, delay: Duration) -> Self {
        self.forecast_delay = delay;
        self
    }

    pub(crate) fn push_start(&self, result: RadarResult<()>) {
        self.starts.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_status(&self, result: RadarResult<JobStatus>) {
        self.statuses.lock().unwrap().push_back(result);
    }

    pub(crate) fn set_single(&self, ticker: &str, result: RadarResult<TickerAnalysis>) {
        self.singles.lock().unwrap().insert(ticker.to_string(), result);
    }

    pub(crate) fn set_forecast(&self, ticker: &str, result: RadarResult<ForecastSeries>) {
        self.forecasts.lock().unwrap().insert(ticker.to_string(), result);
    }

    pub(crate) fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn start_job(&self, _top_n: u32) -> RadarResult<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.starts.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(()))
    }

    async fn fetch_status(&self) -> RadarResult<JobStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        let scripted = self.statuses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(running(10)))
    }

    async fn fetch_single_ticker_analysis(&self, ticker: &str) -> RadarResult<TickerAnalysis> {
        if !self.single_delay.is_zero() {
            tokio::time::sleep(self.single_delay).await;
        }
        let scripted = self.singles.lock().unwrap().get(ticker).cloned();
        scripted.unwrap_or_else(|| Err(RadarError::Analysis(format!("{} price data not found", ticker))))
    }

    async fn fetch_forecast(&self, ticker: &str) -> RadarResult<ForecastSeries> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if !self.forecast_delay.is_zero() {
            tokio::time::sleep(self.forecast_delay).await;
        }
        let scripted = self.forecasts.lock().unwrap().get(ticker).cloned();
        scripted.unwrap_or_else(|| Err(RadarError::Server {
            status: 404,
            body: format!("no forecast for {}", ticker),
        }))
    }
}

use async_trait::async_trait;
use crate::{ForecastSeries, JobStatus, RadarResult, TickerAnalysis};

/// Request/response seam to the external analysis service.
///
/// Implementations perform no retries; callers decide retry policy.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Ask the service to begin an asynchronous Top-N batch analysis.
    async fn start_job(&self, top_n: u32) -> RadarResult<()>;

    /// Current state of the batch job.
    async fn fetch_status(&self) -> RadarResult<JobStatus>;

    /// Analyze one ticker directly, bypassing the batch job.
    async fn fetch_single_ticker_analysis(&self, ticker: &str) -> RadarResult<TickerAnalysis>;

    /// Historical closes plus the forecast and its confidence band.
    async fn fetch_forecast(&self, ticker: &str) -> RadarResult<ForecastSeries>;
}

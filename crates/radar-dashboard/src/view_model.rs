use radar_core::{AnalysisBackend, Candidate, PlotPoint, RadarResult};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::controller::{with_timeout, ControllerConfig, DashboardSnapshot, JobPollingController};
use crate::stitcher::stitch;
use crate::views::{CandidateRow, DashboardHeader, ScoreProfile};

/// Forecast chart area for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForecastPanel {
    NoSelection,
    Ready { ticker: String, points: Vec<PlotPoint> },
    /// Shown instead of a chart; no partial series is kept.
    Error { ticker: String, message: String },
    /// The selection changed while the forecast was loading.
    Superseded { ticker: String },
}

/// Composition root handed to the presentation layer.
pub struct DashboardViewModel<B: AnalysisBackend + 'static> {
    controller: JobPollingController<B>,
}

impl<B: AnalysisBackend + 'static> DashboardViewModel<B> {
    pub fn new(backend: Arc<B>, config: ControllerConfig) -> Self {
        Self {
            controller: JobPollingController::new(backend, config),
        }
    }

    pub fn controller(&self) -> &JobPollingController<B> {
        &self.controller
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.controller.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.controller.subscribe()
    }

    pub async fn run_batch(&self, top_n: u32) -> RadarResult<()> {
        self.controller.start(top_n).await
    }

    pub async fn run_single(&self, ticker: &str) -> RadarResult<Candidate> {
        self.controller.run_single(ticker).await
    }

    pub async fn select(&self, ticker: &str) -> RadarResult<Candidate> {
        self.controller.select(ticker).await
    }

    pub async fn reset(&self) {
        self.controller.reset().await
    }

    pub fn header(&self) -> DashboardHeader {
        DashboardHeader::from_snapshot(&self.snapshot())
    }

    pub fn candidate_rows(&self) -> Vec<CandidateRow> {
        CandidateRow::from_snapshot(&self.snapshot())
    }

    pub fn score_profile(&self) -> Option<ScoreProfile> {
        self.snapshot().selection().map(ScoreProfile::for_candidate)
    }

    /// Fetch and stitch the forecast of the selected ticker.
    pub async fn load_forecast(&self) -> ForecastPanel {
        let Some(ticker) = self.snapshot().selected else {
            return ForecastPanel::NoSelection;
        };

        let backend = self.controller.backend();
        let result = with_timeout(
            self.controller.config().request_timeout,
            backend.fetch_forecast(&ticker),
        )
        .await
        .and_then(|series| stitch(&series));

        if self.snapshot().selected.as_deref() != Some(ticker.as_str()) {
            tracing::debug!("Dropping forecast for {}; selection changed", ticker);
            return ForecastPanel::Superseded { ticker };
        }

        match result {
            Ok(points) => ForecastPanel::Ready { ticker, points },
            Err(e) => {
                tracing::warn!("Forecast for {} unavailable: {}", ticker, e);
                ForecastPanel::Error {
                    ticker,
                    message: e.display_message(),
                }
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RadarError;

/// Lifecycle of the server-side batch job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl JobPhase {
    /// Wire representation used by `/api/status`
    pub fn as_wire(&self) -> &'static str {
        match self {
            JobPhase::Idle => "IDLE",
            JobPhase::Running => "RUNNING",
            JobPhase::Completed => "COMPLETED",
            JobPhase::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for JobPhase {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(JobPhase::Idle),
            "RUNNING" => Ok(JobPhase::Running),
            "COMPLETED" => Ok(JobPhase::Completed),
            "FAILED" => Ok(JobPhase::Failed),
            other => Err(RadarError::Validation(format!("unknown job status: {}", other))),
        }
    }
}

/// The four sub-scores that make up a fusion score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub macro_score: Option<f64>,
    pub fundamental: Option<f64>,
    pub quant: Option<f64>,
    pub timing: Option<f64>,
}

/// One analyzed ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ticker: String,
    pub company_name: String,
    pub current_price: Option<f64>,
    pub sector: Option<String>,
    pub fusion_score: Option<f64>,
    pub dimension_scores: DimensionScores,
}

impl Candidate {
    pub fn new(ticker: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            company_name: company_name.into(),
            current_price: None,
            sector: None,
            fusion_score: None,
            dimension_scores: DimensionScores::default(),
        }
    }
}

/// A candidate set together with the regime label of the run that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub candidates: Vec<Candidate>,
    pub macro_regime: Option<String>,
}

impl BatchResult {
    pub fn new(candidates: Vec<Candidate>, macro_regime: Option<String>) -> Self {
        Self {
            candidates,
            macro_regime,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Result of `/api/analyze_single/{ticker}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerAnalysis {
    pub candidate: Candidate,
    pub macro_regime: Option<String>,
}

/// Snapshot of the batch job as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub phase: JobPhase,
    /// 0-100
    pub progress: u8,
    /// Present only when the backend sent a `top_stocks` array.
    pub batch: Option<BatchResult>,
}

impl JobStatus {
    pub fn new(phase: JobPhase, progress: u8) -> Self {
        Self {
            phase,
            progress: progress.min(100),
            batch: None,
        }
    }

    pub fn with_batch(mut self, batch: BatchResult) -> Self {
        self.batch = Some(batch);
        self
    }
}

/// Historical closes plus a forecast with its confidence band.
///
/// `forecast_dates`, `forecast`, `lower_bound` and `upper_bound` are index-aligned.
/// Shape is checked by the stitcher, not on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub historical: Vec<f64>,
    pub forecast_dates: Vec<String>,
    pub forecast: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
}

/// Which part of the stitched chart a point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Historical,
    Bridge,
    Forecast,
}

/// One chart-ready point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub label: String,
    pub historical_price: Option<f64>,
    pub forecast_value: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub segment: Segment,
}

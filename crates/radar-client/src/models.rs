//! Wire formats of the analysis backend and their conversion into domain types.

use radar_core::{
    BatchResult, Candidate, DimensionScores, ForecastSeries, JobPhase, JobStatus, RadarError,
    RadarResult, TickerAnalysis,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Candidate as serialized by the backend (`top_stocks[]`, `/api/analyze_single`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDto {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub fusion_score: Option<f64>,
    #[serde(default)]
    pub d1_macro: Option<f64>,
    #[serde(default)]
    pub d2_fundamental: Option<f64>,
    #[serde(default)]
    pub d3_quant: Option<f64>,
    #[serde(default)]
    pub d4_timing: Option<f64>,
    #[serde(default)]
    pub macro_regime: Option<String>,
}

impl CandidateDto {
    /// Split into the per-ticker candidate and the run-wide regime label.
    pub fn into_parts(self) -> RadarResult<(Candidate, Option<String>)> {
        let ticker = self.ticker.trim().to_string();
        if ticker.is_empty() {
            return Err(RadarError::Validation("candidate without ticker".to_string()));
        }

        let candidate = Candidate {
            ticker,
            company_name: self.company_name.unwrap_or_default(),
            current_price: finite(self.current_price),
            sector: self.sector.filter(|s| !s.is_empty()),
            fusion_score: finite(self.fusion_score),
            dimension_scores: DimensionScores {
                macro_score: finite(self.d1_macro),
                fundamental: finite(self.d2_fundamental),
                quant: finite(self.d3_quant),
                timing: finite(self.d4_timing),
            },
        };

        Ok((candidate, self.macro_regime))
    }
}

impl TryFrom<CandidateDto> for TickerAnalysis {
    type Error = RadarError;

    fn try_from(dto: CandidateDto) -> Result<Self, Self::Error> {
        let (candidate, macro_regime) = dto.into_parts()?;
        Ok(TickerAnalysis {
            candidate,
            macro_regime,
        })
    }
}

/// Build a candidate set from `top_stocks`.
///
/// The regime label comes from the first entry; later duplicates of a ticker are dropped.
pub fn batch_from_dtos(dtos: Vec<CandidateDto>) -> RadarResult<BatchResult> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(dtos.len());
    let mut macro_regime = None;

    for (idx, dto) in dtos.into_iter().enumerate() {
        let (candidate, regime) = dto.into_parts()?;
        if idx == 0 {
            macro_regime = regime;
        }
        if !seen.insert(candidate.ticker.clone()) {
            tracing::warn!("Dropping duplicate candidate {} in status response", candidate.ticker);
            continue;
        }
        candidates.push(candidate);
    }

    Ok(BatchResult::new(candidates, macro_regime))
}

/// `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub top_stocks: Option<Vec<CandidateDto>>,
}

impl TryFrom<StatusResponse> for JobStatus {
    type Error = RadarError;

    fn try_from(resp: StatusResponse) -> Result<Self, Self::Error> {
        let phase: JobPhase = resp.status.parse()?;
        let progress = resp
            .progress
            .filter(|p| p.is_finite())
            .map(|p| p.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        let mut status = JobStatus::new(phase, progress);
        if let Some(dtos) = resp.top_stocks {
            status = status.with_batch(batch_from_dtos(dtos)?);
        }
        Ok(status)
    }
}

/// `GET /api/forecast/{ticker}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub historical: Option<Vec<f64>>,
    #[serde(default)]
    pub dates: Option<Vec<String>>,
    #[serde(default)]
    pub forecast: Option<Vec<f64>>,
    #[serde(default)]
    pub lower_bound: Option<Vec<f64>>,
    #[serde(default)]
    pub upper_bound: Option<Vec<f64>>,
}

impl TryFrom<ForecastResponse> for ForecastSeries {
    type Error = RadarError;

    /// Presence check only; lengths are validated when the series is stitched.
    fn try_from(resp: ForecastResponse) -> Result<Self, Self::Error> {
        match (
            resp.historical,
            resp.dates,
            resp.forecast,
            resp.lower_bound,
            resp.upper_bound,
        ) {
            (Some(historical), Some(forecast_dates), Some(forecast), Some(lower_bound), Some(upper_bound)) => {
                Ok(ForecastSeries {
                    historical,
                    forecast_dates,
                    forecast,
                    lower_bound,
                    upper_bound,
                })
            }
            _ => Err(RadarError::Validation(
                "Invalid forecast response format".to_string(),
            )),
        }
    }
}

/// FastAPI-style error body: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// Human-readable message from a non-2xx body.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorDetail>(trimmed) {
        Ok(parsed) => Some(parsed.detail),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

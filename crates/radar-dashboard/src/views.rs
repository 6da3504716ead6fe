//! Display-ready values derived from a `DashboardSnapshot`.

use radar_core::{Candidate, DimensionScores, JobPhase};
use serde::Serialize;

use crate::controller::DashboardSnapshot;

pub const PLACEHOLDER: &str = "-";
pub const EMPTY_LIST_HINT: &str = "Run analysis to see results";
pub const NO_SELECTION_HINT: &str = "Select a stock to view details";
pub const SCORES_PENDING_HINT: &str = "4D scores have not been calculated for this ticker yet";

/// Radar axes are scaled to at least this value
const SCORE_SCALE_FLOOR: f64 = 100.0;

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => format!("${}", PLACEHOLDER),
    }
}

pub fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| s.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// One entry of the candidate list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRow {
    pub ticker: String,
    pub company_name: String,
    pub price: String,
    pub score: String,
    pub sector: String,
    pub active: bool,
}

impl CandidateRow {
    pub fn new(candidate: &Candidate, active: bool) -> Self {
        Self {
            ticker: candidate.ticker.clone(),
            company_name: candidate.company_name.clone(),
            price: format_price(candidate.current_price),
            score: format_score(candidate.fusion_score),
            sector: candidate.sector.clone().unwrap_or_default(),
            active,
        }
    }

    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Vec<Self> {
        let selected = snapshot.selected.as_deref();
        snapshot
            .candidates
            .iter()
            .map(|c| Self::new(c, Some(c.ticker.as_str()) == selected))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreAxis {
    pub label: &'static str,
    pub score: f64,
}

/// 4D score profile for the radar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreProfile {
    pub ticker: String,
    pub axes: Vec<ScoreAxis>,
    /// Upper bound of the radial axis
    pub max_score: f64,
    /// Every dimension is missing or zero
    pub all_zero: bool,
}

impl ScoreProfile {
    pub fn new(ticker: &str, scores: &DimensionScores) -> Self {
        let axes: Vec<ScoreAxis> = [
            ("Macro", scores.macro_score),
            ("Fundamental", scores.fundamental),
            ("Quant", scores.quant),
            ("Timing", scores.timing),
        ]
        .into_iter()
        .map(|(label, score)| ScoreAxis {
            label,
            score: score.filter(|s| s.is_finite()).unwrap_or(0.0),
        })
        .collect();

        let max_score = axes
            .iter()
            .map(|a| a.score)
            .fold(SCORE_SCALE_FLOOR, f64::max);
        let all_zero = axes.iter().all(|a| a.score == 0.0);

        Self {
            ticker: ticker.to_string(),
            axes,
            max_score,
            all_zero,
        }
    }

    pub fn for_candidate(candidate: &Candidate) -> Self {
        Self::new(&candidate.ticker, &candidate.dimension_scores)
    }
}

/// The "Start Analysis" control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunButton {
    pub label: String,
    pub enabled: bool,
}

impl RunButton {
    pub fn new(phase: JobPhase, progress: u8) -> Self {
        match phase {
            JobPhase::Running => Self {
                label: format!("Analyzing... {}%", progress),
                enabled: false,
            },
            _ => Self {
                label: "Start Analysis".to_string(),
                enabled: true,
            },
        }
    }
}

/// Everything above the candidate list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardHeader {
    pub run_button: RunButton,
    /// Progress bar fill, shown only while running
    pub progress_bar: Option<u8>,
    pub macro_regime: Option<String>,
    pub empty_hint: Option<&'static str>,
}

impl DashboardHeader {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let running = snapshot.is_running();
        Self {
            run_button: RunButton::new(snapshot.phase, snapshot.progress),
            progress_bar: running.then_some(snapshot.progress),
            macro_regime: snapshot.macro_regime.clone(),
            empty_hint: (snapshot.candidates.is_empty() && !running).then_some(EMPTY_LIST_HINT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_missing_numbers_render_placeholders() {
        let candidate = Candidate::new("NVDA", "NVIDIA");
        let row = CandidateRow::new(&candidate, false);

        assert_eq!(row.price, "$-");
        assert_eq!(row.score, "-");
        assert_eq!(row.sector, "");
    }

    #[test]
    fn test_price_uses_two_decimals() {
        assert_eq!(format_price(Some(187.4)), "$187.40");
        assert_eq!(format_score(Some(78.5)), "78.5");
    }

    #[test]
    fn test_rows_mark_selection() {
        let snapshot = DashboardSnapshot {
            candidates: vec![Candidate::new("AAPL", "Apple"), Candidate::new("MSFT", "Microsoft")],
            selected: Some("MSFT".to_string()),
            ..DashboardSnapshot::default()
        };
        let rows = CandidateRow::from_snapshot(&snapshot);

        assert!(!rows[0].active);
        assert!(rows[1].active);
    }

    #[test]
    fn test_profile_defaults_missing_to_zero() {
        let scores = DimensionScores {
            macro_score: Some(40.0),
            fundamental: None,
            quant: Some(120.0),
            timing: None,
        };
        let profile = ScoreProfile::new("AAPL", &scores);

        let labels: Vec<&str> = profile.axes.iter().map(|a| a.label).collect();
        assert_eq!(labels, vec!["Macro", "Fundamental", "Quant", "Timing"]);
        assert_relative_eq!(profile.axes[1].score, 0.0);
        assert_relative_eq!(profile.max_score, 120.0);
        assert!(!profile.all_zero);
    }

    #[test]
    fn test_profile_all_zero() {
        let profile = ScoreProfile::new("AAPL", &DimensionScores::default());
        assert!(profile.all_zero);
        assert_relative_eq!(profile.max_score, 100.0);
    }

    #[test]
    fn test_run_button_while_running() {
        let button = RunButton::new(JobPhase::Running, 40);
        assert_eq!(button.label, "Analyzing... 40%");
        assert!(!button.enabled);
        assert!(RunButton::new(JobPhase::Failed, 60).enabled);
    }

    #[test]
    fn test_header_hint_and_progress() {
        let idle = DashboardHeader::from_snapshot(&DashboardSnapshot::default());
        assert_eq!(idle.empty_hint, Some(EMPTY_LIST_HINT));
        assert_eq!(idle.progress_bar, None);

        let running = DashboardHeader::from_snapshot(&DashboardSnapshot {
            phase: JobPhase::Running,
            progress: 55,
            ..DashboardSnapshot::default()
        });
        assert_eq!(running.empty_hint, None);
        assert_eq!(running.progress_bar, Some(55));
    }
}

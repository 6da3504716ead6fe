use radar_core::{JobPhase, PlotPoint, Segment};
use radar_dashboard::views::{NO_SELECTION_HINT, PLACEHOLDER, SCORES_PENDING_HINT};
use radar_dashboard::{CandidateRow, DashboardHeader, ForecastPanel, ScoreProfile};
use std::fmt::Write;

/// Forecast rows printed at most; the last point is always included.
const MAX_FORECAST_ROWS: usize = 12;

pub fn header(header: &DashboardHeader) -> String {
    let mut out = String::new();
    let _ = write!(out, "[{}]", header.run_button.label);
    if let Some(progress) = header.progress_bar {
        let filled = usize::from(progress.min(100) / 5);
        let _ = write!(out, " |{}{}|", "#".repeat(filled), ".".repeat(20usize.saturating_sub(filled)));
    }
    if let Some(regime) = &header.macro_regime {
        let _ = write!(out, "  Macro regime: {}", regime);
    }
    out
}

pub fn candidates(header: &DashboardHeader, rows: &[CandidateRow]) -> String {
    let mut out = String::from("Top Candidates\n");
    if let Some(hint) = header.empty_hint {
        let _ = writeln!(out, "  {}", hint);
        return out;
    }
    for row in rows {
        let marker = if row.active { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<6} {:>10}  Score: {:<6} {:<24} {}",
            marker, row.ticker, row.price, row.score, row.company_name, row.sector
        );
    }
    out
}

pub fn score_profile(profile: Option<&ScoreProfile>) -> String {
    let Some(profile) = profile else {
        return format!("4D Score Profile\n  {}\n", NO_SELECTION_HINT);
    };

    let mut out = format!("4D Score Profile ({})\n", profile.ticker);
    if profile.all_zero {
        let _ = writeln!(out, "  {}", SCORES_PENDING_HINT);
        return out;
    }
    for axis in &profile.axes {
        let width = ((axis.score / profile.max_score) * 30.0).round().max(0.0) as usize;
        let _ = writeln!(out, "  {:<12} {:>6.1} {}", axis.label, axis.score, "=".repeat(width));
    }
    out
}

pub fn forecast(panel: &ForecastPanel) -> String {
    match panel {
        ForecastPanel::NoSelection => format!("100-Day AI Price Forecast\n  {}\n", NO_SELECTION_HINT),
        ForecastPanel::Error { ticker, message } => {
            format!("100-Day AI Price Forecast ({})\n  {}\n", ticker, message)
        }
        ForecastPanel::Superseded { ticker } => {
            format!("100-Day AI Price Forecast ({})\n  selection changed, forecast skipped\n", ticker)
        }
        ForecastPanel::Ready { ticker, points } => forecast_points(ticker, points),
    }
}

fn forecast_points(ticker: &str, points: &[PlotPoint]) -> String {
    let mut out = format!("100-Day AI Price Forecast ({})\n", ticker);

    let historical = points.iter().filter(|p| p.segment == Segment::Historical).count();
    let _ = writeln!(out, "  Historical: {} closes", historical);

    let tail: Vec<&PlotPoint> = points.iter().filter(|p| p.segment != Segment::Historical).collect();
    let step = tail.len().div_ceil(MAX_FORECAST_ROWS).max(1);
    for (idx, point) in tail.iter().enumerate() {
        if idx % step != 0 && idx + 1 != tail.len() {
            continue;
        }
        let _ = writeln!(
            out,
            "  {:<12} {:>10}  [{} .. {}]{}",
            point.label,
            price(point.forecast_value),
            price(point.lower_bound),
            price(point.upper_bound),
            if point.segment == Segment::Bridge { "  (last close)" } else { "" }
        );
    }
    out
}

pub fn phase_summary(phase: JobPhase, progress: u8) -> String {
    match phase {
        JobPhase::Completed => "Analysis completed".to_string(),
        JobPhase::Failed => format!("Analysis failed on the server at {}%", progress),
        JobPhase::Idle => "Analysis stopped before completion".to_string(),
        JobPhase::Running => format!("Analyzing... {}%", progress),
    }
}

fn price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${:.2}", v),
        _ => PLACEHOLDER.to_string(),
    }
}

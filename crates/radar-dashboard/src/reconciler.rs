use radar_core::{BatchResult, Candidate, RadarError, RadarResult};
use serde::{Deserialize, Serialize};

/// Where the current candidate set came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultMode {
    #[default]
    Empty,
    Batch,
    Single,
}

/// Owns the candidate set and the selection.
///
/// The set is only ever replaced wholesale, by a batch result or by a single
/// ticker, so the two flows never mix. The selection is stored by ticker and
/// always refers to a member of the current set.
#[derive(Debug, Clone, Default)]
pub struct SelectionReconciler {
    candidates: Vec<Candidate>,
    macro_regime: Option<String>,
    selected: Option<String>,
    mode: ResultMode,
}

impl SelectionReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a completed batch; the first candidate becomes the selection.
    pub fn replace_with_batch(&mut self, batch: BatchResult) {
        self.selected = batch.candidates.first().map(|c| c.ticker.clone());
        self.mode = if batch.is_empty() {
            ResultMode::Empty
        } else {
            ResultMode::Batch
        };
        self.macro_regime = batch.macro_regime;
        self.candidates = batch.candidates;
    }

    /// Show exactly one ticker and select it.
    ///
    /// Callers must also reset the batch job; `JobPollingController::run_single`
    /// does both under one lock.
    pub fn replace_with_single(&mut self, candidate: Candidate, macro_regime: Option<String>) {
        self.selected = Some(candidate.ticker.clone());
        self.candidates = vec![candidate];
        self.macro_regime = macro_regime;
        self.mode = ResultMode::Single;
    }

    /// Select a ticker from the current set. Unknown tickers leave the selection untouched.
    pub fn select(&mut self, ticker: &str) -> RadarResult<&Candidate> {
        let idx = self
            .candidates
            .iter()
            .position(|c| c.ticker == ticker)
            .ok_or_else(|| RadarError::NotFound(ticker.to_string()))?;

        self.selected = Some(ticker.to_string());
        Ok(&self.candidates[idx])
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.macro_regime = None;
        self.selected = None;
        self.mode = ResultMode::Empty;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selection(&self) -> Option<&Candidate> {
        let ticker = self.selected.as_deref()?;
        self.candidates.iter().find(|c| c.ticker == ticker)
    }

    pub fn selected_ticker(&self) -> Option<&str> {
        self.selection().map(|c| c.ticker.as_str())
    }

    /// Regime label of the current set; absent when the set is empty.
    pub fn macro_regime(&self) -> Option<&str> {
        if self.candidates.is_empty() {
            return None;
        }
        self.macro_regime.as_deref()
    }

    pub fn mode(&self) -> ResultMode {
        self.mode
    }
}

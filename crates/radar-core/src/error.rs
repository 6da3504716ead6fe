use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RadarError {
    /// Transport failure or caller-side timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the analysis backend.
    #[error("API Error: {status} {body}")]
    Server { status: u16, body: String },

    #[error("Invalid data: {0}")]
    Validation(String),

    /// The backend could not analyze the requested ticker.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Ticker not in current candidates: {0}")]
    NotFound(String),

    /// A newer action made this result stale; it was discarded.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl RadarError {
    /// Message suitable for showing in place of a chart or result list.
    pub fn display_message(&self) -> String {
        match self {
            RadarError::Analysis(msg) | RadarError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type RadarResult<T> = Result<T, RadarError>;

/// Trim a user-supplied ticker and reject empty input.
pub fn normalize_ticker(raw: &str) -> RadarResult<String> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(RadarError::Validation("ticker is required".to_string()));
    }
    Ok(ticker.to_string())
}

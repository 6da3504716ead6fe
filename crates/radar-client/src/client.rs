use async_trait::async_trait;
use radar_core::{
    normalize_ticker, AnalysisBackend, ForecastSeries, JobStatus, RadarError, RadarResult,
    TickerAnalysis,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::models::{error_message, CandidateDto, ForecastResponse, StatusResponse};
use crate::ClientConfig;

const SINGLE_ANALYSIS_FALLBACK: &str = "Single ticker analysis failed";

/// reqwest-backed client for the analysis service
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/api/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> RadarResult<Url> {
        let invalid = || RadarError::Validation(format!("invalid API url: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, builder: RequestBuilder) -> RadarResult<String> {
        let response = builder
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::debug!("Analysis backend returned {}: {}", status, body);
            return Err(RadarError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> RadarResult<T> {
        let body = self.send(self.client.get(url)).await?;
        serde_json::from_str(&body)
            .map_err(|e| RadarError::Validation(format!("Malformed response: {}", e)))
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    async fn start_job(&self, top_n: u32) -> RadarResult<()> {
        if top_n == 0 {
            return Err(RadarError::Validation("top_n must be at least 1".to_string()));
        }

        let url = self.endpoint(&["analyze"])?;
        self.send(self.client.post(url).query(&[("top_n", top_n)]))
            .await?;

        tracing::info!("Batch analysis requested (top_n={})", top_n);
        Ok(())
    }

    async fn fetch_status(&self) -> RadarResult<JobStatus> {
        let url = self.endpoint(&["status"])?;
        let resp: StatusResponse = self.get_json(url).await?;
        JobStatus::try_from(resp)
    }

    async fn fetch_single_ticker_analysis(&self, ticker: &str) -> RadarResult<TickerAnalysis> {
        let ticker = normalize_ticker(ticker)?;
        let url = self.endpoint(&["analyze_single", ticker.as_str()])?;

        let dto: CandidateDto = match self.get_json(url).await {
            Ok(dto) => dto,
            Err(RadarError::Server { body, .. }) => {
                let msg = error_message(&body)
                    .unwrap_or_else(|| SINGLE_ANALYSIS_FALLBACK.to_string());
                return Err(RadarError::Analysis(msg));
            }
            Err(e) => return Err(e),
        };

        TickerAnalysis::try_from(dto)
    }

    async fn fetch_forecast(&self, ticker: &str) -> RadarResult<ForecastSeries> {
        let ticker = normalize_ticker(ticker)?;
        let url = self.endpoint(&["forecast", ticker.as_str()])?;
        let resp: ForecastResponse = self.get_json(url).await?;
        ForecastSeries::try_from(resp)
    }
}

fn transport_error(e: reqwest::Error) -> RadarError {
    if e.is_timeout() {
        RadarError::Network("request timed out".to_string())
    } else if e.is_decode() {
        RadarError::Validation(e.to_string())
    } else {
        RadarError::Network(e.to_string())
    }
}

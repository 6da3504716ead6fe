use anyhow::{bail, Context, Result};
use radar_client::ClientConfig;
use radar_dashboard::ControllerConfig;
use std::env;
use std::time::Duration;

const DEFAULT_TOP_N: u32 = 5;

#[derive(Debug, Clone)]
pub struct RadarConfig {
    pub client: ClientConfig,
    pub controller: ControllerConfig,
    /// Batch size used when `--top-n` is not given
    pub top_n: u32,
}

impl RadarConfig {
    pub fn from_env() -> Result<Self> {
        let top_n = parse_top_n(env::var("RADAR_TOP_N").ok())?;
        let controller = ControllerConfig::from_env();
        let client = ClientConfig::from_env();

        Ok(Self {
            client,
            controller,
            top_n,
        })
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.client = self.client.with_base_url(url);
        }
        self
    }

    pub fn with_poll_interval(mut self, interval_ms: Option<u64>) -> Self {
        if let Some(ms) = interval_ms.filter(|ms| *ms > 0) {
            self.controller.poll_interval = Duration::from_millis(ms);
        }
        self
    }
}

fn parse_top_n(raw: Option<String>) -> Result<u32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TOP_N);
    };
    let top_n: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("RADAR_TOP_N must be a positive integer, got {:?}", raw))?;
    if top_n == 0 {
        bail!("RADAR_TOP_N must be at least 1");
    }
    Ok(top_n)
}

//! HTTP client for the Census Bureau CPS basic monthly endpoint.

use super::parse::{parse_table, CORE_VARIABLES, OPTIONAL_VARIABLES};
use super::FetchError;
use crate::config::ApiConfig;
use crate::models::{RecordBatch, YearMonth};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for `{base_url}/{year}/cps/basic/{mon}`.
#[derive(Debug, Clone)]
pub struct CensusClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_seconds: u64,
    retries: usize,
    backoff_ms: u64,
}

impl CensusClient {
    /// Create a client from the `[api]` config section.
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("cpsreport/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_seconds: config.timeout_seconds,
            retries: config.retries,
            backoff_ms: config.backoff_ms,
        })
    }

    /// Endpoint for one survey month.
    pub fn month_url(&self, period: YearMonth) -> String {
        format!(
            "{}/{}/cps/basic/{}",
            self.base_url,
            period.year,
            period.month_abbrev()
        )
    }

    /// Fetch and parse one month.
    ///
    /// Optional variables are requested first; if the vintage does not know
    /// them the request is repeated with the core set only.
    pub async fn fetch_month(&self, period: YearMonth) -> Result<RecordBatch, FetchError> {
        let mut variables: Vec<&str> = CORE_VARIABLES.to_vec();
        variables.extend_from_slice(OPTIONAL_VARIABLES);

        match self.fetch_with_retry(period, &variables).await {
            Err(FetchError::Status { status: 400, body })
                if body.to_lowercase().contains("unknown variable") =>
            {
                info!(
                    "{}: optional variables not published, retrying with core set",
                    period
                );
                debug!("API said: {}", body);
                self.fetch_with_retry(period, CORE_VARIABLES).await
            }
            other => other,
        }
    }

    async fn fetch_with_retry(
        &self,
        period: YearMonth,
        variables: &[&str],
    ) -> Result<RecordBatch, FetchError> {
        let mut attempt = 0;
        loop {
            match self.request(period, variables).await {
                Ok(body) => return parse_table(period, &body),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = self.backoff_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "{}: attempt {} failed ({}), retrying in {}ms",
                        period,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send one request and return the raw body.
    async fn request(&self, period: YearMonth, variables: &[&str]) -> Result<String, FetchError> {
        let url = self.month_url(period);
        debug!("GET {} ({} variables)", url, variables.len());

        let response = self
            .http_client
            .get(&url)
            .query(&[("get", variables.join(",")), ("key", self.api_key.clone())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else if e.is_connect() {
                    FetchError::Connect { url: url.clone() }
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(FetchError::NoData);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::NoData);
        }
        Ok(body)
    }
}

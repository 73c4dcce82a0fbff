//! Retrieval of CPS basic monthly microdata.
//!
//! The client talks to the Census data API and hands back a fully typed
//! [`RecordBatch`] per month, or an error. A failed month is reported as
//! such and never surfaces as a partial batch.

pub mod client;
pub mod parse;

pub use client::CensusClient;

use crate::models::{RecordBatch, YearMonth};
use futures::stream::{self, StreamExt};
use std::future::Future;
use thiserror::Error;

/// Why a month could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("cannot connect to {url}")]
    Connect { url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("response is missing required column {0}")]
    MissingColumn(String),

    #[error("no data published for this month")]
    NoData,
}

impl FetchError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Connect { .. } => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// The result of fetching one target month.
#[derive(Debug)]
pub struct MonthOutcome {
    pub period: YearMonth,
    pub result: Result<RecordBatch, FetchError>,
}

/// Fetch every month with at most `concurrency` requests in flight.
///
/// Outcomes come back in completion order, not calendar order.
pub async fn collect_months<F, Fut>(
    months: Vec<YearMonth>,
    concurrency: usize,
    fetch: F,
) -> Vec<MonthOutcome>
where
    F: Fn(YearMonth) -> Fut,
    Fut: Future<Output = Result<RecordBatch, FetchError>>,
{
    stream::iter(months)
        .map(|period| {
            let request = fetch(period);
            async move {
                MonthOutcome {
                    period,
                    result: request.await,
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

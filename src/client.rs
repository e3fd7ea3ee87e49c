//! EA request driver.
//!
//! Defines the `PriceSource` trait and the HTTP client that probes the
//! external adapter. One POST per pair, a fixed timeout, no retries.
//!
//! Request: `POST {EA_URL}` with `{"data": {"base": "EUR", "quote": "USD"}}`
//! Success: status 200 with a JSON body carrying `result`,
//! `data.providerIndicatedTimeUnixMs` and `debug.cacheHit`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::types::{EaResponse, Pair, ProbeError, RequestOutcome, ResponseBody, OK_STATUS};

/// Default per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Abstraction over the service under test.
///
/// `probe` always returns: failures come back as `Err(ProbeError)`
/// instead of propagating.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Issue exactly one request for `pair`.
    async fn probe(&self, pair: &Pair) -> RequestOutcome;

    /// Address every probe is sent to.
    fn endpoint(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Request payload
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ProbeRequest<'a> {
    data: PairPayload<'a>,
}

#[derive(Debug, Serialize)]
struct PairPayload<'a> {
    base: &'a str,
    quote: &'a str,
}

impl<'a> ProbeRequest<'a> {
    fn for_pair(pair: &'a Pair) -> Self {
        Self {
            data: PairPayload {
                base: &pair.base,
                quote: &pair.quote,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the external adapter.
pub struct EaClient {
    http: Client,
    url: String,
}

impl EaClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lvp-prober/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build EA HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn send(&self, pair: &Pair) -> Result<EaResponse, ProbeError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&ProbeRequest::for_pair(pair))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;

        let body = if status == OK_STATUS {
            ResponseBody::Json(serde_json::from_str(&text)?)
        } else {
            ResponseBody::Raw(text)
        };

        Ok(EaResponse { status, body })
    }
}

#[async_trait]
impl PriceSource for EaClient {
    async fn probe(&self, pair: &Pair) -> RequestOutcome {
        let outcome = self.send(pair).await;
        match &outcome {
            Ok(resp) => debug!(pair = %pair, status = resp.status, "EA responded"),
            Err(e) => debug!(pair = %pair, error = %e, "EA request failed"),
        }
        outcome
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

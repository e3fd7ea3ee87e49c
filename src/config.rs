//! Configuration loading from environment variables.
//!
//! `EA_URL` and `REQUEST_INTERVAL` select the target and the pause
//! between cycles; `LVP_LOG_DIR` relocates the session log. A `.env`
//! file, if present, is loaded by the binary before this runs.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::REQUEST_TIMEOUT;
use crate::prober::{Pacing, INTER_REQUEST_DELAY};
use crate::session_log::DEFAULT_LOG_DIR;

pub const DEFAULT_EA_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_INTERVAL_SECS: u64 = 60;

/// Runtime settings for the prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProberConfig {
    /// Endpoint every probe is POSTed to.
    pub ea_url: String,
    /// Pause between cycles, in seconds.
    pub request_interval_secs: u64,
    /// Directory holding session logs.
    pub log_dir: PathBuf,
    pub request_timeout: Duration,
    pub inter_request_delay: Duration,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            ea_url: DEFAULT_EA_URL.to_string(),
            request_interval_secs: DEFAULT_REQUEST_INTERVAL_SECS,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            request_timeout: REQUEST_TIMEOUT,
            inter_request_delay: INTER_REQUEST_DELAY,
        }
    }
}

impl ProberConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Unset variables fall back
    /// to their defaults; a malformed `REQUEST_INTERVAL` is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("EA_URL") {
            cfg.ea_url = url;
        }

        if let Some(raw) = lookup("REQUEST_INTERVAL") {
            cfg.request_interval_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("REQUEST_INTERVAL must be whole seconds, got {raw:?}"))?;
        }

        if let Some(dir) = lookup("LVP_LOG_DIR") {
            cfg.log_dir = PathBuf::from(dir);
        }

        Ok(cfg)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            inter_request: self.inter_request_delay,
            inter_cycle: Duration::from_secs(self.request_interval_secs),
        }
    }
}

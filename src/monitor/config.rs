use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::monitor::hysteresis::DEFAULT_CONFIRM_THRESHOLD;

pub const DEFAULT_STATUS_URL: &str = "http://127.0.0.1:5000/status";
pub const DEFAULT_VIDEO_URL: &str = "ws://127.0.0.1:5000/video_feed";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const STATUS_URL_ENV: &str = "MONITOR_STATUS_URL";
const VIDEO_URL_ENV: &str = "MONITOR_VIDEO_URL";
const POLL_INTERVAL_ENV: &str = "MONITOR_POLL_INTERVAL_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Status endpoint polled for the link flag and detections.
    pub status_url: String,
    /// Websocket endpoint serving the frame stream.
    pub video_url: String,
    /// Seconds between status polls.
    pub poll_interval_secs: u64,
    /// Consecutive differing polls required to flip the indicator.
    pub confirm_threshold: u32,
    /// Per-request timeout for status fetches, in seconds.
    pub request_timeout_secs: u64,
    pub reconnect: ReconnectPolicy,
}

/// How the feed task behaves after a session ends. Disabled means one
/// session only, like the original page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            video_url: DEFAULT_VIDEO_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            confirm_threshold: DEFAULT_CONFIRM_THRESHOLD,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_secs: 1,
            max_delay_secs: 30,
        }
    }
}

impl ReconnectPolicy {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs.max(1))
    }

    /// Double the wait up to the configured cap.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let cap = Duration::from_secs(self.max_delay_secs.max(1));
        (current * 2).min(cap)
    }
}

impl MonitorConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).context("reading config file")?;
        let cfg: Self = serde_json::from_str(&raw).context("parsing JSON")?;
        Ok(cfg)
    }

    /// Config file if present, defaults otherwise, then environment
    /// overrides, then validation.
    pub fn load(path: &str) -> Result<Self> {
        let mut cfg = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            debug!(path, "no config file, using defaults");
            Self::default()
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(STATUS_URL_ENV) {
            self.status_url = value;
        }
        if let Ok(value) = std::env::var(VIDEO_URL_ENV) {
            self.video_url = value;
        }
        if let Ok(value) = std::env::var(POLL_INTERVAL_ENV) {
            match value.parse() {
                Ok(secs) => self.poll_interval_secs = secs,
                Err(_) => warn!(value = %value, "ignoring unparseable {}", POLL_INTERVAL_ENV),
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let status = Url::parse(&self.status_url).context("status_url is not a valid URL")?;
        if !matches!(status.scheme(), "http" | "https") {
            bail!("status_url must be http or https, got {}", status.scheme());
        }
        let video = Url::parse(&self.video_url).context("video_url is not a valid URL")?;
        if !matches!(video.scheme(), "ws" | "wss") {
            bail!("video_url must be ws or wss, got {}", video.scheme());
        }
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be at least 1");
        }
        if self.confirm_threshold == 0 {
            bail!("confirm_threshold must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

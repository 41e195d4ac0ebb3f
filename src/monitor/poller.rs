//! Periodic status polling.
//!
//! One task owns the HTTP client and the hysteresis filter. Each tick
//! fetches a snapshot, feeds the link flag through the filter, and forwards
//! any detection payload. The fetch is awaited inside the loop body and
//! missed ticks are skipped, so two fetches can never be in flight at once.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::monitor::config::MonitorConfig;
use crate::monitor::hysteresis::{HysteresisFilter, LinkState};
use crate::monitor::MonitorEvent;
use crate::transport::status::fetch_status;

pub struct StatusPoller {
    client: Client,
    url: String,
    filter: HysteresisFilter,
}

impl StatusPoller {
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("building status http client")?;

        Ok(Self {
            client,
            url: config.status_url.clone(),
            filter: HysteresisFilter::new(config.confirm_threshold),
        })
    }

    /// Run one poll cycle. A failed fetch leaves the filter untouched and
    /// emits nothing; the next tick simply tries again.
    pub async fn poll_once(&mut self, events: &mpsc::Sender<MonitorEvent>) {
        let snapshot = match fetch_status(&self.client, &self.url).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(error = %error, "status poll failed");
                return;
            }
        };

        match self.filter.observe(snapshot.opcua_connected) {
            Some(new_state) => {
                let _ = events.send(MonitorEvent::LinkChanged(new_state)).await;
            }
            None => {
                debug!(
                    observed = snapshot.opcua_connected,
                    confirmed = %self.filter.confirmed(),
                    pending = self.filter.pending(),
                    "link flag observed"
                );
            }
        }

        // Detections bypass the filter: every successful poll that carries
        // one refreshes the counters.
        if let Some(payload) = snapshot.last_detection {
            let _ = events.send(MonitorEvent::Detection(payload)).await;
        }
    }

    pub fn confirmed(&self) -> LinkState {
        self.filter.confirmed()
    }

    pub fn pending(&self) -> u32 {
        self.filter.pending()
    }
}

/// Interval for loops that fetch on every tick: first tick immediate,
/// missed ticks skipped instead of bursting.
pub fn poll_ticks(period: Duration) -> Interval {
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticks
}

/// Poll the status endpoint on a fixed cadence, first tick immediately.
/// A fetch slower than the interval delays the next tick rather than
/// stacking a second one.
pub fn spawn_status_poller(
    config: MonitorConfig,
    events: mpsc::Sender<MonitorEvent>,
) -> Result<JoinHandle<()>> {
    let mut poller = StatusPoller::new(&config)?;
    Ok(tokio::spawn(async move {
        let mut ticks = poll_ticks(config.poll_interval());
        loop {
            ticks.tick().await;
            poller.poll_once(&events).await;
        }
    }))
}

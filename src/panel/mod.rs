//! Display surface.
//!
//! Stands in for the original operator page: a shared state structure plus
//! log lines. The supervisor writes committed link transitions, feed state,
//! frames, and detection counters here; tests and embedders read the state
//! back through the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::monitor::hysteresis::LinkState;
use crate::transport::frame::{FrameFormat, VideoFrame};
use crate::transport::DetectionSummary;

/// Everything the panel currently shows.
#[derive(Debug, Clone)]
pub struct PanelState {
    /// Debounced link indicator.
    pub link: LinkState,
    pub feed_online: bool,
    pub frames_rendered: u64,
    pub last_frame: Option<FrameInfo>,
    /// Latest counter display, absent until the first detection arrives.
    pub counters: Option<DetectionSummary>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub bytes: usize,
    pub format: FrameFormat,
    pub received_at: DateTime<Utc>,
}

pub type PanelStore = Arc<RwLock<PanelState>>;

impl Default for PanelState {
    fn default() -> Self {
        Self {
            link: LinkState::Disconnected,
            feed_online: false,
            frames_rendered: 0,
            last_frame: None,
            counters: None,
            updated_at: Utc::now(),
        }
    }
}

/// Handle the supervisor mutates the display through. Clones share one
/// store.
#[derive(Clone)]
pub struct Panel {
    state: PanelStore,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(PanelState::default())),
        }
    }

    pub fn store(&self) -> PanelStore {
        Arc::clone(&self.state)
    }

    pub async fn state(&self) -> PanelState {
        self.state.read().await.clone()
    }

    /// Apply a committed link transition to the indicator.
    pub async fn set_link(&self, link: LinkState) {
        {
            let mut state = self.state.write().await;
            state.link = link;
            state.updated_at = Utc::now();
        }
        match link {
            LinkState::Connected => info!(indicator = link.label(), "controller link up"),
            LinkState::Disconnected => warn!(indicator = link.label(), "controller link down"),
        }
    }

    pub async fn set_feed_online(&self, online: bool) {
        let changed = {
            let mut state = self.state.write().await;
            let changed = state.feed_online != online;
            state.feed_online = online;
            state.updated_at = Utc::now();
            changed
        };
        if changed {
            if online {
                info!("video feed online");
            } else {
                warn!("video feed offline");
            }
        }
    }

    /// Swap the latest frame. Later frames always win.
    pub async fn show_frame(&self, frame: &VideoFrame) {
        let mut state = self.state.write().await;
        state.frames_rendered += 1;
        state.last_frame = Some(FrameInfo {
            bytes: frame.len(),
            format: frame.format,
            received_at: Utc::now(),
        });
        state.updated_at = Utc::now();
    }

    /// Render counters from a verbatim detection payload. Payloads that do
    /// not parse leave the current display alone.
    pub async fn update_counters(&self, payload: &Value) {
        let summary = match DetectionSummary::from_payload(payload) {
            Ok(summary) => summary,
            Err(error) => {
                debug!(error = %error, "ignoring unreadable detection payload");
                return;
            }
        };

        debug!(
            inspected = summary.inspected_total,
            with_insert = summary.with_insert_total,
            missing_insert = summary.missing_insert_total,
            "detection counters updated"
        );

        let mut state = self.state.write().await;
        state.counters = Some(summary);
        state.updated_at = Utc::now();
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

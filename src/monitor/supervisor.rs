//! Task composition and shutdown.
//!
//! The supervisor owns the panel and the event channel. The poll task and
//! the stream task each run independently and push events in; the loop
//! below drains them onto the panel until Ctrl-C.

use std::future::Future;
use std::io;

use anyhow::Result;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;

use crate::monitor::config::MonitorConfig;
use crate::monitor::poller::spawn_status_poller;
use crate::monitor::MonitorEvent;
use crate::panel::Panel;
use crate::transport::video::spawn_video_stream;

// Frames dominate the event traffic.
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub async fn run(config: MonitorConfig) -> Result<()> {
    info!(
        status_url = %config.status_url,
        video_url = %config.video_url,
        poll_interval_secs = config.poll_interval_secs,
        confirm_threshold = config.confirm_threshold,
        "line monitor starting"
    );

    let panel = Panel::new();
    let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let poller_handle = spawn_status_poller(config.clone(), events_tx.clone())?;
    let stream_handle = spawn_video_stream(
        config.video_url.clone(),
        config.reconnect.clone(),
        events_tx,
    );

    event_loop(&panel, &mut events_rx, signal::ctrl_c()).await;

    poller_handle.abort();
    stream_handle.abort();
    let _ = poller_handle.await; // Ignore cancellation errors
    let _ = stream_handle.await;

    let state = panel.state().await;
    info!(
        link = %state.link,
        frames = state.frames_rendered,
        "line monitor stopped"
    );
    Ok(())
}

/// Drain task events onto the panel until the shutdown future completes
/// or every sender is gone. One shutdown future spans all iterations.
async fn event_loop<F>(panel: &Panel, events: &mut mpsc::Receiver<MonitorEvent>, shutdown: F)
where
    F: Future<Output = io::Result<()>>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping monitor");
                break;
            }
            event = events.recv() => match event {
                Some(event) => apply_event(panel, event).await,
                None => break,
            },
        }
    }
}

/// Apply one task event to the panel.
pub async fn apply_event(panel: &Panel, event: MonitorEvent) {
    match event {
        MonitorEvent::Frame(frame) => panel.show_frame(&frame).await,
        MonitorEvent::FeedOnline => panel.set_feed_online(true).await,
        MonitorEvent::FeedOffline => panel.set_feed_online(false).await,
        MonitorEvent::LinkChanged(link) => panel.set_link(link).await,
        MonitorEvent::Detection(payload) => panel.update_counters(&payload).await,
    }
}

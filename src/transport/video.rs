//! Video feed consumption.
//!
//! One session reads binary messages from the feed websocket, validates
//! each as a frame, and pushes it to the supervisor. When a session ends
//! the task waits out the reconnect delay and tries again, unless
//! reconnection is disabled, in which case the feed stays closed.

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, WebSocketStream};
use tracing::{debug, info, warn};

use crate::monitor::config::ReconnectPolicy;
use crate::monitor::MonitorEvent;
use crate::transport::frame::VideoFrame;

// Log a cadence line once per this many frames.
const FRAME_LOG_EVERY: u64 = 100;

pub fn spawn_video_stream(
    url: String,
    reconnect: ReconnectPolicy,
    events: mpsc::Sender<MonitorEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        stream_loop(&url, &reconnect, events).await;
    })
}

/// Connect, consume, reconnect. The delay resets after every successful
/// connect and doubles across consecutive failures, up to the policy cap.
async fn stream_loop(url: &str, reconnect: &ReconnectPolicy, events: mpsc::Sender<MonitorEvent>) {
    let mut delay = reconnect.initial_delay();
    loop {
        match connect_async(url).await {
            Ok((ws, _)) => {
                delay = reconnect.initial_delay();
                info!(url = %url, "video feed connected");
                if events.send(MonitorEvent::FeedOnline).await.is_err() {
                    return;
                }
                let frames = consume_session(ws, &events).await;
                info!(frames, "video session ended");
                if events.send(MonitorEvent::FeedOffline).await.is_err() {
                    return;
                }
            }
            Err(error) => {
                warn!(error = %error, url = %url, "video feed connect failed");
            }
        }

        if !reconnect.enabled {
            info!("video reconnect disabled, leaving the feed closed");
            return;
        }
        debug!(delay_secs = delay.as_secs(), "waiting before reconnecting to the feed");
        sleep(delay).await;
        delay = reconnect.next_delay(delay);
    }
}

/// Drain one established session. Returns the number of frames delivered.
async fn consume_session<S>(
    mut ws: WebSocketStream<S>,
    events: &mpsc::Sender<MonitorEvent>,
) -> u64
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut frames: u64 = 0;
    let mut dropped: u64 = 0;

    loop {
        match ws.next().await {
            Some(Ok(Message::Binary(data))) => match VideoFrame::parse(Bytes::from(data)) {
                Ok(frame) => {
                    frames += 1;
                    if frames % FRAME_LOG_EVERY == 0 {
                        debug!(frames, bytes = frame.len(), "video frames flowing");
                    }
                    if events.send(MonitorEvent::Frame(frame)).await.is_err() {
                        break;
                    }
                }
                Err(error) => {
                    dropped += 1;
                    debug!(error = %error, dropped, "dropping frame without an image signature");
                }
            },
            Some(Ok(Message::Close(_))) => {
                debug!("video feed closed by the server");
                break;
            }
            Some(Ok(_)) => {} // text, ping, pong: not part of the feed
            Some(Err(error)) => {
                warn!(error = %error, "video feed read error");
                break;
            }
            None => break,
        }
    }

    let _ = ws.close(None).await;
    frames
}

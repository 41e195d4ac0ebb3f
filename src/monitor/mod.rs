//! Monitor core: configuration, the hysteresis filter, the poll task, and
//! the supervisor composing the tasks.

pub mod config;
pub mod hysteresis;
pub mod poller;
pub mod supervisor;

use serde_json::Value;

use crate::monitor::hysteresis::LinkState;
use crate::transport::frame::VideoFrame;

/// Events the stream and poll tasks feed to the supervisor.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A validated frame arrived from the feed.
    Frame(VideoFrame),
    /// A feed session was established.
    FeedOnline,
    /// A live feed session ended. Failed connection attempts never raise
    /// this; the stream task just retries.
    FeedOffline,
    /// The filter committed an indicator transition.
    LinkChanged(LinkState),
    /// A successful poll carried a detection payload, forwarded verbatim.
    Detection(Value),
}

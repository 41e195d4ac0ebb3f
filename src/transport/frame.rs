//! Frame payload validation.
//!
//! The feed carries complete encoded stills, one per binary message.
//! Nothing here rasterizes pixels: a frame is accepted on its container
//! signature alone and handed to the panel as-is.

use anyhow::{bail, Result};
use bytes::Bytes;

const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Container format of a frame, sniffed from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Jpeg,
    Png,
}

impl FrameFormat {
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&JPEG_SOI) {
            Some(Self::Jpeg)
        } else if data.starts_with(&PNG_SIGNATURE) {
            Some(Self::Png)
        } else {
            None
        }
    }
}

/// One validated frame from the feed.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Bytes,
    pub format: FrameFormat,
}

impl VideoFrame {
    /// Validate one inbound binary message as a frame. Payloads without a
    /// recognized image signature are rejected and dropped upstream.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.is_empty() {
            bail!("empty frame payload");
        }
        match FrameFormat::sniff(&data) {
            Some(format) => Ok(Self { data, format }),
            None => bail!("frame payload carries no recognized image signature"),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

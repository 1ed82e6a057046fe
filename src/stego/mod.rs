//! Hiding a framed payload in the low bits of a canvas.

pub mod header;
pub mod lsb;

pub use header::{parse_frame, serialize_frame, ParsedFrame, StegoHeader, BITS_PER_CHANNEL, MAGIC};
pub use lsb::{capacity, embed, extract};

use crate::error::Result;
use crate::render::canvas::Canvas;

/// Frame `payload` and write it into `canvas`.
pub fn embed_payload(canvas: &mut Canvas, mime_type: &str, payload: &[u8]) -> Result<()> {
    let frame = serialize_frame(mime_type, payload)?;
    embed(canvas, &frame)
}

/// Recover a payload and its MIME type from `canvas`.
pub fn extract_payload(canvas: &Canvas) -> Result<(Vec<u8>, String)> {
    let raw = extract(canvas);
    let parsed = parse_frame(&raw)?;
    Ok((parsed.payload.to_vec(), parsed.header.mime().to_string()))
}

/// Largest payload that fits a `width` x `height` canvas under `mime_type`,
/// or `None` when not even an empty frame fits.
pub fn max_payload_for(width: u32, height: u32, mime_type: &str) -> Option<usize> {
    let capacity = capacity(width, height);
    let mut payload = capacity.checked_sub(header::framed_len(mime_type, 0))?;
    // Wider length fields push the frame past capacity.
    while header::framed_len(mime_type, payload) > capacity {
        payload = payload.checked_sub(1)?;
    }
    Some(payload)
}

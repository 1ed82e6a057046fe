//! Low-bit embedding in the R, G and B channels of an RGBA canvas.
//!
//! Channels are visited in raster order (R, G, B per pixel; alpha skipped).
//! Each channel carries [`BITS_PER_CHANNEL`] bits, taken from the source
//! bytes least significant bits first.

use crate::error::{OrbitError, Result};
use crate::render::canvas::{Canvas, CHANNELS};

use super::header::BITS_PER_CHANNEL;

const BITS: usize = BITS_PER_CHANNEL as usize;
const MASK: u8 = (1 << BITS) - 1;
const CARRIERS_PER_BYTE: usize = 8 / BITS;

/// Bytes a `width` x `height` image can hold.
pub fn capacity(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3 * BITS / 8
}

/// Overwrite the low bits of `canvas` with `data`.
///
/// Fails without touching the canvas when `data` does not fit. Channels past
/// the end of `data` keep their rendered values.
pub fn embed(canvas: &mut Canvas, data: &[u8]) -> Result<()> {
    let capacity = capacity(canvas.width(), canvas.height());
    if data.len() > capacity {
        return Err(OrbitError::CapacityExceeded {
            required: data.len(),
            capacity,
        });
    }

    let chunks = data
        .iter()
        .flat_map(|&byte| (0..CARRIERS_PER_BYTE).map(move |i| (byte >> (i * BITS)) & MASK));

    for (channel, chunk) in carriers_mut(canvas).zip(chunks) {
        *channel = (*channel & !MASK) | chunk;
    }

    log::debug!("Embedded {} of {} bytes", data.len(), capacity);
    Ok(())
}

/// Read back every carrier. The result is always `capacity` bytes long;
/// only the prefix described by an embedded frame is meaningful.
pub fn extract(canvas: &Canvas) -> Vec<u8> {
    let capacity = capacity(canvas.width(), canvas.height());
    let mut out = vec![0u8; capacity];

    let carriers = canvas
        .pixels()
        .chunks_exact(CHANNELS)
        .flat_map(|px| px[..3].iter().copied())
        .take(capacity * CARRIERS_PER_BYTE);

    for (idx, value) in carriers.enumerate() {
        let shift = (idx % CARRIERS_PER_BYTE) * BITS;
        out[idx / CARRIERS_PER_BYTE] |= (value & MASK) << shift;
    }

    out
}

fn carriers_mut(canvas: &mut Canvas) -> impl Iterator<Item = &mut u8> + '_ {
    canvas
        .pixels_mut()
        .chunks_exact_mut(CHANNELS)
        .flat_map(|px| px[..3].iter_mut())
}

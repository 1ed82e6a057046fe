use serde::{Deserialize, Serialize};

/// Magnitude bins per spectrogram frame.
pub const SPECTRUM_BINS: usize = 256;

/// A quantized spectrum: one byte per bin.
pub type SpectrumFrame = [u8; SPECTRUM_BINS];

/// Largest possible onset energy: every bin at full scale.
pub const MAX_FRAME_ENERGY: f32 = (SPECTRUM_BINS * 255 * 255) as f32;

/// Sharp rise in spectral energy between consecutive frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Onset {
    /// Frame timestamp in seconds
    pub time: f32,
    /// Sum of squared byte magnitudes of the frame
    pub energy: f32,
}

/// Everything the renderer needs to know about a clip.
#[derive(Clone, Debug, Default)]
pub struct AudioFeatures {
    pub duration: f32,
    pub sample_rate: u32,
    pub channel_data: Vec<Vec<f32>>,
    pub spectrogram: Vec<SpectrumFrame>,
    pub onsets: Vec<Onset>,
}

impl AudioFeatures {
    pub fn frame_count(&self) -> usize {
        self.spectrogram.len()
    }
}

/// Sum of squared bin values.
pub fn frame_energy(frame: &SpectrumFrame) -> f32 {
    frame.iter().map(|&b| (b as f32) * (b as f32)).sum()
}

use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::AudioData;
use super::features::{frame_energy, AudioFeatures, Onset, SpectrumFrame, SPECTRUM_BINS};
use crate::config::AnalysisConfig;

/// Samples advanced per spectrogram frame.
pub const HOP_SIZE: usize = 1024;
/// Transform size; yields `FFT_SIZE / 2` magnitude bins.
pub const FFT_SIZE: usize = 512;

/// Turn decoded audio into a spectrogram and onset list.
///
/// Pass 1 computes linear magnitude spectra for every hop (in parallel,
/// collected in frame order). Pass 2 walks the frames in order, applying
/// temporal smoothing, decibel quantization and onset detection.
pub fn extract_features(audio: AudioData, config: &AnalysisConfig) -> AudioFeatures {
    let samples = audio.mono();
    let sample_rate = audio.sample_rate;
    let duration = audio.duration();
    let total_frames = frame_count(samples.len());

    log::info!("Pass 1: Per-frame FFT ({} frames)...", total_frames);
    let magnitudes = pass1_spectra(&samples, total_frames);

    log::info!("Pass 2: Quantization & onsets (smoothing={:.2})...", config.smoothing);
    let (spectrogram, onsets) = pass2_quantize(&magnitudes, sample_rate, config);

    log::debug!(
        "Features: {} frames, {} onsets, {:.1}s",
        spectrogram.len(),
        onsets.len(),
        duration
    );

    AudioFeatures {
        duration,
        sample_rate,
        channel_data: audio.channels,
        spectrogram,
        onsets,
    }
}

/// Frames whose start time lies inside the signal.
pub fn frame_count(samples: usize) -> usize {
    samples.div_ceil(HOP_SIZE)
}

fn pass1_spectra(samples: &[f32], total_frames: usize) -> Vec<Vec<f32>> {
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let window = blackman_window(FFT_SIZE);
    let scale = 1.0 / FFT_SIZE as f32;

    (0..total_frames)
        .into_par_iter()
        .map(|frame_idx| {
            // Window covers the last FFT_SIZE samples of the hop.
            let end = (frame_idx + 1) * HOP_SIZE;
            let start = end - FFT_SIZE;

            let mut buffer: Vec<Complex<f32>> = (0..FFT_SIZE)
                .map(|i| {
                    let sample = samples.get(start + i).copied().unwrap_or(0.0);
                    Complex::new(sample * window[i], 0.0)
                })
                .collect();
            fft.process(&mut buffer);

            buffer[..SPECTRUM_BINS].iter().map(|c| c.norm() * scale).collect()
        })
        .collect()
}

fn pass2_quantize(
    magnitudes: &[Vec<f32>],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> (Vec<SpectrumFrame>, Vec<Onset>) {
    let tau = config.smoothing.clamp(0.0, 1.0);
    let db_range = (config.max_db - config.min_db).max(f32::EPSILON);

    let mut smoothed = vec![0.0f32; SPECTRUM_BINS];
    let mut spectrogram = Vec::with_capacity(magnitudes.len());
    let mut onsets = Vec::new();
    let mut last_energy = 0.0f32;

    for (frame_idx, frame) in magnitudes.iter().enumerate() {
        let mut quantized: SpectrumFrame = [0; SPECTRUM_BINS];
        for (bin, &magnitude) in frame.iter().enumerate() {
            smoothed[bin] = tau * smoothed[bin] + (1.0 - tau) * magnitude;
            let db = 20.0 * smoothed[bin].log10();
            let scaled = (db - config.min_db) / db_range * 255.0;
            // -inf (silence) clamps to 0.
            quantized[bin] = scaled.clamp(0.0, 255.0) as u8;
        }

        let current_energy = frame_energy(&quantized);
        if current_energy - last_energy > config.onset_threshold {
            let time = (frame_idx * HOP_SIZE) as f32 / sample_rate.max(1) as f32;
            onsets.push(Onset {
                time,
                energy: current_energy,
            });
        }
        last_energy = current_energy;

        spectrogram.push(quantized);
    }

    (spectrogram, onsets)
}

fn blackman_window(size: usize) -> Vec<f32> {
    let alpha = 0.16f32;
    let a0 = 0.5 * (1.0 - alpha);
    let a1 = 0.5;
    let a2 = 0.5 * alpha;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}

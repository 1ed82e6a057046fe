use std::f32::consts::{FRAC_PI_2, TAU};

use rand::Rng;

use crate::audio::features::{AudioFeatures, MAX_FRAME_ENERGY, SPECTRUM_BINS};
use crate::config::DEFAULT_STARS;

use super::canvas::{BlendMode, Canvas, Rgb};
use super::palette::Palette;

const LAYERS: usize = 3;
/// Only every Nth bin is drawn, starting after DC.
const BIN_STEP: usize = 4;
/// Normalized energy below which nothing is drawn.
const NOISE_FLOOR: f32 = 0.2;
const WHITE: Rgb = [255, 255, 255];

/// Paints the orbit artwork for a clip.
#[derive(Clone, Debug)]
pub struct OrbitRenderer {
    stars: usize,
}

impl Default for OrbitRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_STARS)
    }
}

impl OrbitRenderer {
    pub fn new(stars: usize) -> Self {
        Self { stars }
    }

    /// Fully repaint `canvas`. Only the star field varies between runs.
    pub fn render(&self, features: &AudioFeatures, palette: &Palette, canvas: &mut Canvas) {
        draw_background(canvas);
        scatter_stars(canvas, self.stars, &mut rand::thread_rng());

        canvas.set_blend_mode(BlendMode::Additive);
        draw_rings(canvas, features, palette);
        draw_flares(canvas, features);
        canvas.set_blend_mode(BlendMode::Normal);

        log::debug!(
            "Rendered {} frames and {} onsets onto {}x{}",
            features.frame_count(),
            features.onsets.len(),
            canvas.width(),
            canvas.height()
        );
    }
}

/// Shared polar frame of reference: center and the radius everything is
/// scaled against.
struct Geometry {
    cx: f32,
    cy: f32,
    max_radius: f32,
}

impl Geometry {
    fn of(canvas: &Canvas) -> Self {
        let w = canvas.width() as f32;
        let h = canvas.height() as f32;
        Self {
            cx: w * 0.5,
            cy: h * 0.5,
            max_radius: w.min(h) * 0.48,
        }
    }

    fn point(&self, angle: f32, radius: f32) -> (f32, f32) {
        (self.cx + angle.cos() * radius, self.cy + angle.sin() * radius)
    }
}

/// Angles start at twelve o'clock and run clockwise.
fn angle_for(fraction: f32) -> f32 {
    fraction * TAU - FRAC_PI_2
}

pub fn draw_background(canvas: &mut Canvas) {
    canvas.fill([0, 0, 0]);
}

pub fn scatter_stars<R: Rng + ?Sized>(canvas: &mut Canvas, count: usize, rng: &mut R) {
    let w = canvas.width() as f32;
    let h = canvas.height() as f32;
    for _ in 0..count {
        let x = rng.gen::<f32>() * w;
        let y = rng.gen::<f32>() * h;
        let radius = 0.4 + rng.gen::<f32>() * 1.1;
        let alpha = 0.1 + rng.gen::<f32>() * 0.3;
        canvas.fill_circle(x, y, radius, WHITE, alpha);
    }
}

/// Three bands of radial strokes, one stroke per (frame, sampled bin).
pub fn draw_rings(canvas: &mut Canvas, features: &AudioFeatures, palette: &Palette) {
    let frame_count = features.frame_count();
    if frame_count == 0 {
        return;
    }
    let geometry = Geometry::of(canvas);
    let colors = palette.rgb();
    let max_length = geometry.max_radius * 0.16;
    let wave_amplitude = geometry.max_radius * 0.02;

    for layer in 0..LAYERS {
        let base_radius = geometry.max_radius * (0.22 + 0.2 * layer as f32);
        let width = 1.0 + 0.25 * layer as f32;

        for (frame_idx, frame) in features.spectrogram.iter().enumerate() {
            let angle = angle_for(frame_idx as f32 / frame_count as f32);

            for bin in (1..SPECTRUM_BINS).step_by(BIN_STEP) {
                let energy = frame[bin] as f32 / 255.0;
                if energy < NOISE_FLOOR {
                    continue;
                }

                let color = colors[(bin * 3 / SPECTRUM_BINS).min(2)];
                let wave = (frame_idx as f32 * 0.02 + layer as f32 * 1.3 + bin as f32 * 0.15).sin()
                    * wave_amplitude;
                let inner = base_radius + wave;
                let outer = inner + energy * max_length;

                canvas.stroke_line(
                    geometry.point(angle, inner),
                    geometry.point(angle, outer),
                    width,
                    color,
                    energy * 0.3,
                );
            }
        }
    }
}

/// White radial streaks at each onset, fading outward.
pub fn draw_flares(canvas: &mut Canvas, features: &AudioFeatures) {
    if features.duration <= 0.0 {
        return;
    }
    let geometry = Geometry::of(canvas);
    let inner = geometry.max_radius * 0.15;
    let outer = geometry.max_radius * 0.95;

    for onset in &features.onsets {
        let intensity = (onset.energy / MAX_FRAME_ENERGY).min(1.0);
        if intensity < NOISE_FLOOR {
            continue;
        }
        let angle = angle_for(onset.time / features.duration);
        canvas.stroke_gradient_line(
            geometry.point(angle, inner),
            geometry.point(angle, outer),
            1.0 + intensity * 3.0,
            WHITE,
            1.0,
            0.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::Onset;

    fn features() -> AudioFeatures {
        let spectrogram = (0..120)
            .map(|i| {
                let mut frame = [0u8; SPECTRUM_BINS];
                for (bin, value) in frame.iter_mut().enumerate() {
                    *value = ((i * 7 + bin * 13) % 256) as u8;
                }
                frame
            })
            .collect();
        AudioFeatures {
            duration: 3.0,
            sample_rate: 44_100,
            channel_data: Vec::new(),
            spectrogram,
            onsets: vec![
                Onset { time: 0.5, energy: MAX_FRAME_ENERGY * 0.9 },
                Onset { time: 2.0, energy: MAX_FRAME_ENERGY * 0.05 },
            ],
        }
    }

    fn paint_deterministic(features: &AudioFeatures) -> Canvas {
        let palette = Palette::from_features(features);
        let mut canvas = Canvas::new(128, 128).unwrap();
        draw_background(&mut canvas);
        canvas.set_blend_mode(BlendMode::Additive);
        draw_rings(&mut canvas, features, &palette);
        draw_flares(&mut canvas, features);
        canvas
    }

    #[test]
    fn rings_and_flares_are_deterministic() {
        let features = features();
        assert_eq!(paint_deterministic(&features), paint_deterministic(&features));
    }

    #[test]
    fn rings_paint_something() {
        let canvas = paint_deterministic(&features());
        assert!(canvas.pixels().chunks(4).any(|p| p[..3] != [0, 0, 0]));
    }

    #[test]
    fn empty_spectrogram_leaves_plain_background() {
        let mut canvas = Canvas::new(32, 32).unwrap();
        let empty = AudioFeatures::default();
        OrbitRenderer::new(0).render(&empty, &Palette::triadic(0.0), &mut canvas);
        assert!(canvas.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn stars_repeat_for_a_fixed_seed() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha20Rng;

        let paint = |seed: u64| {
            let mut canvas = Canvas::new(64, 64).unwrap();
            draw_background(&mut canvas);
            scatter_stars(&mut canvas, 50, &mut ChaCha20Rng::seed_from_u64(seed));
            canvas
        };
        assert_eq!(paint(3), paint(3));
        assert_ne!(paint(3), paint(4));
        assert!(paint(3).pixels().chunks(4).any(|p| p[..3] != [0, 0, 0]));
    }

    #[test]
    fn weak_onsets_are_skipped() {
        let mut weak = features();
        weak.spectrogram.clear();
        weak.onsets.retain(|o| o.energy < MAX_FRAME_ENERGY * 0.2);

        let mut canvas = Canvas::new(64, 64).unwrap();
        draw_background(&mut canvas);
        draw_flares(&mut canvas, &weak);
        assert!(canvas.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn render_keeps_canvas_opaque() {
        let features = features();
        let mut canvas = Canvas::new(96, 96).unwrap();
        OrbitRenderer::default().render(&features, &Palette::from_features(&features), &mut canvas);
        assert!(canvas.pixels().chunks(4).all(|p| p[3] == 255));
    }
}

//! Triadic color palette seeded from the spectrogram.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::audio::features::AudioFeatures;

use super::canvas::Rgb;

/// Frames that contribute to the palette seed.
const SEED_FRAMES: usize = 100;
const SATURATION: f32 = 0.8;
const LIGHTNESS: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Degrees, 0.0-360.0
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn to_rgb(self) -> Rgb {
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let s = self.saturation.clamp(0.0, 1.0);
        let l = self.lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma * 0.5;
        let to_byte = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_byte(r), to_byte(g), to_byte(b)]
    }
}

/// Low, mid and high band colors, 120 degrees apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub colors: [Hsl; 3],
}

impl Palette {
    pub fn from_features(features: &AudioFeatures) -> Self {
        let seed = palette_seed(features);
        let mut rng = ChaCha20Rng::seed_from_u64(seed as u64);
        let base_hue = rng.gen::<f32>() * 360.0;
        log::debug!("Palette seed {} -> base hue {:.1}", seed, base_hue);
        Self::triadic(base_hue)
    }

    pub fn triadic(base_hue: f32) -> Self {
        let color = |offset: f32| Hsl {
            hue: (base_hue + offset).rem_euclid(360.0),
            saturation: SATURATION,
            lightness: LIGHTNESS,
        };
        Self {
            colors: [color(0.0), color(120.0), color(240.0)],
        }
    }

    pub fn base_hue(&self) -> f32 {
        self.colors[0].hue
    }

    pub fn rgb(&self) -> [Rgb; 3] {
        self.colors.map(Hsl::to_rgb)
    }
}

/// Sum of the quantized magnitudes of the leading frames, each offset by its
/// index so silent clips still produce distinct seeds per length.
pub fn palette_seed(features: &AudioFeatures) -> u32 {
    features
        .spectrogram
        .iter()
        .take(SEED_FRAMES)
        .enumerate()
        .fold(0u32, |seed, (idx, frame)| {
            let frame_sum: u32 = frame.iter().map(|&b| b as u32).sum();
            seed.wrapping_add(frame_sum).wrapping_add(idx as u32)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::SPECTRUM_BINS;

    fn features_with(frames: Vec<[u8; SPECTRUM_BINS]>) -> AudioFeatures {
        AudioFeatures {
            spectrogram: frames,
            ..Default::default()
        }
    }

    #[test]
    fn identical_features_give_identical_palettes() {
        let features = features_with(vec![[17; SPECTRUM_BINS]; 40]);
        assert_eq!(Palette::from_features(&features), Palette::from_features(&features));
    }

    #[test]
    fn different_spectra_change_the_hue() {
        let a = features_with(vec![[17; SPECTRUM_BINS]; 40]);
        let b = features_with(vec![[90; SPECTRUM_BINS]; 40]);
        assert_ne!(
            Palette::from_features(&a).base_hue(),
            Palette::from_features(&b).base_hue()
        );
    }

    #[test]
    fn seeded_generator_repeats_its_sequence() {
        let draw = |seed: u64| -> Vec<f32> {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            (0..64).map(|_| rng.gen::<f32>()).collect()
        };
        assert_eq!(draw(42), draw(42));
        assert_ne!(draw(1), draw(2));
        assert!(draw(0xDEAD_BEEF).iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn hue_follows_the_seed() {
        let features = features_with(vec![[17; SPECTRUM_BINS]; 40]);
        let seed = palette_seed(&features);
        let expected = ChaCha20Rng::seed_from_u64(seed as u64).gen::<f32>() * 360.0;
        let palette = Palette::from_features(&features);
        assert_eq!(palette.base_hue(), expected.rem_euclid(360.0));
        assert!((0.0..360.0).contains(&palette.base_hue()));
    }

    #[test]
    fn hues_are_triadic() {
        let palette = Palette::triadic(300.0);
        assert_eq!(palette.colors[1].hue, 60.0);
        assert_eq!(palette.colors[2].hue, 180.0);
        for hsl in palette.colors {
            assert!((0.0..360.0).contains(&hsl.hue));
        }
    }

    #[test]
    fn seed_only_reads_leading_frames() {
        let mut frames = vec![[1; SPECTRUM_BINS]; SEED_FRAMES];
        let short = palette_seed(&features_with(frames.clone()));
        frames.push([200; SPECTRUM_BINS]);
        assert_eq!(short, palette_seed(&features_with(frames)));
    }

    #[test]
    fn silent_clips_of_different_length_differ() {
        let a = palette_seed(&features_with(vec![[0; SPECTRUM_BINS]; 3]));
        let b = palette_seed(&features_with(vec![[0; SPECTRUM_BINS]; 4]));
        assert_ne!(a, b);
    }

    #[test]
    fn hsl_primaries() {
        let red = Hsl { hue: 0.0, saturation: 1.0, lightness: 0.5 };
        let blue = Hsl { hue: 240.0, saturation: 1.0, lightness: 0.5 };
        assert_eq!(red.to_rgb(), [255, 0, 0]);
        assert_eq!(blue.to_rgb(), [0, 0, 255]);
    }
}

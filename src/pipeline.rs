//! Encode and decode entry points.
//!
//! Both run their stages strictly in sequence and own every buffer they
//! allocate, so independent calls may run on separate threads. `progress`
//! receives a short description at each stage boundary and has no influence
//! on the result.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::audio::{decode_audio, extract_features, AudioFeatures};
use crate::config::{AnalysisConfig, Config, DEFAULT_CANVAS_SIZE, DEFAULT_STARS};
use crate::error::{OrbitError, Result};
use crate::render::{canvas, Canvas, OrbitRenderer, Palette};
use crate::stego::{self, header, StegoHeader};

#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Side of the square output image
    pub size: u32,
    /// Decorative background stars
    pub stars: usize,
    pub analysis: AnalysisConfig,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_CANVAS_SIZE,
            stars: DEFAULT_STARS,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl From<&Config> for EncodeOptions {
    fn from(config: &Config) -> Self {
        Self {
            size: config.canvas.size,
            stars: config.canvas.stars,
            analysis: config.analysis.clone(),
        }
    }
}

/// Payload recovered from an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Header and carrier details of an encoded image.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub capacity: usize,
    pub header: StegoHeader,
}

/// Render `audio` as an orbit image with the file's bytes hidden inside.
/// Returns PNG bytes.
pub fn encode<F>(audio: &[u8], mime_type: &str, options: &EncodeOptions, mut progress: F) -> Result<Vec<u8>>
where
    F: FnMut(&str),
{
    progress("Decoding audio...");
    let decoded = decode_audio(audio, Some(mime_type))?;

    canvas::buffer_len(options.size, options.size)?;
    let frame = header::serialize_frame(mime_type, audio)?;
    let capacity = stego::capacity(options.size, options.size);
    if frame.len() > capacity {
        return Err(OrbitError::CapacityExceeded {
            required: frame.len(),
            capacity,
        });
    }

    progress("Extracting audio features...");
    let features = extract_features(decoded, &options.analysis);

    let canvas = render_and_embed(&features, &frame, options, &mut progress)?;

    progress("Encoding PNG...");
    let png = encode_png(canvas)?;
    log::info!(
        "Encoded {} bytes of {} into a {} byte PNG",
        audio.len(),
        mime_type,
        png.len()
    );

    progress("Done");
    Ok(png)
}

/// Paint `features` and hide an already framed stream in the result.
pub fn render_and_embed<F>(
    features: &AudioFeatures,
    frame: &[u8],
    options: &EncodeOptions,
    mut progress: F,
) -> Result<Canvas>
where
    F: FnMut(&str),
{
    progress("Generating palette...");
    let palette = Palette::from_features(features);

    progress("Rendering orbit...");
    let mut canvas = Canvas::new(options.size, options.size)?;
    OrbitRenderer::new(options.stars).render(features, &palette, &mut canvas);

    progress("Embedding audio data...");
    stego::embed(&mut canvas, frame)?;
    Ok(canvas)
}

/// Recover the hidden file from an image produced by [`encode`].
pub fn decode<F>(image: &[u8], mut progress: F) -> Result<DecodedAudio>
where
    F: FnMut(&str),
{
    progress("Loading image...");
    let canvas = decode_png(image)?;

    progress("Extracting hidden data...");
    let raw = stego::extract(&canvas);

    progress("Parsing header...");
    let parsed = header::parse_frame(&raw)?;
    let decoded = DecodedAudio {
        bytes: parsed.payload.to_vec(),
        mime_type: parsed.header.mime().to_string(),
    };
    log::info!(
        "Decoded {} bytes of {} from {}x{} image",
        decoded.bytes.len(),
        decoded.mime_type,
        canvas.width(),
        canvas.height()
    );

    progress("Done");
    Ok(decoded)
}

/// Read the embedded header without copying the payload out.
pub fn inspect(image: &[u8]) -> Result<ImageInfo> {
    let canvas = decode_png(image)?;
    let raw = stego::extract(&canvas);
    let header = header::parse_header(&raw)?;
    Ok(ImageInfo {
        width: canvas.width(),
        height: canvas.height(),
        capacity: raw.len(),
        header,
    })
}

pub fn encode_png(canvas: Canvas) -> Result<Vec<u8>> {
    let (width, height) = (canvas.width(), canvas.height());
    let img = RgbaImage::from_raw(width, height, canvas.into_pixels()).ok_or_else(|| {
        OrbitError::CanvasUnavailable(format!("pixel buffer does not match {width}x{height}"))
    })?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| OrbitError::PngEncode(e.to_string()))?;
    Ok(out.into_inner())
}

pub fn decode_png(bytes: &[u8]) -> Result<Canvas> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| OrbitError::InvalidImage(e.to_string()))?
        .into_rgba8();
    let (width, height) = img.dimensions();
    Canvas::from_rgba(width, height, img.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_preserves_every_byte() {
        let pixels: Vec<u8> = (0..16 * 16 * 4).map(|i| (i * 37 % 256) as u8).collect();
        let canvas = Canvas::from_rgba(16, 16, pixels.clone()).unwrap();
        let png = encode_png(canvas).unwrap();
        assert_eq!(decode_png(&png).unwrap().pixels(), pixels.as_slice());
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        assert!(matches!(decode(b"nope", |_| {}), Err(OrbitError::InvalidImage(_))));
    }

    #[test]
    fn unsupported_audio_fails_before_rendering() {
        let mut stages = Vec::new();
        let result = encode(b"not audio", "audio/wav", &EncodeOptions::default(), |s| {
            stages.push(s.to_string())
        });
        assert!(matches!(result, Err(OrbitError::UnsupportedAudioFormat(_))));
        assert_eq!(stages, vec!["Decoding audio..."]);
    }
}

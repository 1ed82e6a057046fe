use crate::error::{OrbitError, Result};

pub type Rgb = [u8; 3];

/// Bytes per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// How new paint combines with existing pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over alpha compositing.
    #[default]
    Normal,
    /// Alpha-weighted addition, saturating at 255.
    Additive,
}

/// Owned RGBA8 pixel buffer in raster order, with a few antialiased
/// drawing primitives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    blend: BlendMode,
}

impl Canvas {
    /// Allocate a transparent black canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = buffer_len(width, height)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|e| {
            OrbitError::CanvasUnavailable(format!("cannot allocate {width}x{height}: {e}"))
        })?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            pixels,
            blend: BlendMode::Normal,
        })
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = buffer_len(width, height)?;
        if pixels.len() != len {
            return Err(OrbitError::CanvasUnavailable(format!(
                "expected {} bytes for {}x{}, got {}",
                len,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            blend: BlendMode::Normal,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    /// Overwrite every pixel with an opaque color, ignoring the blend mode.
    pub fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(CHANNELS) {
            px[..3].copy_from_slice(&color);
            px[3] = 255;
        }
    }

    /// Composite `color` at `alpha` (0.0-1.0) onto one pixel. Out-of-bounds
    /// coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &mut self.pixels[idx..idx + CHANNELS];
        match self.blend {
            BlendMode::Normal => {
                let inv_a = 1.0 - a;
                for c in 0..3 {
                    px[c] = to_byte(color[c] as f32 * a + px[c] as f32 * inv_a);
                }
                px[3] = to_byte(255.0 * a + px[3] as f32 * inv_a);
            }
            BlendMode::Additive => {
                for c in 0..3 {
                    px[c] = to_byte(px[c] as f32 + color[c] as f32 * a);
                }
                px[3] = to_byte(px[3] as f32 + 255.0 * a);
            }
        }
    }

    /// Filled, antialiased disc.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
        let reach = radius + 0.5;
        let x_min = (cx - reach).floor() as i64;
        let x_max = (cx + reach).ceil() as i64;
        let y_min = (cy - reach).floor() as i64;
        let y_max = (cy + reach).ceil() as i64;
        for py in y_min..=y_max {
            for px in x_min..=x_max {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let coverage = (reach - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, alpha * coverage);
                }
            }
        }
    }

    /// Straight segment with butt caps.
    pub fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb, alpha: f32) {
        self.stroke_with(from, to, width, |_| (color, alpha));
    }

    /// Segment whose alpha fades linearly from `alpha_from` to `alpha_to`.
    pub fn stroke_gradient_line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
        alpha_from: f32,
        alpha_to: f32,
    ) {
        self.stroke_with(from, to, width, |t| {
            (color, alpha_from + (alpha_to - alpha_from) * t)
        });
    }

    /// Walks the major axis of the segment and visits each pixel near it once,
    /// asking `shade` for color and alpha at the projected position `t`.
    fn stroke_with<F>(&mut self, from: (f32, f32), to: (f32, f32), width: f32, shade: F)
    where
        F: Fn(f32) -> (Rgb, f32),
    {
        let (x0, y0) = from;
        let (x1, y1) = to;
        let dx = x1 - x0;
        let dy = y1 - y0;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f32::EPSILON {
            return;
        }
        let len = len_sq.sqrt();
        let half = (width * 0.5).max(0.5);
        let steep = dy.abs() > dx.abs();

        // (major, minor) coordinates; swapped back when plotting.
        let (a0, b0, da, db) = if steep { (y0, x0, dy, dx) } else { (x0, y0, dx, dy) };
        let a_min = (a0.min(a0 + da) - half).floor() as i64;
        let a_max = (a0.max(a0 + da) + half).ceil() as i64;
        let extent = half * len / da.abs() + 1.0;

        for a in a_min..=a_max {
            let center_b = b0 + (a as f32 + 0.5 - a0) * db / da;
            let b_min = (center_b - extent).floor() as i64;
            let b_max = (center_b + extent).ceil() as i64;
            for b in b_min..=b_max {
                let (px, py) = if steep { (b, a) } else { (a, b) };
                let cx = px as f32 + 0.5 - x0;
                let cy = py as f32 + 0.5 - y0;
                let t = (cx * dx + cy * dy) / len_sq;
                if !(0.0..=1.0).contains(&t) {
                    continue;
                }
                let distance = (cx * dy - cy * dx).abs() / len;
                let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let (color, alpha) = shade(t);
                    self.blend_pixel(px, py, color, alpha * coverage);
                }
            }
        }
    }
}

pub(crate) fn buffer_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(OrbitError::CanvasUnavailable(format!(
            "invalid dimensions {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| OrbitError::CanvasUnavailable(format!("{width}x{height} is too large")))
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 255.0) + 0.5) as u8
}

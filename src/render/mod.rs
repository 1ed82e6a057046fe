pub mod canvas;
pub mod orbit;
pub mod palette;

pub use canvas::{BlendMode, Canvas, Rgb};
pub use orbit::OrbitRenderer;
pub use palette::{Hsl, Palette};

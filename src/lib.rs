//! Hide an audio file inside a PNG that pictures its spectrum.
//!
//! The image is an "orbit": rings of radial strokes drawn from the clip's
//! spectrogram, with flares at detected onsets. The original file's bytes are
//! stored losslessly in the two low bits of every color channel, behind a
//! small JSON header, and can be recovered exactly with [`decode`].

pub mod audio;
pub mod config;
pub mod error;
pub mod mime;
pub mod pipeline;
pub mod render;
pub mod stego;

pub use config::{AnalysisConfig, CanvasConfig, Config};
pub use error::{OrbitError, Result};
pub use pipeline::{decode, encode, inspect, DecodedAudio, EncodeOptions, ImageInfo};

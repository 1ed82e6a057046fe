pub mod analysis;
pub mod decode;
pub mod features;

pub use analysis::extract_features;
pub use decode::{decode_audio, AudioData};
pub use features::{AudioFeatures, Onset, SpectrumFrame};

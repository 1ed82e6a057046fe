use clap::{Parser, Subcommand};
use std::path::PathBuf;

use audio_orbit::config::{DEFAULT_CANVAS_SIZE, DEFAULT_STARS};

#[derive(Parser, Debug)]
#[command(name = "audio-orbit", version, about = "Hide audio files inside generated orbit images")]
pub struct Cli {
    /// Config file (defaults to ./audio-orbit.toml or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render an audio file as an orbit image with the file embedded
    Encode {
        /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
        input: PathBuf,

        /// Output PNG (defaults to the input name with .png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// MIME type stored in the image (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Side of the square image in pixels
        #[arg(long, default_value_t = DEFAULT_CANVAS_SIZE)]
        size: u32,

        /// Number of decorative background stars
        #[arg(long, default_value_t = DEFAULT_STARS)]
        stars: usize,
    },
    /// Recover the audio file hidden in an orbit image
    Decode {
        /// Image produced by `encode`
        image: PathBuf,

        /// Output file (defaults to the image name with the audio's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the embedded header and the image's capacity
    Inspect {
        image: PathBuf,
    },
}

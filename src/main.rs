mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use audio_orbit::config::{self, Config};
use audio_orbit::{mime, stego, EncodeOptions};
use cli::{Cli, Command};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Encode {
            input,
            output,
            mime,
            size,
            stars,
        } => {
            let mut options = EncodeOptions::from(&config);
            // Config values apply only when the flag is at its default.
            if size != config::DEFAULT_CANVAS_SIZE {
                options.size = size;
            }
            if stars != config::DEFAULT_STARS {
                options.stars = stars;
            }
            run_encode(&input, output, mime, &options)
        }
        Command::Decode { image, output } => run_decode(&image, output),
        Command::Inspect { image } => run_inspect(&image),
    }
}

fn run_encode(
    input: &Path,
    output: Option<PathBuf>,
    mime_type: Option<String>,
    options: &EncodeOptions,
) -> Result<()> {
    let audio = std::fs::read(input)
        .with_context(|| format!("Failed to read audio file: {}", input.display()))?;
    let mime_type = mime_type.unwrap_or_else(|| mime::mime_for_path(input).to_string());
    let output = output.unwrap_or_else(|| input.with_extension("png"));

    log::info!("Input: {} ({}, {} bytes)", input.display(), mime_type, audio.len());
    log::info!("Output: {}", output.display());
    log::info!(
        "Canvas: {}x{} (capacity {} bytes)",
        options.size,
        options.size,
        stego::capacity(options.size, options.size)
    );

    let spinner = stage_spinner();
    let png = audio_orbit::encode(&audio, &mime_type, options, |stage| {
        spinner.set_message(stage.to_string())
    });
    spinner.finish_and_clear();
    let png = png.context("Encoding failed")?;

    std::fs::write(&output, &png)
        .with_context(|| format!("Failed to write image: {}", output.display()))?;
    log::info!("Done! Output: {}", output.display());
    Ok(())
}

fn run_decode(image: &Path, output: Option<PathBuf>) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image: {}", image.display()))?;

    let spinner = stage_spinner();
    let decoded = audio_orbit::decode(&bytes, |stage| spinner.set_message(stage.to_string()));
    spinner.finish_and_clear();
    let decoded = decoded.context("Decoding failed")?;

    let output = output.unwrap_or_else(|| {
        let ext = mime::extension_for(&decoded.mime_type).unwrap_or("bin");
        image.with_extension(ext)
    });
    if output == image {
        anyhow::bail!("Refusing to overwrite the input image: {}", image.display());
    }

    std::fs::write(&output, &decoded.bytes)
        .with_context(|| format!("Failed to write audio file: {}", output.display()))?;
    log::info!(
        "Recovered {} bytes ({}) -> {}",
        decoded.bytes.len(),
        decoded.mime_type,
        output.display()
    );
    Ok(())
}

fn run_inspect(image: &Path) -> Result<()> {
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image: {}", image.display()))?;
    let info = audio_orbit::inspect(&bytes).context("Not a readable Audio Orbit image")?;

    println!("Image:           {}x{}", info.width, info.height);
    println!("Capacity:        {} bytes", info.capacity);
    println!("Magic:           {}", info.header.magic);
    println!("MIME type:       {}", info.header.mime());
    println!("Payload length:  {} bytes", info.header.payload_length);
    println!("Bits per channel: {}", info.header.bits_per_channel);
    Ok(())
}

fn stage_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{OrbitError, Result};

/// Decoded PCM, one vector per channel.
pub struct AudioData {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl AudioData {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Average of all channels.
    pub fn mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            count => (0..self.frames())
                .map(|i| {
                    // Channels shorter than the first read as silence.
                    let sum: f32 = self.channels.iter().map(|c| c.get(i).copied().unwrap_or(0.0)).sum();
                    sum / count as f32
                })
                .collect(),
        }
    }
}

/// Decode an in-memory audio file. `mime_type` is only a probing hint.
pub fn decode_audio(bytes: &[u8], mime_type: Option<&str>) -> Result<AudioData> {
    let source = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), Default::default());

    let mut hint = Hint::new();
    if let Some(mime) = mime_type {
        hint.mime_type(mime);
        if let Some(ext) = crate::mime::extension_for(mime) {
            hint.with_extension(ext);
        }
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| OrbitError::UnsupportedAudioFormat("no audio tracks found".into()))?;

    let track_id = track.id;
    let channel_count = track.codec_params.channels.map_or(1, |c| c.count()).max(1);
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| OrbitError::UnsupportedAudioFormat("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let packet_channels = spec.channels.count().max(1);
        for frame in sample_buf.samples().chunks(packet_channels) {
            for (ch, samples) in channels.iter_mut().enumerate() {
                samples.push(frame.get(ch).copied().unwrap_or(0.0));
            }
        }
    }

    let audio = AudioData {
        channels,
        sample_rate,
    };

    log::info!(
        "Decoded audio: {} channel(s), {} frames, {}Hz, {:.1}s",
        audio.channels.len(),
        audio.frames(),
        sample_rate,
        audio.duration()
    );

    Ok(audio)
}

//! Self-describing frame wrapped around the hidden payload.
//!
//! ```text
//! [4 bytes ] header length (big-endian u32)
//! [N bytes ] header, UTF-8 JSON:
//!            {"magic":"AORBIT","mimeType":"<32 bytes, NUL padded>",
//!             "payloadLength":<u64>,"bitsPerChannel":2}
//! [M bytes ] payload
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, Result};

/// Identifies images produced by this crate.
pub const MAGIC: &str = "AORBIT";
/// Low bits replaced in each color channel.
pub const BITS_PER_CHANNEL: u8 = 2;
/// MIME types are NUL padded to this many bytes.
pub const MIME_FIELD_LEN: usize = 32;
/// Size of the big-endian header length field.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Serialized headers always open with the magic field.
const MAGIC_PREFIX: &[u8] = br#"{"magic":""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StegoHeader {
    pub magic: String,
    /// Padded form, as stored on the wire
    pub mime_type: String,
    pub payload_length: u64,
    pub bits_per_channel: u8,
}

impl StegoHeader {
    pub fn new(mime_type: &str, payload_length: usize) -> Self {
        Self {
            magic: MAGIC.to_string(),
            mime_type: pad_mime(mime_type),
            payload_length: payload_length as u64,
            bits_per_channel: BITS_PER_CHANNEL,
        }
    }

    /// MIME type with padding removed.
    pub fn mime(&self) -> &str {
        self.mime_type.trim_end_matches('\0')
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| OrbitError::corrupted(format!("cannot serialize header: {e}")))
    }
}

/// Right-pad with NUL to [`MIME_FIELD_LEN`] bytes. Longer values are kept whole.
pub fn pad_mime(mime_type: &str) -> String {
    let mut padded = mime_type.to_string();
    while padded.len() < MIME_FIELD_LEN {
        padded.push('\0');
    }
    padded
}

/// Build the framed byte stream for `payload`.
pub fn serialize_frame(mime_type: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let header = StegoHeader::new(mime_type, payload.len()).to_json()?;
    let header_len = u32::try_from(header.len())
        .map_err(|_| OrbitError::corrupted("header longer than u32::MAX"))?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_LEN + header.len() + payload.len());
    frame.extend_from_slice(&header_len.to_be_bytes());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Total framed size for a payload of `payload_len` bytes.
pub fn framed_len(mime_type: &str, payload_len: usize) -> usize {
    let header = StegoHeader::new(mime_type, payload_len);
    let header_len = serde_json::to_vec(&header).map_or(0, |json| json.len());
    LENGTH_PREFIX_LEN + header_len + payload_len
}

/// Header plus a view of the payload bytes it describes.
#[derive(Debug)]
pub struct ParsedFrame<'a> {
    pub header: StegoHeader,
    pub payload: &'a [u8],
}

/// Parse a framed stream. `data` may carry trailing bytes past the payload;
/// they are ignored.
pub fn parse_frame(data: &[u8]) -> Result<ParsedFrame<'_>> {
    let header_bytes = read_header_bytes(data)?;
    let header = decode_header(header_bytes)?;

    let payload_start = LENGTH_PREFIX_LEN + header_bytes.len();
    let available = data.len() - payload_start;
    let payload_len = usize::try_from(header.payload_length)
        .ok()
        .filter(|&len| len <= available)
        .ok_or_else(|| {
            OrbitError::corrupted(format!(
                "payload length {} exceeds {} available bytes",
                header.payload_length, available
            ))
        })?;

    Ok(ParsedFrame {
        payload: &data[payload_start..payload_start + payload_len],
        header,
    })
}

/// Read only the header of a frame, without requiring the payload.
pub fn parse_header(data: &[u8]) -> Result<StegoHeader> {
    decode_header(read_header_bytes(data)?)
}

fn decode_header(header_bytes: &[u8]) -> Result<StegoHeader> {
    check_magic_bytes(header_bytes)?;

    let header: StegoHeader = serde_json::from_slice(header_bytes)
        .map_err(|e| OrbitError::corrupted(format!("header is not valid JSON: {e}")))?;

    if header.magic != MAGIC {
        return Err(OrbitError::InvalidMagic { found: header.magic });
    }
    if header.bits_per_channel != BITS_PER_CHANNEL {
        return Err(OrbitError::corrupted(format!(
            "unsupported bits per channel: {}",
            header.bits_per_channel
        )));
    }
    Ok(header)
}

fn read_header_bytes(data: &[u8]) -> Result<&[u8]> {
    let prefix: [u8; LENGTH_PREFIX_LEN] = data
        .get(..LENGTH_PREFIX_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| OrbitError::corrupted("stream shorter than length prefix"))?;
    let header_len = u32::from_be_bytes(prefix) as usize;

    data.get(LENGTH_PREFIX_LEN..LENGTH_PREFIX_LEN.saturating_add(header_len))
        .ok_or_else(|| {
            OrbitError::corrupted(format!(
                "header length {} exceeds {} available bytes",
                header_len,
                data.len() - LENGTH_PREFIX_LEN
            ))
        })
}

/// Compare the raw magic bytes before any JSON decoding, so that damage to
/// the magic field is always reported as a magic mismatch.
fn check_magic_bytes(header: &[u8]) -> Result<()> {
    let start = MAGIC_PREFIX.len();
    let end = start + MAGIC.len();
    let found = header.get(start..end.min(header.len())).unwrap_or_default();
    if header.starts_with(MAGIC_PREFIX) && found == MAGIC.as_bytes() {
        return Ok(());
    }
    Err(OrbitError::InvalidMagic {
        found: String::from_utf8_lossy(found).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_matches_header() {
        let frame = serialize_frame("audio/mpeg", b"abc").unwrap();
        let header_len = u32::from_be_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(frame.len(), 4 + header_len + 3);
        let header: StegoHeader = serde_json::from_slice(&frame[4..4 + header_len]).unwrap();
        assert_eq!(header.payload_length, 3);
        assert_eq!(header.mime_type.len(), MIME_FIELD_LEN);
        assert_eq!(&frame[4 + header_len..], b"abc");
    }

    #[test]
    fn header_fields_are_camel_case_in_order() {
        let frame = serialize_frame("audio/wav", &[]).unwrap();
        let json = std::str::from_utf8(&frame[4..]).unwrap();
        assert!(json.starts_with(r#"{"magic":"AORBIT","mimeType":"audio/wav"#));
        assert!(json.ends_with(r#""payloadLength":0,"bitsPerChannel":2}"#));
    }

    #[test]
    fn parse_strips_padding_and_ignores_trailing_bytes() {
        let mut frame = serialize_frame("audio/ogg", b"payload").unwrap();
        frame.extend_from_slice(&[0xAA; 50]);
        let parsed = parse_frame(&frame).unwrap();
        assert_eq!(parsed.header.mime(), "audio/ogg");
        assert_eq!(parsed.payload, b"payload");
    }

    #[test]
    fn framed_len_matches_serialization() {
        for len in [0usize, 9, 10, 12_345] {
            let payload = vec![7u8; len];
            assert_eq!(framed_len("audio/flac", len), serialize_frame("audio/flac", &payload).unwrap().len());
        }
    }

    #[test]
    fn long_mime_is_not_truncated() {
        let mime = "application/vnd.example.extremely-long-audio-type";
        let frame = serialize_frame(mime, b"x").unwrap();
        assert_eq!(parse_frame(&frame).unwrap().header.mime(), mime);
    }

    #[test]
    fn short_stream_is_corrupted() {
        assert!(matches!(parse_frame(&[0, 0]), Err(OrbitError::CorruptedHeader(_))));
    }

    #[test]
    fn oversized_header_length_is_corrupted() {
        let mut frame = serialize_frame("audio/wav", b"abc").unwrap();
        frame[..4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(parse_frame(&frame), Err(OrbitError::CorruptedHeader(_))));
    }

    #[test]
    fn truncated_payload_is_corrupted() {
        let frame = serialize_frame("audio/wav", b"abcdef").unwrap();
        let truncated = &frame[..frame.len() - 2];
        assert!(matches!(parse_frame(truncated), Err(OrbitError::CorruptedHeader(_))));
    }

    #[test]
    fn any_magic_byte_change_is_invalid_magic() {
        let frame = serialize_frame("text/plain", b"hello world").unwrap();
        let magic_at = LENGTH_PREFIX_LEN + MAGIC_PREFIX.len();
        for offset in 0..MAGIC.len() {
            for replacement in [b'"', b'\\', 0x00, 0xFF, b'a', frame[magic_at + offset] ^ 0x01] {
                if replacement == frame[magic_at + offset] {
                    continue;
                }
                let mut tampered = frame.clone();
                tampered[magic_at + offset] = replacement;
                assert!(
                    matches!(parse_frame(&tampered), Err(OrbitError::InvalidMagic { .. })),
                    "offset {offset} replacement {replacement:#x}"
                );
            }
        }
    }

    #[test]
    fn broken_json_is_corrupted() {
        let mut frame = serialize_frame("text/plain", b"hi").unwrap();
        let last_header_byte = frame.len() - 3;
        frame[last_header_byte] = b',';
        assert!(matches!(parse_frame(&frame), Err(OrbitError::CorruptedHeader(_))));
    }

    #[test]
    fn parse_header_reads_without_payload() {
        let frame = serialize_frame("audio/aac", &[1, 2, 3, 4]).unwrap();
        let header = parse_header(&frame[..frame.len() - 4]).unwrap();
        assert_eq!(header.payload_length, 4);
        assert_eq!(header.mime(), "audio/aac");
    }

    #[test]
    fn unsupported_bits_per_channel_is_corrupted() {
        let mut header = StegoHeader::new("audio/wav", 2);
        header.bits_per_channel = 3;
        let json = serde_json::to_vec(&header).unwrap();
        let mut frame = (json.len() as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(&json);
        frame.extend_from_slice(&[7, 8]);

        assert!(matches!(parse_frame(&frame), Err(OrbitError::CorruptedHeader(_))));
        assert!(matches!(parse_header(&frame), Err(OrbitError::CorruptedHeader(_))));
    }
}

use std::path::Path;

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// (MIME type, canonical extension). The first entry for an extension wins
/// when guessing a MIME type from a path.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("audio/mpeg", "mp3"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/wave", "wav"),
    ("audio/flac", "flac"),
    ("audio/x-flac", "flac"),
    ("audio/ogg", "ogg"),
    ("audio/opus", "opus"),
    ("audio/aac", "aac"),
    ("audio/mp4", "m4a"),
    ("audio/x-m4a", "m4a"),
    ("audio/webm", "webm"),
    ("audio/aiff", "aiff"),
    ("audio/x-aiff", "aif"),
];

/// Guess a MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FALLBACK_MIME;
    };
    let ext = ext.to_ascii_lowercase();
    KNOWN_TYPES
        .iter()
        .find(|(_, known)| *known == ext)
        .map_or(FALLBACK_MIME, |(mime, _)| *mime)
}

/// Conventional extension for a MIME type, ignoring parameters such as
/// `;codecs=opus`.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    KNOWN_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_from_extension() {
        assert_eq!(mime_for_path(Path::new("song.MP3")), "audio/mpeg");
        assert_eq!(mime_for_path(Path::new("a/b/take.wav")), "audio/wav");
        assert_eq!(mime_for_path(Path::new("notes")), FALLBACK_MIME);
        assert_eq!(mime_for_path(Path::new("x.xyz")), FALLBACK_MIME);
    }

    #[test]
    fn extension_ignores_parameters() {
        assert_eq!(extension_for("audio/webm;codecs=opus"), Some("webm"));
        assert_eq!(extension_for("audio/x-wav"), Some("wav"));
        assert_eq!(extension_for("text/plain"), None);
    }
}

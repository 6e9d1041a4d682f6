//! Data-URL image decoding.

use base64::{Engine as _, engine::general_purpose};
use lectern_core::error::ArtifactError;

/// A decoded image payload ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub ext: &'static str,
    pub bytes: Vec<u8>,
}

/// File extension for a declared MIME type. Anything unrecognized is stored
/// as png.
pub fn extension_for(mime: &str) -> &'static str {
    let mime = mime.trim().to_ascii_lowercase();
    if mime.ends_with("jpeg") || mime.ends_with("jpg") {
        "jpg"
    } else if mime.ends_with("webp") {
        "webp"
    } else {
        "png"
    }
}

/// Decode `data:<mime>;base64,<payload>`.
///
/// Returns `Ok(None)` for anything that is not a data URL (those are skipped,
/// not stored) and an `Encoding` error for a data URL that cannot be decoded.
pub fn decode_data_url(url: &str) -> Result<Option<DecodedImage>, ArtifactError> {
    let Some(rest) = url.strip_prefix("data:") else {
        return Ok(None);
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ArtifactError::Encoding("data URL has no payload separator".into()))?;

    let mime = header.split(';').next().unwrap_or_default();
    let mime = if mime.is_empty() { "image/png" } else { mime };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ArtifactError::Encoding(format!("invalid base64 image payload: {e}")))?;

    Ok(Some(DecodedImage {
        ext: extension_for(mime),
        bytes,
    }))
}

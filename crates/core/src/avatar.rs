//! Project/user picture validation and thumbnailing.
//!
//! Uploaded pictures are decoded, shrunk to fit inside a small square, and
//! re-encoded as PNG before storage. Anything that fails to decode as one of
//! the allowed formats is rejected.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::CoreError;

/// MIME types accepted for picture uploads.
pub const ALLOWED_IMAGE_MIME: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Maximum width/height of a stored avatar, in pixels.
pub const AVATAR_MAX_DIM: u32 = 128;

/// Content type of the processed avatar handed to the image store.
pub const AVATAR_CONTENT_TYPE: &str = "image/png";

/// Validate that `mime` is an accepted picture type.
pub fn validate_mime(mime: &str) -> Result<(), CoreError> {
    if ALLOWED_IMAGE_MIME.contains(&mime) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image type '{mime}'. Must be one of: {}",
            ALLOWED_IMAGE_MIME.join(", ")
        )))
    }
}

/// Decode `bytes`, shrink to fit inside [`AVATAR_MAX_DIM`]², re-encode as PNG.
///
/// Aspect ratio is preserved; images already small enough are still
/// re-encoded so stored avatars are uniformly PNG.
pub fn process_avatar(bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("File is not a decodable image: {e}")))?;

    let thumbnail = decoded.thumbnail(AVATAR_MAX_DIM, AVATAR_MAX_DIM);

    let mut out = Vec::new();
    thumbnail
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("Failed to encode avatar: {e}")))?;
    Ok(out)
}

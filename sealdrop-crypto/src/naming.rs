//! Obfuscated storage names for ciphertext blobs.

use chrono::Utc;
use rand::RngCore;

/// Longest extension carried over into a storage name.
const MAX_EXTENSION_LEN: usize = 16;

/// Produces an obfuscated storage name for a ciphertext blob.
///
/// Format: `<epoch-ms>-<128-bit random hex>.<ext>.enc`. The original
/// filename contributes nothing beyond its sanitized extension, the
/// random suffix makes collisions across concurrent uploads vanishingly
/// unlikely, and the result contains no path separators, so it is safe
/// to use as a single storage path component.
pub fn obfuscate_name(original: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();

    let mut random = [0u8; 16];
    rand::rng().fill_bytes(&mut random);

    let extension = sanitize_extension(original);
    format!("{timestamp}-{}.{extension}.enc", hex::encode(random))
}

/// Extracts and sanitizes the extension of a filename: lowercase ASCII
/// alphanumerics only, truncated, with `bin` standing in when the name
/// has no usable extension.
fn sanitize_extension(original: &str) -> String {
    let ext: String = std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() { "bin".to_string() } else { ext }
}

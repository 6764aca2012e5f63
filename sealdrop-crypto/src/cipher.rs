//! AES-256-GCM encryption with detached IV and authentication tag.
//!
//! Every call to [`encrypt`] draws a fresh random 128-bit IV, so the
//! same plaintext never encrypts to the same ciphertext twice. The IV
//! and tag come back hex-encoded for storage next to document metadata;
//! [`decrypt`] reconstructs the cipher from those stored values and
//! verifies the tag before releasing a single byte of plaintext.

use crate::error::{CryptoError, CryptoResult};
use crate::key::MasterKey;
use aes_gcm::aead::consts::U16;
use aes_gcm::aes::Aes256;
use aes_gcm::{AeadInPlace, AesGcm, Key, KeyInit, Nonce, Tag};
use rand::RngCore;

/// IV size in bytes (128-bit GCM nonce).
pub const IV_SIZE: usize = 16;

/// Authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// AES-256-GCM with a 128-bit nonce.
type DocumentCipher = AesGcm<Aes256, U16>;

/// Output of [`encrypt`]: ciphertext plus the hex-encoded parameters
/// required to decrypt it. The IV and tag are stored alongside document
/// metadata, never inside the ciphertext blob.
#[derive(Clone, Debug)]
pub struct EncryptedPayload {
    pub ciphertext: Vec<u8>,
    /// Hex-encoded 128-bit IV.
    pub iv: String,
    /// Hex-encoded 128-bit authentication tag.
    pub auth_tag: String,
}

/// Encrypts a payload under the master key with a fresh random IV.
///
/// Never fails for ordinary byte input; the only error path is an
/// internal cipher failure.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> CryptoResult<EncryptedPayload> {
    let cipher = DocumentCipher::new(Key::<DocumentCipher>::from_slice(key.as_bytes()));

    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedPayload {
        ciphertext: buffer,
        iv: hex::encode(iv),
        auth_tag: hex::encode(tag),
    })
}

/// Decrypts a ciphertext using its stored IV and authentication tag.
///
/// Returns [`CryptoError::Integrity`] if the tag does not verify
/// (payload corrupted or tampered) or if the IV/tag are malformed.
pub fn decrypt(
    key: &MasterKey,
    ciphertext: &[u8],
    iv_hex: &str,
    tag_hex: &str,
) -> CryptoResult<Vec<u8>> {
    let iv: [u8; IV_SIZE] = decode_hex_exact(iv_hex)?;
    let tag: [u8; TAG_SIZE] = decode_hex_exact(tag_hex)?;

    let cipher = DocumentCipher::new(Key::<DocumentCipher>::from_slice(key.as_bytes()));

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&iv),
            b"",
            &mut buffer,
            Tag::from_slice(&tag),
        )
        .map_err(|_| CryptoError::Integrity)?;

    Ok(buffer)
}

/// Decodes a hex string into exactly `N` bytes. Any malformed or
/// wrong-length input is an integrity failure — the stored parameters
/// cannot be trusted.
fn decode_hex_exact<const N: usize>(input: &str) -> CryptoResult<[u8; N]> {
    let bytes = hex::decode(input).map_err(|_| CryptoError::Integrity)?;
    bytes.try_into().map_err(|_| CryptoError::Integrity)
}

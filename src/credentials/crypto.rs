//! Decryption of Chromium-style encrypted cookie values.
//!
//! Encrypted values carry a 3-byte `v10` version tag. The remainder is
//! either AES-128-CBC ciphertext (PKCS7 padding, fixed IV of sixteen
//! spaces) or AES-128-GCM (12-byte nonce + ciphertext + 16-byte tag);
//! which layout an application/OS combination writes is not reliably
//! versioned, so both are tried: CBC first, then GCM. The AES key is
//! always PBKDF2-HMAC-SHA1 of the safe-storage secret with salt
//! "saltysalt" and 1003 iterations.

use aes::Aes128;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use sha1::Sha1;
use sha2::{Digest, Sha256};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Version tag of the supported payload layouts
const VERSION_PREFIX: &[u8] = b"v10";

/// Fixed PBKDF2 salt used by every Chromium safe-storage scheme
const KDF_SALT: &[u8] = b"saltysalt";

/// Fixed PBKDF2 iteration count on macOS
const KDF_ITERATIONS: u32 = 1003;

/// CBC initialization vector: sixteen space characters
const CBC_IV: [u8; 16] = [0x20; 16];

const GCM_NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;

/// Newer cookie schema versions prepend SHA-256(host_key) to the value
const HASH_PREFIX_LEN: usize = 32;

/// Derive the 16-byte AES key from the safe-storage secret.
pub fn derive_cookie_key(master_key: &[u8]) -> [u8; 16] {
    pbkdf2::pbkdf2_hmac_array::<Sha1, 16>(master_key, KDF_SALT, KDF_ITERATIONS)
}

/// Decrypt one encrypted cookie value.
///
/// Returns `None` for unknown version tags, truncated payloads, or when
/// neither cipher layout yields plausible text. Never panics.
pub fn decrypt_cookie_value(encrypted: &[u8], key: &[u8; 16], host_key: &str) -> Option<String> {
    let body = match encrypted.strip_prefix(VERSION_PREFIX) {
        Some(body) => body,
        None => {
            log::trace!("Unsupported cookie payload version");
            return None;
        }
    };

    try_cbc(body, key, host_key).or_else(|| try_gcm(body, key, host_key))
}

fn try_cbc(body: &[u8], key: &[u8; 16], host_key: &str) -> Option<String> {
    let cipher = Aes128CbcDec::new_from_slices(key, &CBC_IV).ok()?;
    let plain = cipher.decrypt_padded_vec_mut::<Pkcs7>(body).ok()?;
    decode_plaintext(&plain, host_key)
}

fn try_gcm(body: &[u8], key: &[u8; 16], host_key: &str) -> Option<String> {
    if body.len() < GCM_NONCE_LEN + GCM_TAG_LEN {
        return None;
    }
    let cipher = Aes128Gcm::new_from_slice(key).ok()?;
    let nonce = Nonce::from_slice(&body[..GCM_NONCE_LEN]);
    let plain = cipher.decrypt(nonce, &body[GCM_NONCE_LEN..]).ok()?;
    decode_plaintext(&plain, host_key)
}

/// Turn decrypted bytes into the cookie value, handling the optional
/// 32-byte integrity prefix. The prefix is stripped confidently when it
/// equals SHA-256 of the row's host key; otherwise the whole value is
/// preferred, with a blind strip as the last attempt.
fn decode_plaintext(plain: &[u8], host_key: &str) -> Option<String> {
    if plain.len() > HASH_PREFIX_LEN {
        let digest = Sha256::digest(host_key.as_bytes());
        if plain[..HASH_PREFIX_LEN] == digest[..] {
            return cookie_text(&plain[HASH_PREFIX_LEN..]);
        }
    }

    cookie_text(plain).or_else(|| {
        if plain.len() > HASH_PREFIX_LEN {
            cookie_text(&plain[HASH_PREFIX_LEN..])
        } else {
            None
        }
    })
}

/// A valid-padding decrypt under the wrong key can still produce bytes;
/// only non-empty UTF-8 without control characters is accepted.
fn cookie_text(bytes: &[u8]) -> Option<String> {
    let value = std::str::from_utf8(bytes).ok()?;
    if value.is_empty() || value.chars().any(|c| c.is_control()) {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
pub(crate) fn encrypt_v10_cbc(plain: &[u8], key: &[u8; 16]) -> Vec<u8> {
    use cbc::cipher::BlockEncryptMut;
    type Aes128CbcEnc = cbc::Encryptor<Aes128>;

    let ciphertext = Aes128CbcEnc::new_from_slices(key, &CBC_IV)
        .unwrap()
        .encrypt_padded_vec_mut::<Pkcs7>(plain);
    let mut payload = VERSION_PREFIX.to_vec();
    payload.extend_from_slice(&ciphertext);
    payload
}

#[cfg(test)]
pub(crate) fn encrypt_v10_gcm(plain: &[u8], key: &[u8; 16], nonce: &[u8; 12]) -> Vec<u8> {
    let cipher = Aes128Gcm::new_from_slice(key).unwrap();
    let ciphertext = cipher.encrypt(Nonce::from_slice(nonce), plain).unwrap();
    let mut payload = VERSION_PREFIX.to_vec();
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&ciphertext);
    payload
}

//! HKDF key schedule for message keys and sender wrap keys.
//!
//! Both envelope variants share one schedule. PSK mode appends the position
//! PSK to the ECDH output and switches to the `AlgoChatV1-PSK` info prefixes,
//! so a plain and a PSK derivation can never yield the same key.
//!
//! | key | salt | ikm | info |
//! |---|---|---|---|
//! | message | ephemeral pk | `ecdh(e, recipient) [‖ psk]` | prefix ‖ sender pk ‖ recipient pk |
//! | sender wrap | ephemeral pk | `ecdh(e, sender) [‖ psk]` | prefix ‖ sender pk |

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::psk_types::{PSK_ENCRYPTION_INFO_PREFIX, PSK_SENDER_KEY_INFO_PREFIX};
use crate::types::{
    AlgoChatError, Result, ENCRYPTION_INFO_PREFIX, KEY_SIZE, PUBLIC_KEY_SIZE,
    SENDER_KEY_INFO_PREFIX,
};

fn hkdf_key(
    shared_secret: &[u8; KEY_SIZE],
    psk: Option<&[u8; KEY_SIZE]>,
    salt: &[u8; PUBLIC_KEY_SIZE],
    info: &[u8],
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let mut ikm = Zeroizing::new(Vec::with_capacity(2 * KEY_SIZE));
    ikm.extend_from_slice(shared_secret);
    if let Some(psk) = psk {
        ikm.extend_from_slice(psk);
    }

    let hkdf = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    hkdf.expand(info, &mut key[..])
        .map_err(|e| AlgoChatError::KeyDerivationFailed(format!("HKDF expand failed: {}", e)))?;
    Ok(key)
}

/// Derives the symmetric key that seals the message body.
///
/// # Arguments
/// * `shared_secret` - `X25519(ephemeral, recipient)`
/// * `psk` - Position PSK in PSK mode, `None` for a standard envelope
/// * `ephemeral_public_key` - Used as the HKDF salt
/// * `sender_public_key` - Sender's static public key
/// * `recipient_public_key` - Recipient's static public key
pub fn derive_message_key(
    shared_secret: &[u8; KEY_SIZE],
    psk: Option<&[u8; KEY_SIZE]>,
    ephemeral_public_key: &[u8; PUBLIC_KEY_SIZE],
    sender_public_key: &[u8; PUBLIC_KEY_SIZE],
    recipient_public_key: &[u8; PUBLIC_KEY_SIZE],
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let prefix = if psk.is_some() {
        PSK_ENCRYPTION_INFO_PREFIX
    } else {
        ENCRYPTION_INFO_PREFIX
    };

    let mut info = Vec::with_capacity(prefix.len() + 2 * PUBLIC_KEY_SIZE);
    info.extend_from_slice(prefix);
    info.extend_from_slice(sender_public_key);
    info.extend_from_slice(recipient_public_key);

    hkdf_key(shared_secret, psk, ephemeral_public_key, &info)
}

/// Derives the key that wraps the message key for the sender.
///
/// The sender recomputes `shared_secret` as `X25519(sender, ephemeral)`,
/// which equals `X25519(ephemeral, sender)` used at encryption time.
pub fn derive_sender_key(
    shared_secret: &[u8; KEY_SIZE],
    psk: Option<&[u8; KEY_SIZE]>,
    ephemeral_public_key: &[u8; PUBLIC_KEY_SIZE],
    sender_public_key: &[u8; PUBLIC_KEY_SIZE],
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let prefix = if psk.is_some() {
        PSK_SENDER_KEY_INFO_PREFIX
    } else {
        SENDER_KEY_INFO_PREFIX
    };

    let mut info = Vec::with_capacity(prefix.len() + PUBLIC_KEY_SIZE);
    info.extend_from_slice(prefix);
    info.extend_from_slice(sender_public_key);

    hkdf_key(shared_secret, psk, ephemeral_public_key, &info)
}

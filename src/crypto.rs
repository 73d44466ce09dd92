//! Encryption and decryption for AlgoChat messages.
//!
//! One seal/open pipeline serves both envelope variants; PSK mode only
//! changes the key schedule inputs (see [`crate::key_schedule`]).
//!
//! Decryption takes one of two branches, chosen by comparing the caller's
//! public key with the envelope's sender key:
//! - **recipient**: `X25519(me, ephemeral)` derives the message key directly.
//! - **sender**: `X25519(me, ephemeral)` derives the wrap key, which opens
//!   `encrypted_sender_key` to recover the message key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::envelope::{ChatEnvelope, Envelope};
use crate::key_schedule::{derive_message_key, derive_sender_key};
use crate::keys::{generate_ephemeral_keypair, x25519_ecdh};
use crate::payload::parse_payload;
use crate::psk_ratchet::{derive_psk_at_counter, RatchetKey};
use crate::psk_state::RatchetCounters;
use crate::psk_types::{PskEnvelope, PSK_MAX_PAYLOAD_SIZE};
use crate::types::{
    AlgoChatError, DecryptedContent, Result, ENCRYPTED_SENDER_KEY_SIZE, KEY_SIZE,
    MAX_PAYLOAD_SIZE, NONCE_SIZE, PUBLIC_KEY_SIZE,
};

/// Encrypt a message for a recipient as a standard (protocol v1) envelope.
///
/// # Arguments
/// * `plaintext` - Message to encrypt, at most [`MAX_PAYLOAD_SIZE`] bytes
/// * `sender_private_key` - Sender's X25519 private key
/// * `sender_public_key` - Sender's X25519 public key
/// * `recipient_public_key` - Recipient's X25519 public key
pub fn encrypt_message(
    plaintext: &str,
    sender_private_key: &StaticSecret,
    sender_public_key: &PublicKey,
    recipient_public_key: &PublicKey,
) -> Result<ChatEnvelope> {
    check_payload_size(plaintext.len(), MAX_PAYLOAD_SIZE)?;
    check_sender_keys(sender_private_key, sender_public_key)?;

    let sealed = seal(
        plaintext.as_bytes(),
        sender_public_key,
        recipient_public_key,
        None,
    )?;

    Ok(ChatEnvelope {
        sender_public_key: *sender_public_key.as_bytes(),
        ephemeral_public_key: sealed.ephemeral_public_key,
        nonce: sealed.nonce,
        encrypted_sender_key: sealed.encrypted_sender_key,
        ciphertext: sealed.ciphertext,
    })
}

/// Encrypt a message with the PSK protocol (v1.1).
///
/// `ratchet` carries the position PSK and the counter written into the
/// header. The caller must never reuse a counter for two messages.
pub fn encrypt_psk_message(
    plaintext: &str,
    sender_private_key: &StaticSecret,
    sender_public_key: &PublicKey,
    recipient_public_key: &PublicKey,
    ratchet: &RatchetKey,
) -> Result<PskEnvelope> {
    check_payload_size(plaintext.len(), PSK_MAX_PAYLOAD_SIZE)?;
    check_sender_keys(sender_private_key, sender_public_key)?;

    let sealed = seal(
        plaintext.as_bytes(),
        sender_public_key,
        recipient_public_key,
        Some(ratchet.psk()),
    )?;

    Ok(PskEnvelope {
        ratchet_counter: ratchet.counter(),
        sender_public_key: *sender_public_key.as_bytes(),
        ephemeral_public_key: sealed.ephemeral_public_key,
        nonce: sealed.nonce,
        encrypted_sender_key: sealed.encrypted_sender_key,
        ciphertext: sealed.ciphertext,
    })
}

/// Encrypt into whichever variant `ratchet` selects: PSK when present,
/// standard otherwise.
pub fn encrypt(
    plaintext: &str,
    sender_private_key: &StaticSecret,
    sender_public_key: &PublicKey,
    recipient_public_key: &PublicKey,
    ratchet: Option<&RatchetKey>,
) -> Result<Envelope> {
    match ratchet {
        Some(ratchet) => encrypt_psk_message(
            plaintext,
            sender_private_key,
            sender_public_key,
            recipient_public_key,
            ratchet,
        )
        .map(Envelope::Psk),
        None => encrypt_message(
            plaintext,
            sender_private_key,
            sender_public_key,
            recipient_public_key,
        )
        .map(Envelope::Standard),
    }
}

/// Decrypt a standard envelope.
///
/// Works for both the recipient and the original sender.
///
/// # Returns
/// DecryptedContent if successful, None if it's a key-publish message
pub fn decrypt_message(
    envelope: &ChatEnvelope,
    my_private_key: &StaticSecret,
    my_public_key: &PublicKey,
) -> Result<Option<DecryptedContent>> {
    let plaintext = open(
        SealedRef {
            sender_public_key: &envelope.sender_public_key,
            ephemeral_public_key: &envelope.ephemeral_public_key,
            nonce: &envelope.nonce,
            encrypted_sender_key: &envelope.encrypted_sender_key,
            ciphertext: &envelope.ciphertext,
        },
        my_private_key,
        my_public_key,
        None,
    )?;
    parse_payload(&plaintext)
}

/// Decrypt a PSK envelope with the position PSK for its counter.
///
/// Use [`derive_psk_at_counter`] with `envelope.ratchet_counter` to obtain
/// `current_psk`, or [`receive_psk_message`] to also enforce the window.
pub fn decrypt_psk_message(
    envelope: &PskEnvelope,
    my_private_key: &StaticSecret,
    my_public_key: &PublicKey,
    current_psk: &[u8; KEY_SIZE],
) -> Result<Option<DecryptedContent>> {
    let plaintext = open(
        SealedRef {
            sender_public_key: &envelope.sender_public_key,
            ephemeral_public_key: &envelope.ephemeral_public_key,
            nonce: &envelope.nonce,
            encrypted_sender_key: &envelope.encrypted_sender_key,
            ciphertext: &envelope.ciphertext,
        },
        my_private_key,
        my_public_key,
        Some(current_psk),
    )?;
    parse_payload(&plaintext)
}

/// Decrypt either variant.
///
/// A PSK envelope without `current_psk` fails with
/// [`AlgoChatError::PskRequired`]; a PSK passed with a standard envelope is
/// ignored.
pub fn decrypt(
    envelope: &Envelope,
    my_private_key: &StaticSecret,
    my_public_key: &PublicKey,
    current_psk: Option<&[u8; KEY_SIZE]>,
) -> Result<Option<DecryptedContent>> {
    match envelope {
        Envelope::Standard(envelope) => decrypt_message(envelope, my_private_key, my_public_key),
        Envelope::Psk(envelope) => {
            let psk = current_psk.ok_or(AlgoChatError::PskRequired)?;
            decrypt_psk_message(envelope, my_private_key, my_public_key, psk)
        }
    }
}

/// Receive a PSK message from a peer, threading the caller's counters.
///
/// Checks the envelope counter against `counters`, derives the position PSK
/// from `initial_psk`, decrypts, and records the counter only once
/// decryption succeeded. Meant for inbound messages; a sender re-reading its
/// own messages should call [`decrypt_psk_message`].
pub fn receive_psk_message(
    envelope: &PskEnvelope,
    my_private_key: &StaticSecret,
    my_public_key: &PublicKey,
    initial_psk: &[u8; KEY_SIZE],
    counters: &mut RatchetCounters,
) -> Result<Option<DecryptedContent>> {
    counters.check_receive(envelope.ratchet_counter)?;

    let current_psk = Zeroizing::new(derive_psk_at_counter(
        initial_psk,
        envelope.ratchet_counter,
    )?);
    let content = decrypt_psk_message(envelope, my_private_key, my_public_key, &current_psk)?;

    counters.accept(envelope.ratchet_counter)?;
    Ok(content)
}

struct Sealed {
    ephemeral_public_key: [u8; PUBLIC_KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    encrypted_sender_key: [u8; ENCRYPTED_SENDER_KEY_SIZE],
    ciphertext: Vec<u8>,
}

struct SealedRef<'a> {
    sender_public_key: &'a [u8; PUBLIC_KEY_SIZE],
    ephemeral_public_key: &'a [u8; PUBLIC_KEY_SIZE],
    nonce: &'a [u8; NONCE_SIZE],
    encrypted_sender_key: &'a [u8; ENCRYPTED_SENDER_KEY_SIZE],
    ciphertext: &'a [u8],
}

fn check_payload_size(size: usize, max: usize) -> Result<()> {
    if size > max {
        return Err(AlgoChatError::MessageTooLarge { size, max });
    }
    Ok(())
}

fn check_sender_keys(private_key: &StaticSecret, public_key: &PublicKey) -> Result<()> {
    let derived = PublicKey::from(private_key);
    if bool::from(derived.as_bytes()[..].ct_eq(&public_key.as_bytes()[..])) {
        Ok(())
    } else {
        Err(AlgoChatError::KeyMismatch)
    }
}

fn seal(
    plaintext: &[u8],
    sender_public_key: &PublicKey,
    recipient_public_key: &PublicKey,
    psk: Option<&[u8; KEY_SIZE]>,
) -> Result<Sealed> {
    let (ephemeral_private, ephemeral_public) = generate_ephemeral_keypair();
    let ephemeral_pub_bytes = ephemeral_public.as_bytes();
    let sender_pub_bytes = sender_public_key.as_bytes();

    let shared_secret = x25519_ecdh(&ephemeral_private, recipient_public_key);
    let message_key = derive_message_key(
        &shared_secret,
        psk,
        ephemeral_pub_bytes,
        sender_pub_bytes,
        recipient_public_key.as_bytes(),
    )?;

    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = seal_with(&message_key, &nonce, plaintext)?;

    // Wrap the message key for the sender, under the same nonce but a
    // different key.
    let sender_shared_secret = x25519_ecdh(&ephemeral_private, sender_public_key);
    let sender_key = derive_sender_key(
        &sender_shared_secret,
        psk,
        ephemeral_pub_bytes,
        sender_pub_bytes,
    )?;
    let wrapped = seal_with(&sender_key, &nonce, message_key.as_slice())?;
    let encrypted_sender_key = <[u8; ENCRYPTED_SENDER_KEY_SIZE]>::try_from(wrapped.as_slice())
        .map_err(|_| {
            AlgoChatError::EncryptionFailed(format!(
                "sender key wrap is {} bytes, expected {}",
                wrapped.len(),
                ENCRYPTED_SENDER_KEY_SIZE
            ))
        })?;

    tracing::trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        psk = psk.is_some(),
        "sealed message"
    );

    Ok(Sealed {
        ephemeral_public_key: *ephemeral_pub_bytes,
        nonce,
        encrypted_sender_key,
        ciphertext,
    })
}

fn open(
    sealed: SealedRef<'_>,
    my_private_key: &StaticSecret,
    my_public_key: &PublicKey,
    psk: Option<&[u8; KEY_SIZE]>,
) -> Result<Vec<u8>> {
    let my_pub_bytes = my_public_key.as_bytes();
    let we_are_sender = bool::from(my_pub_bytes[..].ct_eq(&sealed.sender_public_key[..]));

    let ephemeral_public = PublicKey::from(*sealed.ephemeral_public_key);
    let shared_secret = x25519_ecdh(my_private_key, &ephemeral_public);

    let message_key = if we_are_sender {
        tracing::debug!(psk = psk.is_some(), "decrypting as sender");
        let sender_key = derive_sender_key(
            &shared_secret,
            psk,
            sealed.ephemeral_public_key,
            my_pub_bytes,
        )?;
        let recovered = Zeroizing::new(open_with(
            &sender_key,
            sealed.nonce,
            sealed.encrypted_sender_key,
        )?);
        let key = <[u8; KEY_SIZE]>::try_from(recovered.as_slice())
            .map_err(|_| AlgoChatError::AuthenticationFailed)?;
        Zeroizing::new(key)
    } else {
        tracing::debug!(psk = psk.is_some(), "decrypting as recipient");
        derive_message_key(
            &shared_secret,
            psk,
            sealed.ephemeral_public_key,
            sealed.sender_public_key,
            my_pub_bytes,
        )?
    };

    open_with(&message_key, sealed.nonce, sealed.ciphertext)
}

fn seal_with(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    ChaCha20Poly1305::new(Key::from_slice(key))
        .encrypt(Nonce::from_slice(nonce), data)
        .map_err(|e| AlgoChatError::EncryptionFailed(e.to_string()))
}

fn open_with(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    ChaCha20Poly1305::new(Key::from_slice(key))
        .decrypt(Nonce::from_slice(nonce), data)
        .map_err(|_| {
            tracing::debug!("AEAD tag mismatch");
            AlgoChatError::AuthenticationFailed
        })
}

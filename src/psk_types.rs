//! Type definitions and constants for the PSK (Pre-Shared Key) protocol v1.1.
//!
//! The PSK protocol extends AlgoChat with a shared secret ratchet: the
//! message key depends on both the ECDH agreement and the ratcheted PSK.

use crate::types::{ENCRYPTED_SENDER_KEY_SIZE, NONCE_SIZE, PUBLIC_KEY_SIZE};

/// PSK protocol version byte.
pub const PSK_VERSION: u8 = 0x01;

/// PSK protocol ID byte (0x02 distinguishes from standard 0x01).
pub const PSK_PROTOCOL_ID: u8 = 0x02;

/// Size of the big-endian ratchet counter field.
pub const PSK_COUNTER_SIZE: usize = 4;

/// Size of the PSK envelope header in bytes.
///
/// Layout: version(1) + protocolId(1) + ratchetCounter(4) + senderPublicKey(32)
///       + ephemeralPublicKey(32) + nonce(12) + encryptedSenderKey(48) = 130
pub const PSK_HEADER_SIZE: usize =
    2 + PSK_COUNTER_SIZE + 2 * PUBLIC_KEY_SIZE + NONCE_SIZE + ENCRYPTED_SENDER_KEY_SIZE;

/// Maximum plaintext size in bytes for PSK messages.
pub const PSK_MAX_PAYLOAD_SIZE: usize = 878;

/// Number of positions in a single session before rotating.
pub const PSK_SESSION_SIZE: u32 = 100;

/// Maximum forward slip a receiver tolerates when resynchronizing.
pub const PSK_COUNTER_WINDOW: u32 = 200;

/// Salt used for session-level PSK derivation.
pub const PSK_SESSION_SALT: &[u8] = b"AlgoChat-PSK-Session";

/// Salt used for position-level PSK derivation.
pub const PSK_POSITION_SALT: &[u8] = b"AlgoChat-PSK-Position";

/// Info prefix for the hybrid (ECDH + PSK) message key.
pub const PSK_ENCRYPTION_INFO_PREFIX: &[u8] = b"AlgoChatV1-PSK";

/// Info prefix for the hybrid sender wrap key.
pub const PSK_SENDER_KEY_INFO_PREFIX: &[u8] = b"AlgoChatV1-PSK-SenderKey";

/// PSK message envelope (protocol v1.1).
///
/// Version and protocol ID are implied by the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PskEnvelope {
    /// Ratchet counter value used to derive the PSK for this message.
    pub ratchet_counter: u32,
    /// Sender's X25519 public key.
    pub sender_public_key: [u8; PUBLIC_KEY_SIZE],
    /// Ephemeral X25519 public key.
    pub ephemeral_public_key: [u8; PUBLIC_KEY_SIZE],
    /// Nonce shared by the body and the sender key wrap.
    pub nonce: [u8; NONCE_SIZE],
    /// Message key sealed for the sender.
    pub encrypted_sender_key: [u8; ENCRYPTED_SENDER_KEY_SIZE],
    /// Ciphertext followed by the 16-byte tag.
    pub ciphertext: Vec<u8>,
}

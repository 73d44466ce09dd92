//! Protocol constants, error taxonomy and decrypted content.

use thiserror::Error;

/// Protocol version byte, shared by every envelope variant.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Protocol ID byte of the standard (ECDH only) envelope.
pub const PROTOCOL_ID: u8 = 0x01;

/// Size of the standard envelope header in bytes.
pub const HEADER_SIZE: usize = 126;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Size of the encrypted sender key (32-byte key + 16-byte tag).
pub const ENCRYPTED_SENDER_KEY_SIZE: usize = 48;

/// Maximum plaintext size of a standard envelope in bytes.
pub const MAX_PAYLOAD_SIZE: usize = 882;

/// Size of the ChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of an X25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of every symmetric key and PSK in bytes.
pub const KEY_SIZE: usize = 32;

/// Key derivation salt.
pub const KEY_DERIVATION_SALT: &[u8] = b"AlgoChat-v1-encryption";

/// Key derivation info.
pub const KEY_DERIVATION_INFO: &[u8] = b"x25519-key";

/// Info prefix for the standard message key.
pub const ENCRYPTION_INFO_PREFIX: &[u8] = b"AlgoChatV1";

/// Info prefix for the standard sender wrap key.
pub const SENDER_KEY_INFO_PREFIX: &[u8] = b"AlgoChatV1-SenderKey";

/// Decrypted message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedContent {
    /// The message text.
    pub text: String,
    /// Transaction ID this message replies to, if any.
    pub reply_to_id: Option<String>,
    /// Preview of the replied message, if any.
    pub reply_to_preview: Option<String>,
}

impl DecryptedContent {
    /// Create a new DecryptedContent with just text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_to_id: None,
            reply_to_preview: None,
        }
    }

    /// Whether this message replies to another one.
    pub fn is_reply(&self) -> bool {
        self.reply_to_id.is_some()
    }
}

/// Errors that can occur during AlgoChat operations.
///
/// Every variant is a deterministic validation or cryptographic failure;
/// retrying the same call yields the same error.
#[derive(Error, Debug)]
pub enum AlgoChatError {
    // Key errors
    /// Seed is not exactly 32 bytes.
    #[error("Invalid seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    /// HKDF refused to expand.
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Sender public key does not belong to the sender private key.
    #[error("Sender public key does not match the private key")]
    KeyMismatch,

    // Encryption errors
    /// Plaintext exceeds the payload ceiling of the envelope variant.
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// AEAD sealing failed.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // Decryption errors
    /// AEAD tag did not verify, either on the sender key or the message body.
    /// Which of the two failed is not reported.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Opened payload is not valid UTF-8.
    #[error("Invalid UTF-8 in decrypted payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A PSK envelope was presented without a PSK.
    #[error("PSK envelope requires a pre-shared key")]
    PskRequired,

    // Envelope errors
    /// Length or layout violation.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Unknown protocol version byte.
    #[error("Unsupported protocol version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// Unknown protocol ID byte.
    #[error("Unsupported protocol ID: {0:#04x}")]
    UnsupportedProtocol(u8),

    // Ratchet errors
    /// Received counter is outside the accepted resynchronization window.
    #[error("Counter {counter} outside window (last accepted {last_accepted}, window {window})")]
    CounterOutOfWindow {
        counter: u32,
        last_accepted: u32,
        window: u32,
    },

    /// Received counter equals the last accepted one.
    #[error("Counter {0} already accepted")]
    CounterReplayed(u32),

    /// The send counter reached `u32::MAX`.
    #[error("Ratchet send counter exhausted")]
    CounterExhausted,
}

pub type Result<T> = std::result::Result<T, AlgoChatError>;

//! Envelope encoding and decoding for AlgoChat protocol.
//!
//! [`Envelope`] is the closed set of wire variants, discriminated by the
//! protocol ID byte at offset 1:
//!
//! | protocol ID | variant | header |
//! |---|---|---|
//! | `0x01` | [`ChatEnvelope`] | 126 bytes |
//! | `0x02` | [`PskEnvelope`] | 130 bytes |

use crate::psk_envelope::{decode_psk_envelope, encode_psk_envelope};
use crate::psk_types::{PskEnvelope, PSK_HEADER_SIZE, PSK_PROTOCOL_ID};
use crate::types::{
    AlgoChatError, Result, ENCRYPTED_SENDER_KEY_SIZE, HEADER_SIZE, MAX_PAYLOAD_SIZE, NONCE_SIZE,
    PROTOCOL_ID, PROTOCOL_VERSION, PUBLIC_KEY_SIZE, TAG_SIZE,
};

/// AlgoChat message envelope (protocol v1).
///
/// Version and protocol ID are implied by the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEnvelope {
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

impl ChatEnvelope {
    /// Encode the envelope to bytes.
    ///
    /// Format (126-byte header + ciphertext):
    /// - [0]      version (0x01)
    /// - [1]      protocolId (0x01)
    /// - [2-33]   senderPublicKey (32 bytes)
    /// - [34-65]  ephemeralPublicKey (32 bytes)
    /// - [66-77]  nonce (12 bytes)
    /// - [78-125] encryptedSenderKey (48 bytes)
    /// - [126+]   ciphertext (variable)
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        data.push(PROTOCOL_VERSION);
        data.push(PROTOCOL_ID);
        data.extend_from_slice(&self.sender_public_key);
        data.extend_from_slice(&self.ephemeral_public_key);
        data.extend_from_slice(&self.nonce);
        data.extend_from_slice(&self.encrypted_sender_key);
        data.extend_from_slice(&self.ciphertext);
        data
    }

    /// Decode bytes into a standard envelope.
    pub fn decode(data: &[u8]) -> Result<Self> {
        check_header(data, PROTOCOL_ID, HEADER_SIZE)?;

        let mut offset = 2;
        let sender_public_key = read_array(data, &mut offset)?;
        let ephemeral_public_key = read_array(data, &mut offset)?;
        let nonce = read_array(data, &mut offset)?;
        let encrypted_sender_key = read_array(data, &mut offset)?;

        let ciphertext = &data[offset..];
        check_ciphertext_len(ciphertext.len(), MAX_PAYLOAD_SIZE)?;

        Ok(Self {
            sender_public_key,
            ephemeral_public_key,
            nonce,
            encrypted_sender_key,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Either wire variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Protocol v1, ECDH only.
    Standard(ChatEnvelope),
    /// Protocol v1.1, ECDH + ratcheted PSK.
    Psk(PskEnvelope),
}

impl Envelope {
    /// Decode bytes, dispatching on the protocol ID byte.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(too_short(data.len(), HEADER_SIZE));
        }
        if data[0] != PROTOCOL_VERSION {
            return Err(AlgoChatError::UnsupportedVersion(data[0]));
        }

        match data[1] {
            PROTOCOL_ID => ChatEnvelope::decode(data).map(Self::Standard),
            PSK_PROTOCOL_ID => decode_psk_envelope(data).map(Self::Psk),
            other => {
                tracing::debug!(protocol_id = other, "rejecting envelope");
                Err(AlgoChatError::UnsupportedProtocol(other))
            }
        }
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Standard(envelope) => envelope.encode(),
            Self::Psk(envelope) => encode_psk_envelope(envelope),
        }
    }

    /// Protocol ID byte of this variant.
    pub fn protocol_id(&self) -> u8 {
        match self {
            Self::Standard(_) => PROTOCOL_ID,
            Self::Psk(_) => PSK_PROTOCOL_ID,
        }
    }

    /// Sender's static public key.
    pub fn sender_public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        match self {
            Self::Standard(envelope) => &envelope.sender_public_key,
            Self::Psk(envelope) => &envelope.sender_public_key,
        }
    }

    /// Ephemeral public key of this message.
    pub fn ephemeral_public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        match self {
            Self::Standard(envelope) => &envelope.ephemeral_public_key,
            Self::Psk(envelope) => &envelope.ephemeral_public_key,
        }
    }

    /// AEAD nonce.
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        match self {
            Self::Standard(envelope) => &envelope.nonce,
            Self::Psk(envelope) => &envelope.nonce,
        }
    }

    /// Ratchet counter, for PSK envelopes only.
    pub fn ratchet_counter(&self) -> Option<u32> {
        match self {
            Self::Standard(_) => None,
            Self::Psk(envelope) => Some(envelope.ratchet_counter),
        }
    }
}

impl From<ChatEnvelope> for Envelope {
    fn from(envelope: ChatEnvelope) -> Self {
        Self::Standard(envelope)
    }
}

impl From<PskEnvelope> for Envelope {
    fn from(envelope: PskEnvelope) -> Self {
        Self::Psk(envelope)
    }
}

/// Check if data looks like an AlgoChat envelope of either variant.
///
/// Structural only: no field beyond the first two bytes is inspected.
pub fn is_chat_message(data: &[u8]) -> bool {
    if data.len() < 2 || data[0] != PROTOCOL_VERSION {
        return false;
    }
    match data[1] {
        PROTOCOL_ID => data.len() >= HEADER_SIZE,
        PSK_PROTOCOL_ID => data.len() >= PSK_HEADER_SIZE,
        _ => false,
    }
}

fn too_short(len: usize, minimum: usize) -> AlgoChatError {
    AlgoChatError::MalformedEnvelope(format!(
        "Data too short: {} bytes (minimum {})",
        len, minimum
    ))
}

/// Validates length, version and protocol ID for a single variant.
pub(crate) fn check_header(data: &[u8], protocol_id: u8, header_size: usize) -> Result<()> {
    if data.len() < header_size {
        return Err(too_short(data.len(), header_size));
    }
    if data[0] != PROTOCOL_VERSION {
        return Err(AlgoChatError::UnsupportedVersion(data[0]));
    }
    if data[1] != protocol_id {
        return Err(AlgoChatError::UnsupportedProtocol(data[1]));
    }
    Ok(())
}

pub(crate) fn check_ciphertext_len(len: usize, max_payload: usize) -> Result<()> {
    if len < TAG_SIZE {
        return Err(AlgoChatError::MalformedEnvelope(format!(
            "Ciphertext too short: {} bytes (tag alone is {})",
            len, TAG_SIZE
        )));
    }
    if len > max_payload + TAG_SIZE {
        return Err(AlgoChatError::MalformedEnvelope(format!(
            "Ciphertext too long: {} bytes (max {})",
            len,
            max_payload + TAG_SIZE
        )));
    }
    Ok(())
}

pub(crate) fn read_array<const N: usize>(data: &[u8], offset: &mut usize) -> Result<[u8; N]> {
    let end = *offset + N;
    let bytes = data
        .get(*offset..end)
        .and_then(|slice| <[u8; N]>::try_from(slice).ok())
        .ok_or_else(|| too_short(data.len(), end))?;
    *offset = end;
    Ok(bytes)
}

//! Envelope encoding and decoding for the PSK protocol.
//!
//! Wire format (130-byte header + variable ciphertext):
//! - \[0\]:      version (0x01)
//! - \[1\]:      protocolId (0x02)
//! - \[2..6\]:   ratchetCounter (4 bytes, big-endian u32)
//! - \[6..38\]:  senderPublicKey (32 bytes)
//! - \[38..70\]: ephemeralPublicKey (32 bytes)
//! - \[70..82\]: nonce (12 bytes)
//! - \[82..130\]: encryptedSenderKey (48 bytes)
//! - \[130..\]: ciphertext + 16-byte authentication tag

use crate::envelope::{check_ciphertext_len, check_header, read_array};
use crate::psk_types::{
    PskEnvelope, PSK_HEADER_SIZE, PSK_MAX_PAYLOAD_SIZE, PSK_PROTOCOL_ID, PSK_VERSION,
};
use crate::types::Result;

/// Encodes a PSK envelope to bytes.
pub fn encode_psk_envelope(envelope: &PskEnvelope) -> Vec<u8> {
    let mut data = Vec::with_capacity(PSK_HEADER_SIZE + envelope.ciphertext.len());
    data.push(PSK_VERSION);
    data.push(PSK_PROTOCOL_ID);
    data.extend_from_slice(&envelope.ratchet_counter.to_be_bytes());
    data.extend_from_slice(&envelope.sender_public_key);
    data.extend_from_slice(&envelope.ephemeral_public_key);
    data.extend_from_slice(&envelope.nonce);
    data.extend_from_slice(&envelope.encrypted_sender_key);
    data.extend_from_slice(&envelope.ciphertext);
    data
}

/// Decodes bytes into a PSK envelope.
pub fn decode_psk_envelope(data: &[u8]) -> Result<PskEnvelope> {
    check_header(data, PSK_PROTOCOL_ID, PSK_HEADER_SIZE)?;

    let mut offset = 2;
    let ratchet_counter = u32::from_be_bytes(read_array(data, &mut offset)?);
    let sender_public_key = read_array(data, &mut offset)?;
    let ephemeral_public_key = read_array(data, &mut offset)?;
    let nonce = read_array(data, &mut offset)?;
    let encrypted_sender_key = read_array(data, &mut offset)?;

    let ciphertext = &data[offset..];
    check_ciphertext_len(ciphertext.len(), PSK_MAX_PAYLOAD_SIZE)?;

    Ok(PskEnvelope {
        ratchet_counter,
        sender_public_key,
        ephemeral_public_key,
        nonce,
        encrypted_sender_key,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Checks if data looks like a PSK message (protocol 0x02 only).
pub fn is_psk_message(data: &[u8]) -> bool {
    if data.len() < PSK_HEADER_SIZE {
        return false;
    }
    data[0] == PSK_VERSION && data[1] == PSK_PROTOCOL_ID
}

impl PskEnvelope {
    /// Encode the envelope to bytes. See [`encode_psk_envelope`].
    pub fn encode(&self) -> Vec<u8> {
        encode_psk_envelope(self)
    }

    /// Decode bytes into a PSK envelope. See [`decode_psk_envelope`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        decode_psk_envelope(data)
    }
}

//! AlgoChat - Encrypted messaging on Algorand
//!
//! Rust implementation of the AlgoChat envelope protocol using X25519 +
//! ChaCha20-Poly1305, with the v1.1 pre-shared-key ratchet.
//!
//! Every operation is a pure, synchronous transform. The crate holds no
//! global state; ratchet counters are owned by the caller
//! ([`RatchetCounters`]).
//!
//! ```no_run
//! use algochat::{decrypt, derive_keys_from_seed, encrypt, is_chat_message, Envelope};
//!
//! # fn main() -> algochat::Result<()> {
//! let alice = derive_keys_from_seed(&[1u8; 32])?;
//! let bob = derive_keys_from_seed(&[2u8; 32])?;
//!
//! let envelope = encrypt("hi", &alice.private_key, &alice.public_key, &bob.public_key, None)?;
//! let bytes = envelope.encode();
//!
//! assert!(is_chat_message(&bytes));
//! let received = Envelope::decode(&bytes)?;
//! let content = decrypt(&received, &bob.private_key, &bob.public_key, None)?;
//! assert_eq!(content.map(|c| c.text).as_deref(), Some("hi"));
//! # Ok(())
//! # }
//! ```

mod types;
mod keys;
mod key_schedule;
mod psk_types;
mod psk_ratchet;
mod psk_state;
mod envelope;
mod psk_envelope;
mod payload;
mod crypto;

pub use types::*;
pub use keys::*;
pub use key_schedule::*;
pub use psk_types::*;
pub use psk_ratchet::*;
pub use psk_state::*;
pub use envelope::*;
pub use psk_envelope::*;
pub use crypto::*;

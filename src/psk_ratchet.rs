//! Two-level ratchet for PSK (Pre-Shared Key) derivation.
//!
//! The ratchet uses a session/position hierarchy:
//! - **Session PSK**: Derived from the initial PSK + session index
//! - **Position PSK**: Derived from the session PSK + position within session
//!
//! Every function here is a pure map from `(initial_psk, counter)` to key
//! material. Counter bookkeeping lives with the caller, see
//! [`RatchetCounters`](crate::RatchetCounters).

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::psk_types::{PSK_COUNTER_WINDOW, PSK_POSITION_SALT, PSK_SESSION_SALT, PSK_SESSION_SIZE};
use crate::types::{AlgoChatError, Result, KEY_SIZE};

fn expand_32(salt: &[u8], ikm: &[u8], info: &[u8], what: &str) -> Result<[u8; KEY_SIZE]> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(info, &mut okm)
        .map_err(|e| AlgoChatError::KeyDerivationFailed(format!("{}: {}", what, e)))?;
    Ok(okm)
}

/// Derives a session PSK from the initial PSK and session index.
///
/// # Arguments
/// * `initial_psk` - The initial pre-shared key
/// * `session_index` - The session index (counter / PSK_SESSION_SIZE)
pub fn derive_session_psk(initial_psk: &[u8; KEY_SIZE], session_index: u32) -> Result<[u8; KEY_SIZE]> {
    expand_32(
        PSK_SESSION_SALT,
        initial_psk,
        &session_index.to_be_bytes(),
        "session PSK",
    )
}

/// Derives a position PSK from a session PSK and position within the session.
///
/// # Arguments
/// * `session_psk` - The session PSK
/// * `position` - The position within the session (counter % PSK_SESSION_SIZE)
pub fn derive_position_psk(session_psk: &[u8; KEY_SIZE], position: u32) -> Result<[u8; KEY_SIZE]> {
    expand_32(
        PSK_POSITION_SALT,
        session_psk,
        &position.to_be_bytes(),
        "position PSK",
    )
}

/// Splits a counter into `(session_index, position)`.
///
/// Sessions change exactly at multiples of [`PSK_SESSION_SIZE`]: 99 is
/// `(0, 99)`, 100 is `(1, 0)`.
pub fn split_counter(counter: u32) -> (u32, u32) {
    (counter / PSK_SESSION_SIZE, counter % PSK_SESSION_SIZE)
}

/// Derives the PSK at a given ratchet counter value.
pub fn derive_psk_at_counter(initial_psk: &[u8; KEY_SIZE], counter: u32) -> Result<[u8; KEY_SIZE]> {
    let (session_index, position) = split_counter(counter);

    let mut session_psk = derive_session_psk(initial_psk, session_index)?;
    let position_psk = derive_position_psk(&session_psk, position);
    session_psk.zeroize();
    position_psk
}

/// Whether `candidate` lies in `[last_accepted, last_accepted + PSK_COUNTER_WINDOW]`.
///
/// The upper bound saturates at `u32::MAX`; nothing wraps.
pub fn in_window(candidate: u32, last_accepted: u32) -> bool {
    in_window_of(candidate, last_accepted, PSK_COUNTER_WINDOW)
}

pub(crate) fn in_window_of(candidate: u32, last_accepted: u32, window: u32) -> bool {
    candidate >= last_accepted && candidate - last_accepted <= window
}

/// The position PSK for one counter, as consumed by PSK-mode encryption.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RatchetKey {
    counter: u32,
    psk: [u8; KEY_SIZE],
}

impl RatchetKey {
    /// Derive the key at `counter` from the initial PSK.
    pub fn derive(initial_psk: &[u8; KEY_SIZE], counter: u32) -> Result<Self> {
        Ok(Self {
            counter,
            psk: derive_psk_at_counter(initial_psk, counter)?,
        })
    }

    /// Wrap an already derived position PSK.
    pub fn from_parts(counter: u32, psk: [u8; KEY_SIZE]) -> Self {
        Self { counter, psk }
    }

    /// Counter this key was derived at; written into the envelope header.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// The position PSK.
    pub fn psk(&self) -> &[u8; KEY_SIZE] {
        &self.psk
    }
}

impl fmt::Debug for RatchetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatchetKey")
            .field("counter", &self.counter)
            .field("psk", &"<redacted>")
            .finish()
    }
}

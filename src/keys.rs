//! Key derivation and management for AlgoChat.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::types::{AlgoChatError, Result, KEY_DERIVATION_INFO, KEY_DERIVATION_SALT, KEY_SIZE};

/// A static X25519 identity: the long-lived key pair derived from a seed.
///
/// The secret half is zeroized when the pair is dropped.
#[derive(Clone)]
pub struct IdentityKeyPair {
    /// X25519 private scalar.
    pub private_key: StaticSecret,
    /// X25519 public point.
    pub public_key: PublicKey,
}

impl IdentityKeyPair {
    /// Derive the identity for `seed`. See [`derive_keys_from_seed`].
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        derive_keys_from_seed(seed)
    }

    /// Raw public key bytes.
    pub fn public_bytes(&self) -> &[u8; 32] {
        self.public_key.as_bytes()
    }
}

impl fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", self.public_key.as_bytes())
            .finish()
    }
}

/// Derive an X25519 identity from a 32-byte seed using HKDF-SHA256.
///
/// The HKDF output is used directly as the scalar; x25519-dalek clamps it.
///
/// # Arguments
/// * `seed` - 32-byte seed (e.g., from Algorand account secret key)
pub fn derive_keys_from_seed(seed: &[u8]) -> Result<IdentityKeyPair> {
    if seed.len() != 32 {
        return Err(AlgoChatError::InvalidSeedLength(seed.len()));
    }

    let hkdf = Hkdf::<Sha256>::new(Some(KEY_DERIVATION_SALT), seed);
    let mut derived_key = Zeroizing::new([0u8; KEY_SIZE]);
    hkdf.expand(KEY_DERIVATION_INFO, &mut derived_key[..])
        .map_err(|e| AlgoChatError::KeyDerivationFailed(format!("identity key: {}", e)))?;

    let private_key = StaticSecret::from(*derived_key);
    let public_key = PublicKey::from(&private_key);

    Ok(IdentityKeyPair {
        private_key,
        public_key,
    })
}

/// Generate a random ephemeral X25519 key pair for message encryption.
///
/// Returned as a `StaticSecret`: each message runs two agreements with the
/// same ephemeral scalar.
pub fn generate_ephemeral_keypair() -> (StaticSecret, PublicKey) {
    let private_key = StaticSecret::random_from_rng(rand::thread_rng());
    let public_key = PublicKey::from(&private_key);
    (private_key, public_key)
}

/// Perform X25519 ECDH key exchange, returning the 32-byte shared secret.
pub fn x25519_ecdh(private_key: &StaticSecret, public_key: &PublicKey) -> Zeroizing<[u8; 32]> {
    Zeroizing::new(private_key.diffie_hellman(public_key).to_bytes())
}

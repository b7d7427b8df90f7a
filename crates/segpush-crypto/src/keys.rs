//! AS signing keys and their on-disk form.
//!
//! A key file holds the base64-encoded 32-byte Ed25519 seed, optionally
//! followed by a newline.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

pub const SEED_LEN: usize = 32;

/// Seed bytes in transit between a key file and a `SigningKey`.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; SEED_LEN]);

impl Seed {
    fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let mut raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidInput(format!("key file is not base64: {}", e)))?;
        let seed = <[u8; SEED_LEN]>::try_from(raw.as_slice()).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: SEED_LEN,
                actual: raw.len(),
            }
        });
        raw.zeroize();
        seed.map(Seed)
    }
}

/// Ed25519 key an AS signs its entries with.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Decode the contents of a key file.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let seed = Seed::decode(encoded)?;
        Ok(Self::from_seed(&seed.0))
    }

    /// Key file contents for this key.
    pub fn to_base64(&self) -> String {
        let seed = Seed(self.signing_key.to_bytes());
        BASE64.encode(&seed.0)
    }

    pub fn read_key_file(path: &Path) -> Result<Self, CryptoError> {
        let encoded = std::fs::read_to_string(path).map_err(|source| CryptoError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_base64(&encoded)
    }

    pub fn write_key_file(&self, path: &Path) -> Result<(), CryptoError> {
        std::fs::write(path, self.to_base64() + "\n").map_err(|source| CryptoError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Verification half of an AS key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Short hex form for logs.
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.as_bytes()[..8])
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

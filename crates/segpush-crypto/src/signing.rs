use ed25519_dalek::Signer;
use ed25519_dalek::Verifier;
use std::path::Path;

use segpush_core::{EntrySigner, SignAlgorithm, SignSource, SignedBlob, SignerError, IA};

use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey};
use crate::trust::TrustStore;

/// Name of the signing key file inside an AS's `keys` directory.
pub const SIGNING_KEY_FILE: &str = "as-signing.key";

/// Signs AS entries on behalf of one AS.
pub struct AsSigner {
    keypair: KeyPair,
    src: SignSource,
}

impl AsSigner {
    pub fn new(keypair: KeyPair, src: SignSource) -> Self {
        Self { keypair, src }
    }

    /// Build the signer of `ia` from its key directory and the trust store.
    ///
    /// The AS needs a readable key file, a loaded certificate chain and a
    /// TRC for its ISD. The signer claims the latest versions of both.
    pub fn load(ia: IA, key_dir: &Path, trust: &TrustStore) -> Result<Self, CryptoError> {
        let failed = |reason: String| CryptoError::SignerConstructionFailed { ia, reason };

        let (cert_ver, _) = trust
            .latest_chain(&ia)
            .ok_or_else(|| failed("no certificate chain loaded".into()))?;
        let (trc_ver, _) = trust
            .latest_trc(ia.isd)
            .ok_or_else(|| failed(format!("no TRC loaded for ISD {}", ia.isd)))?;

        let key_path = key_dir.join(SIGNING_KEY_FILE);
        let keypair = KeyPair::read_key_file(&key_path)
            .map_err(|e| failed(format!("{}: {}", key_path.display(), e)))?;

        tracing::debug!(
            %ia,
            cert_ver,
            trc_ver,
            key = %keypair.public_key().fingerprint(),
            "AS signer created"
        );
        Ok(Self::new(
            keypair,
            SignSource {
                ia,
                cert_ver,
                trc_ver,
            },
        ))
    }

    pub fn ia(&self) -> IA {
        self.src.ia
    }

    pub fn src(&self) -> SignSource {
        self.src
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }
}

impl EntrySigner for AsSigner {
    fn sign(&self, payload: &[u8]) -> Result<SignedBlob, SignerError> {
        let mut blob = SignedBlob {
            algorithm: SignAlgorithm::Ed25519,
            src: Some(self.src),
            timestamp: signature_timestamp(chrono::Utc::now().timestamp())?,
            signature: Vec::new(),
        };
        let input = blob.signature_input(payload);
        blob.signature = self.keypair.signing_key().sign(&input).to_bytes().to_vec();
        Ok(blob)
    }
}

/// Signature timestamp for a clock reading in Unix seconds.
fn signature_timestamp(secs: i64) -> Result<u64, SignerError> {
    u64::try_from(secs).map_err(|_| {
        SignerError::Failed(format!(
            "clock reads {} seconds before the epoch",
            secs.unsigned_abs()
        ))
    })
}

/// Check that `blob` is a valid Ed25519 signature over `payload`.
pub fn verify_entry(payload: &[u8], blob: &SignedBlob, pubkey: &PublicKey) -> Result<(), CryptoError> {
    if blob.algorithm != SignAlgorithm::Ed25519 {
        return Err(CryptoError::SignatureVerificationFailed);
    }
    let signature = ed25519_dalek::Signature::from_slice(&blob.signature).map_err(|_| {
        CryptoError::InvalidInput(format!(
            "signature must be 64 bytes, got {}",
            blob.signature.len()
        ))
    })?;
    pubkey
        .verifying_key()
        .verify(&blob.signature_input(payload), &signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn ia() -> IA {
        "1-ff00:0:110".parse().unwrap()
    }

    fn signer() -> AsSigner {
        AsSigner::new(
            KeyPair::from_seed(&[9u8; 32]),
            SignSource {
                ia: ia(),
                cert_ver: 1,
                trc_ver: 1,
            },
        )
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("segpush-signer-{}", uuid::Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn trust_for(ia: IA) -> TrustStore {
        let mut trust = TrustStore::new();
        trust.insert_chain(ia, 1, b"chain".to_vec());
        trust.insert_chain(ia, 4, b"chain".to_vec());
        trust.insert_trc(ia.isd, 2, b"trc".to_vec());
        trust
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let signer = signer();
        let blob = signer.sign(b"segment payload").unwrap();
        assert!(blob.is_signed());
        assert_eq!(blob.signature.len(), 64);
        assert_eq!(blob.src, Some(signer.src()));
        assert!(verify_entry(b"segment payload", &blob, &signer.public_key()).is_ok());
    }

    #[test]
    fn test_signature_timestamp_before_epoch() {
        assert_eq!(signature_timestamp(1_700_000_000).unwrap(), 1_700_000_000);
        assert!(matches!(
            signature_timestamp(-5),
            Err(SignerError::Failed(msg)) if msg.contains("5 seconds before")
        ));
    }

    #[test]
    fn test_verify_wrong_payload_fails() {
        let signer = signer();
        let blob = signer.sign(b"correct").unwrap();
        let result = verify_entry(b"wrong", &blob, &signer.public_key());
        assert!(matches!(result, Err(CryptoError::SignatureVerificationFailed)));
    }

    #[test]
    fn test_verify_tampered_source_fails() {
        let signer = signer();
        let mut blob = signer.sign(b"payload").unwrap();
        if let Some(src) = blob.src.as_mut() {
            src.cert_ver = 2;
        }
        assert!(verify_entry(b"payload", &blob, &signer.public_key()).is_err());
    }

    #[test]
    fn test_verify_unsigned_blob_fails() {
        let result = verify_entry(b"payload", &SignedBlob::unsigned(), &signer().public_key());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_signer() {
        let dir = temp_dir();
        let kp = KeyPair::from_seed(&[3u8; 32]);
        fs::write(dir.join(SIGNING_KEY_FILE), kp.to_base64()).unwrap();

        let signer = AsSigner::load(ia(), &dir, &trust_for(ia())).unwrap();
        assert_eq!(signer.ia(), ia());
        assert_eq!(signer.src().cert_ver, 4);
        assert_eq!(signer.src().trc_ver, 2);
        assert_eq!(signer.public_key(), kp.public_key());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_signer_missing_key() {
        let dir = temp_dir();
        let err = AsSigner::load(ia(), &dir, &trust_for(ia())).err().unwrap();
        assert!(matches!(err, CryptoError::SignerConstructionFailed { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_signer_without_chain() {
        let dir = temp_dir();
        fs::write(dir.join(SIGNING_KEY_FILE), KeyPair::generate().to_base64()).unwrap();
        let err = AsSigner::load(ia(), &dir, &TrustStore::new()).err().unwrap();
        assert!(matches!(err, CryptoError::SignerConstructionFailed { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_signer_corrupt_key() {
        let dir = temp_dir();
        fs::write(dir.join(SIGNING_KEY_FILE), "AAAA").unwrap();
        let err = AsSigner::load(ia(), &dir, &trust_for(ia())).err().unwrap();
        assert!(matches!(err, CryptoError::SignerConstructionFailed { .. }));
        fs::remove_dir_all(&dir).ok();
    }
}

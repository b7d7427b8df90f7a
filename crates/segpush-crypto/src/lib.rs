pub mod error;
pub mod keys;
pub mod signers;
pub mod signing;
pub mod tree;
pub mod trust;

pub use error::CryptoError;
pub use keys::{KeyPair, PublicKey};
pub use signers::SignerMap;
pub use signing::{verify_entry, AsSigner, SIGNING_KEY_FILE};
pub use tree::{AsDir, IsdDir, TrustTree};
pub use trust::TrustStore;

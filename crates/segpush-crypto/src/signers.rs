use std::collections::BTreeMap;

use segpush_core::{EntrySigner, SignerLookup, IA};

use crate::error::CryptoError;
use crate::signing::AsSigner;
use crate::tree::TrustTree;
use crate::trust::TrustStore;

/// Signers of every AS in the trust tree, keyed by ISD-AS.
///
/// Built once per run and only read afterwards.
#[derive(Default)]
pub struct SignerMap {
    signers: BTreeMap<IA, AsSigner>,
}

impl SignerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// One signer per AS directory of `tree`. Any AS without usable key
    /// material fails the whole map.
    pub fn build(tree: &TrustTree, trust: &TrustStore) -> Result<Self, CryptoError> {
        let mut map = Self::new();
        for as_dir in tree.ases() {
            map.insert(AsSigner::load(as_dir.ia, &as_dir.keys_dir(), trust)?);
        }
        tracing::info!(signers = map.len(), "signer map built");
        Ok(map)
    }

    pub fn insert(&mut self, signer: AsSigner) {
        self.signers.insert(signer.ia(), signer);
    }

    pub fn get(&self, ia: &IA) -> Option<&AsSigner> {
        self.signers.get(ia)
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl SignerLookup for SignerMap {
    fn resolve(&self, ia: &IA) -> Option<&dyn EntrySigner> {
        self.signers.get(ia).map(|s| s as &dyn EntrySigner)
    }
}

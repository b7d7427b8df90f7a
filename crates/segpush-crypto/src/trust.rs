//! In-memory trust store: certificate chains per AS and TRCs per ISD.
//!
//! Material is indexed by what its file name says and kept as opaque bytes.

use std::collections::BTreeMap;
use std::path::Path;

use segpush_core::{Asn, Isd, IA};

use crate::error::CryptoError;
use crate::tree::glob_in;

/// Parse `ISD<isd>-AS<as>-V<ver>.crt`.
fn parse_chain_name(path: &Path) -> Result<(IA, u64), CryptoError> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let malformed = || CryptoError::malformed_tree(path, "expected ISD<isd>-AS<as>-V<ver>.crt");

    let stem = name.strip_suffix(".crt").ok_or_else(malformed)?;
    let mut parts = stem.splitn(3, '-');
    let (isd, asn, ver) = match (parts.next(), parts.next(), parts.next()) {
        (Some(isd), Some(asn), Some(ver)) => (isd, asn, ver),
        _ => return Err(malformed()),
    };
    let isd = Isd::from_dir_name(isd).map_err(|_| malformed())?;
    let asn = Asn::from_file_fmt(asn, true).map_err(|_| malformed())?;
    Ok((IA::new(isd, asn), parse_version(ver).ok_or_else(malformed)?))
}

/// Parse `ISD<isd>-V<ver>.trc`.
fn parse_trc_name(path: &Path) -> Result<(Isd, u64), CryptoError> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let malformed = || CryptoError::malformed_tree(path, "expected ISD<isd>-V<ver>.trc");

    let stem = name.strip_suffix(".trc").ok_or_else(malformed)?;
    let (isd, ver) = stem.split_once('-').ok_or_else(malformed)?;
    let isd = Isd::from_dir_name(isd).map_err(|_| malformed())?;
    Ok((isd, parse_version(ver).ok_or_else(malformed)?))
}

fn parse_version(s: &str) -> Option<u64> {
    let digits = s.strip_prefix('V')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn read(path: &Path) -> Result<Vec<u8>, CryptoError> {
    std::fs::read(path).map_err(|source| CryptoError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loaded certificate chains and TRCs.
#[derive(Debug, Default)]
pub struct TrustStore {
    chains: BTreeMap<(IA, u64), Vec<u8>>,
    trcs: BTreeMap<(Isd, u64), Vec<u8>>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.crt` in `dir`. Returns how many were loaded.
    pub fn load_chains(&mut self, dir: &Path) -> Result<usize, CryptoError> {
        let files = glob_in(dir, "*.crt")?;
        for path in &files {
            let (ia, version) = parse_chain_name(path)?;
            self.insert_chain(ia, version, read(path)?);
            tracing::trace!(%ia, version, path = %path.display(), "certificate chain loaded");
        }
        Ok(files.len())
    }

    /// Load every `*.trc` in `dir`. Returns how many were loaded.
    pub fn load_trcs(&mut self, dir: &Path) -> Result<usize, CryptoError> {
        let files = glob_in(dir, "*.trc")?;
        for path in &files {
            let (isd, version) = parse_trc_name(path)?;
            self.insert_trc(isd, version, read(path)?);
            tracing::trace!(%isd, version, path = %path.display(), "TRC loaded");
        }
        Ok(files.len())
    }

    pub fn insert_chain(&mut self, ia: IA, version: u64, raw: Vec<u8>) {
        self.chains.insert((ia, version), raw);
    }

    pub fn insert_trc(&mut self, isd: Isd, version: u64, raw: Vec<u8>) {
        self.trcs.insert((isd, version), raw);
    }

    /// Highest-versioned chain of `ia`.
    pub fn latest_chain(&self, ia: &IA) -> Option<(u64, &[u8])> {
        self.chains
            .range((*ia, 0)..=(*ia, u64::MAX))
            .next_back()
            .map(|((_, version), raw)| (*version, raw.as_slice()))
    }

    /// Highest-versioned TRC of `isd`.
    pub fn latest_trc(&self, isd: Isd) -> Option<(u64, &[u8])> {
        self.trcs
            .range((isd, 0)..=(isd, u64::MAX))
            .next_back()
            .map(|((_, version), raw)| (*version, raw.as_slice()))
    }

    /// Every loaded chain in `(ia, version)` order.
    pub fn chains(&self) -> impl Iterator<Item = (IA, u64, &[u8])> {
        self.chains
            .iter()
            .map(|((ia, version), raw)| (*ia, *version, raw.as_slice()))
    }

    /// Every loaded TRC in `(isd, version)` order.
    pub fn trcs(&self) -> impl Iterator<Item = (Isd, u64, &[u8])> {
        self.trcs
            .iter()
            .map(|((isd, version), raw)| (*isd, *version, raw.as_slice()))
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn trc_count(&self) -> usize {
        self.trcs.len()
    }
}

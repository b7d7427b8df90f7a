//! Walking the `ISD*/AS*` trust-configuration tree.
//!
//! ```text
//! gen/ISD1/trcs/ISD1-V1.trc
//! gen/ISD1/ASff00_0_110/certs/ISD1-ASff00_0_110-V1.crt
//! gen/ISD1/ASff00_0_110/keys/as-signing.key
//! ```

use std::path::{Path, PathBuf};

use segpush_core::{Asn, Isd, IA};

use crate::error::CryptoError;
use crate::trust::TrustStore;

/// Paths in `dir` matching `pattern`, sorted. A missing `dir` matches nothing.
pub(crate) fn glob_in(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, CryptoError> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let mut paths = Vec::new();
    for entry in glob::glob(&full)? {
        let path = entry.map_err(|e| CryptoError::Io {
            path: e.path().display().to_string(),
            source: e.into_error(),
        })?;
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Result<&str, CryptoError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CryptoError::malformed_tree(path, "file name is not valid UTF-8"))
}

/// One AS directory of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsDir {
    pub ia: IA,
    pub path: PathBuf,
}

impl AsDir {
    pub fn certs_dir(&self) -> PathBuf {
        self.path.join("certs")
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.path.join("keys")
    }
}

/// One ISD directory and the AS directories below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsdDir {
    pub isd: Isd,
    pub path: PathBuf,
    pub ases: Vec<AsDir>,
}

impl IsdDir {
    pub fn trcs_dir(&self) -> PathBuf {
        self.path.join("trcs")
    }
}

/// The enumerated trust tree below a `gen` directory.
#[derive(Debug, Clone)]
pub struct TrustTree {
    pub root: PathBuf,
    pub isds: Vec<IsdDir>,
}

impl TrustTree {
    /// Enumerate `root/ISD*/AS*`. Every directory name must parse.
    pub fn discover(root: &Path) -> Result<Self, CryptoError> {
        let mut isds = Vec::new();
        for isd_path in glob_in(root, "ISD*")? {
            if !isd_path.is_dir() {
                continue;
            }
            let isd = Isd::from_dir_name(file_name(&isd_path)?)
                .map_err(|e| CryptoError::malformed_tree(&isd_path, e.to_string()))?;

            let mut ases = Vec::new();
            for as_path in glob_in(&isd_path, "AS*")? {
                if !as_path.is_dir() {
                    continue;
                }
                let asn = Asn::from_file_fmt(file_name(&as_path)?, true)
                    .map_err(|e| CryptoError::malformed_tree(&as_path, e.to_string()))?;
                ases.push(AsDir {
                    ia: IA::new(isd, asn),
                    path: as_path,
                });
            }
            isds.push(IsdDir {
                isd,
                path: isd_path,
                ases,
            });
        }

        let tree = Self {
            root: root.to_path_buf(),
            isds,
        };
        tracing::debug!(
            root = %root.display(),
            isds = tree.isds.len(),
            ases = tree.ases().count(),
            "trust tree discovered"
        );
        Ok(tree)
    }

    pub fn ases(&self) -> impl Iterator<Item = &AsDir> {
        self.isds.iter().flat_map(|isd| isd.ases.iter())
    }

    /// Load every chain and TRC of the tree into `store`.
    pub fn load_into(&self, store: &mut TrustStore) -> Result<(), CryptoError> {
        for as_dir in self.ases() {
            store.load_chains(&as_dir.certs_dir())?;
        }
        for isd_dir in &self.isds {
            store.load_trcs(&isd_dir.trcs_dir())?;
        }
        tracing::info!(
            chains = store.chain_count(),
            trcs = store.trc_count(),
            "trust material loaded"
        );
        Ok(())
    }
}

//! Fixtures shared by the cross-crate tests.

use std::fs;
use std::path::{Path, PathBuf};

use segpush_core::{Asn, Isd, TopologyDescription, IA};
use segpush_crypto::{KeyPair, PublicKey, SignerMap, TrustStore, TrustTree, SIGNING_KEY_FILE};

/// A fresh directory under the system temp dir.
pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("segpush-{}-{}", tag, uuid::Uuid::now_v7()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Lay out version-1 trust material and a fresh signing key for `ia` under
/// `gen`. Returns the AS's public key.
pub fn provision_as(gen: &Path, ia: IA) -> PublicKey {
    let isd = ia.isd;
    let isd_dir = gen.join(isd.dir_name());
    let as_dir = isd_dir.join(ia.asn.file_fmt(true));

    fs::create_dir_all(isd_dir.join("trcs")).expect("trcs dir");
    fs::create_dir_all(as_dir.join("certs")).expect("certs dir");
    fs::create_dir_all(as_dir.join("keys")).expect("keys dir");

    fs::write(
        isd_dir.join("trcs").join(format!("{}-V1.trc", isd.dir_name())),
        b"trc",
    )
    .expect("write trc");
    fs::write(
        as_dir
            .join("certs")
            .join(format!("{}-{}-V1.crt", isd.dir_name(), ia.asn.file_fmt(true))),
        b"chain",
    )
    .expect("write chain");

    let keypair = KeyPair::generate();
    keypair
        .write_key_file(&as_dir.join("keys").join(SIGNING_KEY_FILE))
        .expect("write key");
    keypair.public_key()
}

/// Discover `gen` and build the signer map the way a push run does.
pub fn load_signers(gen: &Path) -> SignerMap {
    let tree = TrustTree::discover(gen).expect("discover trust tree");
    let mut trust = TrustStore::new();
    tree.load_into(&mut trust).expect("load trust material");
    SignerMap::build(&tree, &trust).expect("build signers")
}

/// One segment `first -> second` over interface `link`.
pub fn two_hop_segment(first: &str, second: &str, link: u16) -> serde_json::Value {
    serde_json::json!({
        "srcISD": 1,
        "srcAS": first,
        "dstISD": 1,
        "dstAS": second,
        "nb_hops": 2,
        "ASentries": [
            {"IA": first, "hop": {"InIA": "0-0", "InIF": 0, "OutIA": second, "OutIF": link}},
            {"IA": second, "hop": {"InIA": first, "InIF": link, "OutIA": "0-0", "OutIF": 0}}
        ]
    })
}

pub fn topology(segments: Vec<serde_json::Value>) -> TopologyDescription {
    let json = serde_json::json!({ "segments": segments }).to_string();
    TopologyDescription::from_json(&json).expect("valid topology")
}

/// `1-ff00:0:<suffix>`.
pub fn ia(suffix: u64) -> IA {
    IA::new(Isd(1), Asn::new(0xff00_0000_0000 | suffix).expect("valid asn"))
}

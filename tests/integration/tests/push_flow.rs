//! Integration test: topology -> signed segments -> path store.
//!
//! Exercises segpush-core, segpush-crypto and segpush-store together the way
//! a push run wires them.

use segpush_core::{build_segments, CoreError, SegmentPolicy, SignAlgorithm, UnsignedEntries};
use segpush_crypto::verify_entry;
use segpush_integration_tests::{ia, load_signers, provision_as, temp_dir, topology, two_hop_segment};
use segpush_store::{
    CommitOrchestrator, HpCfgId, RegistrationBatch, RocksPathStore, RocksTrustStore, StoreError,
};

// =========================================================================
// Two ASes, one segment
// =========================================================================

#[test]
fn test_two_entry_segment_is_signed_and_committed() {
    let root = temp_dir("flow");
    let gen = root.join("gen");
    let key_110 = provision_as(&gen, ia(0x110));
    let key_111 = provision_as(&gen, ia(0x111));
    let signers = load_signers(&gen);

    let topo = topology(vec![two_hop_segment("1-ff00:0:110", "1-ff00:0:111", 5)]);
    let segments = build_segments(&topo, &signers, &SegmentPolicy::default()).unwrap();
    assert_eq!(segments.len(), 1);

    let meta = &segments[0];
    assert_eq!(meta.segment.len(), 2);
    assert_eq!(meta.segment.info.hops, 2);
    assert_eq!(meta.segment.info.isd, 1);

    // Each signature covers everything before it plus its own entry.
    for (index, key) in [key_110, key_111].iter().enumerate() {
        let signed = &meta.segment.entries()[index];
        assert_eq!(signed.sign.algorithm, SignAlgorithm::Ed25519);
        let payload = meta.segment.entry_payload(index).unwrap();
        verify_entry(&payload, &signed.sign, key).unwrap();
    }

    let store = RocksPathStore::open(&root.join("sd1-ff00_0_111.path.db")).unwrap();
    let summary = CommitOrchestrator::new(&store)
        .commit(RegistrationBatch::new(segments.clone()))
        .unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 0);

    let row = store.get(&meta.id()).unwrap().unwrap();
    assert_eq!(&row.meta, meta);
    assert!(row.hp_cfg_ids.contains(&HpCfgId::NULL));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_tampered_entry_fails_verification() {
    let root = temp_dir("tamper");
    let gen = root.join("gen");
    let key_110 = provision_as(&gen, ia(0x110));
    provision_as(&gen, ia(0x111));
    let signers = load_signers(&gen);

    let topo = topology(vec![two_hop_segment("1-ff00:0:110", "1-ff00:0:111", 5)]);
    let mut meta = build_segments(&topo, &signers, &SegmentPolicy::default())
        .unwrap()
        .remove(0);

    let first = meta.segment.entries()[0].clone();
    meta.segment.info.hops = 3;
    let payload = meta.segment.entry_payload(0).unwrap();
    assert!(verify_entry(&payload, &first.sign, &key_110).is_err());

    std::fs::remove_dir_all(&root).ok();
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn test_malformed_ia_aborts_before_store() {
    let root = temp_dir("malformed");
    let gen = root.join("gen");
    provision_as(&gen, ia(0x110));
    let signers = load_signers(&gen);

    let mut bad = two_hop_segment("1-ff00:0:110", "1-ff00:0:111", 5);
    bad["ASentries"][1]["IA"] = serde_json::json!("not-an-ia");
    let topo = topology(vec![two_hop_segment("1-ff00:0:110", "1-ff00:0:111", 6), bad]);

    let err = build_segments(&topo, &signers, &SegmentPolicy::default()).unwrap_err();
    assert!(matches!(err, CoreError::MalformedIdentifier { .. }));

    // Nothing was handed to a store, so none was created.
    assert!(!root.join("sd1-ff00_0_111.path.db").exists());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_missing_signer_rejected_under_strict_policy() {
    let root = temp_dir("strict");
    let gen = root.join("gen");
    provision_as(&gen, ia(0x110));
    let signers = load_signers(&gen);

    let topo = topology(vec![two_hop_segment("1-ff00:0:110", "1-ff00:0:111", 5)]);
    let strict = SegmentPolicy {
        unsigned_entries: UnsignedEntries::Reject,
        ..SegmentPolicy::default()
    };
    let err = build_segments(&topo, &signers, &strict).unwrap_err();
    match err {
        CoreError::SigningUnavailable { ia: missing, .. } => assert_eq!(missing, ia(0x111)),
        other => panic!("unexpected error: {other}"),
    }

    let lenient = build_segments(&topo, &signers, &SegmentPolicy::default()).unwrap();
    let entries = lenient[0].segment.entries();
    assert!(entries[0].sign.is_signed());
    assert!(!entries[1].sign.is_signed());

    std::fs::remove_dir_all(&root).ok();
}

// =========================================================================
// Batch commits
// =========================================================================

#[test]
fn test_rerun_updates_every_row() {
    let root = temp_dir("rerun");
    let gen = root.join("gen");
    for suffix in [0x110, 0x111, 0x112] {
        provision_as(&gen, ia(suffix));
    }
    let signers = load_signers(&gen);
    let topo = topology(vec![
        two_hop_segment("1-ff00:0:110", "1-ff00:0:111", 1),
        two_hop_segment("1-ff00:0:111", "1-ff00:0:112", 2),
        two_hop_segment("1-ff00:0:112", "1-ff00:0:110", 3),
    ]);

    let store = RocksPathStore::open(&root.join("path.db")).unwrap();
    let orchestrator = CommitOrchestrator::new(&store);

    let first = build_segments(&topo, &signers, &SegmentPolicy::default()).unwrap();
    let summary = orchestrator.commit(first.into()).unwrap();
    assert_eq!((summary.inserted, summary.updated), (3, 0));

    // Fresh signatures and timestamps, same segment ids.
    let second = build_segments(&topo, &signers, &SegmentPolicy::default()).unwrap();
    let summary = orchestrator.commit(second.into()).unwrap();
    assert_eq!((summary.inserted, summary.updated), (0, 3));
    assert_eq!(store.len().unwrap(), 3);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_commit_order_independent_of_input_order() {
    let root = temp_dir("order");
    let gen = root.join("gen");
    provision_as(&gen, ia(0x110));
    provision_as(&gen, ia(0x111));
    let signers = load_signers(&gen);

    let forward: Vec<_> = (1..=5)
        .map(|link| two_hop_segment("1-ff00:0:110", "1-ff00:0:111", link))
        .collect();
    let mut backward = forward.clone();
    backward.reverse();

    let policy = SegmentPolicy::default();
    let a = RegistrationBatch::new(build_segments(&topology(forward), &signers, &policy).unwrap());
    let b = RegistrationBatch::new(build_segments(&topology(backward), &signers, &policy).unwrap());
    assert_eq!(a.commit_order(), b.commit_order());

    let store = RocksPathStore::open(&root.join("path.db")).unwrap();
    let orchestrator = CommitOrchestrator::new(&store);
    let first = orchestrator.commit(a).unwrap();
    let second = orchestrator.commit(b).unwrap();
    assert_eq!(first.committed, second.committed);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_one_bad_segment_leaves_store_untouched() {
    let root = temp_dir("atomic");
    let gen = root.join("gen");
    provision_as(&gen, ia(0x110));
    provision_as(&gen, ia(0x111));
    let signers = load_signers(&gen);

    let mut segments = build_segments(
        &topology((1..=4).map(|l| two_hop_segment("1-ff00:0:110", "1-ff00:0:111", l)).collect()),
        &signers,
        &SegmentPolicy::default(),
    )
    .unwrap();

    // A descriptor without AS entries builds an empty segment, which the
    // store refuses.
    let empty = topology(vec![serde_json::json!({
        "srcISD": 1, "srcAS": "ff00:0:110", "dstISD": 1, "dstAS": "ff00:0:111",
        "nb_hops": 0, "ASentries": []
    })]);
    segments.extend(build_segments(&empty, &signers, &SegmentPolicy::default()).unwrap());

    let store = RocksPathStore::open(&root.join("path.db")).unwrap();
    let err = CommitOrchestrator::new(&store).commit(segments.into()).unwrap_err();
    assert!(matches!(err, StoreError::PartialBatchAborted { .. }));
    assert!(store.is_empty().unwrap());

    std::fs::remove_dir_all(&root).ok();
}

// =========================================================================
// Trust material
// =========================================================================

#[test]
fn test_loaded_trust_material_is_persisted() {
    let root = temp_dir("trustdb");
    let gen = root.join("gen");
    provision_as(&gen, ia(0x110));
    provision_as(&gen, ia(0x111));

    let tree = segpush_crypto::TrustTree::discover(&gen).unwrap();
    let mut trust = segpush_crypto::TrustStore::new();
    tree.load_into(&mut trust).unwrap();

    let trust_db = RocksTrustStore::open(&root.join("sd1-ff00_0_111.trust.db")).unwrap();
    let stats = trust_db.insert_all(trust.chains(), trust.trcs()).unwrap();
    assert_eq!((stats.chains, stats.trcs), (2, 1));

    assert_eq!(trust_db.chain(ia(0x110), 1).unwrap(), Some(b"chain".to_vec()));
    assert_eq!(trust_db.trc(ia(0x110).isd, 1).unwrap(), Some(b"trc".to_vec()));

    std::fs::remove_dir_all(&root).ok();
}

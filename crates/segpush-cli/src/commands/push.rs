//! `segpush push`: build, sign and commit every segment of a topology.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use segpush_core::{build_segments, TopologyDescription};
use segpush_crypto::{SignerMap, TrustStore, TrustTree};
use segpush_store::{CommitOrchestrator, RegistrationBatch, RocksPathStore, RocksTrustStore};

use crate::config::PushConfig;

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "segpush.toml")]
    pub config: PathBuf,

    /// Override the topology description file.
    #[arg(long)]
    pub segments: Option<PathBuf>,

    /// Override the SCION root directory.
    #[arg(long)]
    pub scion_root: Option<PathBuf>,

    /// Override the gen directory (trust tree).
    #[arg(long)]
    pub gen: Option<PathBuf>,

    /// Override the gen-cache directory (path store discovery).
    #[arg(long)]
    pub gen_cache: Option<PathBuf>,

    /// Use this path store instead of discovering one.
    #[arg(long)]
    pub path_db: Option<PathBuf>,

    /// Use this trust store instead of discovering one.
    #[arg(long)]
    pub trust_db: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Build and sign, but do not touch the path store.
    #[arg(long)]
    pub dry_run: bool,
}

/// The config file with command-line overrides applied.
pub fn load_config(args: &PushArgs) -> anyhow::Result<PushConfig> {
    let mut config = PushConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;

    if let Some(ref segments) = args.segments {
        config.paths.segments_file = segments.clone();
    }
    if let Some(ref root) = args.scion_root {
        config.paths.scion_root = root.clone();
    }
    if let Some(ref gen) = args.gen {
        config.paths.gen = Some(gen.clone());
    }
    if let Some(ref gen_cache) = args.gen_cache {
        config.paths.gen_cache = Some(gen_cache.clone());
    }
    if let Some(ref path_db) = args.path_db {
        config.paths.path_db = Some(path_db.clone());
    }
    if let Some(ref trust_db) = args.trust_db {
        config.paths.trust_db = Some(trust_db.clone());
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

pub fn run(config: &PushConfig, dry_run: bool) -> anyhow::Result<()> {
    let paths = config.resolve();
    tracing::info!(
        segments_file = %paths.segments_file.display(),
        gen = %paths.gen.display(),
        "starting segment push"
    );

    let topology = TopologyDescription::load(&paths.segments_file)?;

    let tree = TrustTree::discover(&paths.gen)?;
    let mut trust = TrustStore::new();
    tree.load_into(&mut trust)?;
    let signers = SignerMap::build(&tree, &trust)?;

    let segments = build_segments(&topology, &signers, &config.policy)?;
    let batch = RegistrationBatch::new(segments);

    if dry_run {
        for (position, segment) in batch.commit_order().iter().enumerate() {
            tracing::info!(position, segment = %segment, "would commit");
        }
        println!("Dry run: {} segments built, nothing committed.", batch.len());
        return Ok(());
    }

    let trust_path = paths.trust_store_path()?;
    let trust_db = RocksTrustStore::open(&trust_path)
        .with_context(|| format!("opening trust store {}", trust_path.display()))?;
    trust_db.insert_all(trust.chains(), trust.trcs())?;

    let store_path = paths.store_path()?;
    let store = RocksPathStore::open(&store_path)
        .with_context(|| format!("opening path store {}", store_path.display()))?;
    let summary = CommitOrchestrator::new(&store).commit(batch)?;

    println!(
        "Committed {} segments to {} ({} inserted, {} updated).",
        summary.committed.len(),
        store_path.display(),
        summary.inserted,
        summary.updated
    );
    Ok(())
}

//! Main execution logic for mr-migrate CLI.

use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use mr_mover::{
    BatchOrchestrator, MigrationConfig, RetryConfig, S3Config, S3ObjectStore, StatsSnapshot,
};
use mr_resolver::{resolve_key, resolve_record_json};
use mr_types::RecordPaths;
use serde::Serialize;
use tracing::info;

use crate::args::{MigrateArgs, ResolveArgs};

/// Execute a migration run with the provided arguments.
pub async fn execute_migrate(args: &MigrateArgs) -> Result<StatsSnapshot> {
    let mut s3_config = S3Config::new(&args.bucket)
        .with_region(&args.region)
        .with_timeout(args.request_timeout as u64);

    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    let store = S3ObjectStore::from_config(&s3_config)
        .await
        .context("failed to create S3 client")?;
    info!(bucket = %store.bucket(), "Connected to bucket");

    let retry = if args.max_retries == 0 {
        RetryConfig::disabled()
    } else {
        RetryConfig::new().with_max_retries(args.max_retries)
    };

    let config = MigrationConfig::new()
        .with_workers(args.workers)
        .with_channel_buffer(args.channel_buffer)
        .with_prefix(args.prefix.clone().unwrap_or_default())
        .with_ensure_root_folders(!args.no_root_folders)
        .with_ensure_parent_folders(args.ensure_parent_folders)
        .with_verify_copy(args.verify_copy)
        .with_dry_run(args.dry_run)
        .with_retry(retry);

    let orchestrator = BatchOrchestrator::new(config, Arc::new(store));
    let stats = orchestrator.run().await?;
    Ok(stats)
}

/// One resolved path, as printed by `resolve --record`.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct ResolvedPath<'a> {
    kind: &'static str,
    path: &'a str,
}

/// Execute `resolve`, writing one line per resolved path to `out`.
pub fn execute_resolve(args: &ResolveArgs, out: &mut impl Write) -> Result<()> {
    for key in &args.key {
        writeln!(out, "{}", resolve_key(key))?;
    }

    if let Some(path) = &args.record {
        let json = if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read record from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        };

        let paths = resolve_record_json(&json)
            .with_context(|| format!("malformed record {}", path.display()))?;
        write_record_paths(&paths, out)?;
    }

    Ok(())
}

/// Write record paths as JSON lines: metadata first, then attachments.
fn write_record_paths(paths: &RecordPaths, out: &mut impl Write) -> Result<()> {
    for (idx, path) in paths.iter().enumerate() {
        let line = ResolvedPath {
            kind: if idx == 0 { "metadata" } else { "attachment" },
            path: path.as_str(),
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }

    Ok(())
}

//! CLI argument definitions for mr-migrate.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mr_cli_common::{LogLevel, parse_positive_usize};
use mr_mover::DEFAULT_WORKERS;

/// Reorganize a flat bucket into the canonical raw-data / derived-data layout.
///
/// ## Examples
///
/// Preview the moves for one agency:
///   mr-migrate migrate -b mirrulations --prefix USTR/ --dry-run
///
/// Migrate everything against LocalStack:
///   mr-migrate migrate -b mirrulations --s3-endpoint http://localhost:4566
///
/// Show where a key or record would go:
///   mr-migrate resolve --key USTR/USTR-2015-0010/file.json
///   mr-migrate resolve --record comment.json
#[derive(Parser, Debug)]
#[command(name = "mr-migrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move every flat key in the bucket to its canonical path
    Migrate(MigrateArgs),

    /// Print canonical paths without touching any store
    Resolve(ResolveArgs),
}

/// Arguments for `migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    // === S3 Configuration ===
    /// S3 bucket name
    #[arg(short, long, env = "MR_S3_BUCKET")]
    pub bucket: String,

    /// Only migrate keys under this prefix
    #[arg(short, long, env = "MR_S3_PREFIX")]
    pub prefix: Option<String>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "MR_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30", value_parser = parse_positive_usize)]
    pub request_timeout: usize,

    // === Migration Options ===
    /// Number of concurrent workers (must be >= 1)
    #[arg(short, long, env = "MR_WORKERS", default_value_t = DEFAULT_WORKERS, value_parser = parse_positive_usize)]
    pub workers: usize,

    /// Depth of the shared queue between listing and workers
    #[arg(long, default_value = "100", value_parser = parse_positive_usize)]
    pub channel_buffer: usize,

    /// Resolve and log every move without copying or deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Do not create the raw-data/ and derived-data/ folder markers
    #[arg(long)]
    pub no_root_folders: bool,

    /// Create a folder marker for each destination's parent prefix
    #[arg(long)]
    pub ensure_parent_folders: bool,

    /// Check each copy exists before deleting its source
    #[arg(long)]
    pub verify_copy: bool,

    /// Retries for transient store errors (0 disables retry)
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `resolve`.
#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["key", "record"])))]
pub struct ResolveArgs {
    /// Flat object key to resolve (repeatable)
    #[arg(short, long)]
    pub key: Vec<String>,

    /// JSON record envelope to resolve (`-` reads stdin)
    #[arg(short, long)]
    pub record: Option<PathBuf>,
}

//! mr-migrate CLI
//!
//! Reorganizes a flat bucket into the canonical raw-data / derived-data layout.

use clap::Parser;
use mr_cli_common::{format_duration, format_number, init_logging};

mod args;
mod run;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level)?;

    match cli.command {
        Command::Resolve(args) => {
            let stdout = std::io::stdout();
            run::execute_resolve(&args, &mut stdout.lock())?;
        }
        Command::Migrate(args) => {
            let stats = run::execute_migrate(&args).await?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }

            eprintln!();
            eprintln!("Migration completed:");
            eprintln!("  Objects discovered: {}", format_number(stats.discovered));
            eprintln!("  Already migrated:   {}", format_number(stats.skipped));
            eprintln!("  Resolved:           {}", format_number(stats.resolved));
            if args.dry_run {
                eprintln!("  Planned moves:      {}", format_number(stats.planned));
            } else {
                eprintln!("  Moved:              {}", format_number(stats.moved));
                eprintln!("  Failed copy:        {}", format_number(stats.failed_copy));
                eprintln!("  Failed delete:      {}", format_number(stats.failed_delete));
            }
            eprintln!("  Errored:            {}", format_number(stats.errored));
            eprintln!("  Pages listed:       {}", format_number(stats.pages));

            if let Some(duration) = stats.duration() {
                eprintln!("  Duration:           {}", format_duration(duration));

                if let Some(ops) = stats.objects_per_second() {
                    eprintln!("  Throughput:         {:.1} objects/sec", ops);
                }
            }

            if stats.has_failures() {
                for error in &stats.errors {
                    eprintln!("  Error: {}", error);
                }
                std::process::exit(4); // Partial failure
            }
        }
    }

    Ok(())
}

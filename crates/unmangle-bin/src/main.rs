mod cli;
mod prompt;

use anyhow::Result;
use cli::Cli;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use unmangle_core::{RenameOptions, ReplacementTable, Resolver, UnmangleResult, WordExtractor};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting unmangle");

    let target_dir = match cli.target {
        Some(target) => target,
        None => std::env::current_dir()?,
    };

    info!("Target directory: {:?}", target_dir);
    info!("Placeholder: '{}'", cli.placeholder);

    if cli.dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    let extractor = WordExtractor::new(cli.placeholder)?;
    let mut table = ReplacementTable::builtin(cli.placeholder);
    for (pattern, replacement) in cli.replacements {
        info!("Predefined replacement: '{}' -> '{}'", pattern, replacement);
        table.insert(pattern, replacement);
    }

    let placeholder = cli.placeholder;
    let resolver = Resolver::new(extractor, table);
    let options = RenameOptions {
        dry_run: cli.dry_run,
    };

    let result = unmangle_core::process_directory(&target_dir, resolver, &options, |name, word| {
        prompt::ask_replacement(placeholder, name, word)
    })?;

    println!("{}", render_stats(&result, cli.dry_run));

    if !cli.no_summary {
        println!();
        println!("{}", unmangle_core::render_summary(&result.memo, placeholder)?);
    }

    info!("Unmangle completed successfully");
    Ok(())
}

fn render_stats(result: &UnmangleResult, dry_run: bool) -> String {
    let (heading, renamed) = if dry_run {
        ("Dry run complete!", "Paths that would be renamed")
    } else {
        ("Renaming complete!", "Paths renamed")
    };

    format!(
        "{}\n  Entries scanned: {}\n  {}: {}",
        heading, result.entries_scanned, renamed, result.paths_renamed
    )
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}

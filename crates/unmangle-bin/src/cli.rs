use clap::Parser;
use std::path::PathBuf;
use unmangle_core::DEFAULT_PLACEHOLDER;

#[derive(Parser)]
#[command(name = "unmangle")]
#[command(version)]
#[command(about = "Rename files and directories by replacing '?' characters")]
#[command(long_about = "Walks the target directory (the current directory if not given) and renames \
files and folders whose names contain a placeholder left behind by a lost encoding. Known patterns \
are replaced from the built-in table; every other word containing the placeholder is asked about \
once and the answer is reused for the rest of the run. The answers are printed at the end so they \
can be added to the built-in table.")]
#[command(after_help = "Examples:
  unmangle                                # Process current directory
  unmangle /path/to/directory             # Process specific directory
  unmangle --dry-run                      # Show what would be renamed without making changes
  unmangle /path/to/directory --dry-run   # Dry run on specific directory")]
pub struct Cli {
    #[arg(help = "Target directory (defaults to current directory)")]
    pub target: Option<PathBuf>,

    #[arg(long, help = "Show what would be renamed without making any changes")]
    pub dry_run: bool,

    #[arg(
        short,
        long = "replace",
        value_name = "PATTERN=REPLACEMENT",
        value_parser = parse_replacement,
        help = "Additional predefined replacement, applied after the built-in ones"
    )]
    pub replacements: Vec<(String, String)>,

    #[arg(long, default_value_t = DEFAULT_PLACEHOLDER, help = "Character marking a lost character")]
    pub placeholder: char,

    #[arg(long, help = "Do not print the learned replacements at the end")]
    pub no_summary: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_replacement(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((pattern, _)) if pattern.is_empty() => {
            Err("pattern must not be empty".to_string())
        }
        Some((pattern, replacement)) => Ok((pattern.to_string(), replacement.to_string())),
        None => Err(format!("expected PATTERN=REPLACEMENT, got '{value}'")),
    }
}

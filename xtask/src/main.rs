use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgMatches, Command};

const BIN: &str = "unmangle";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install unmangle binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run unmangle with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to unmangle")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run unit tests and the scratch tree checks"))
                .subcommand(Command::new("core").about("Run tests for unmangle-core"))
                .subcommand(Command::new("bin").about("Run tests for unmangle-bin"))
                .subcommand(Command::new("scratch").about("Run the binary against a scratch tree"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", _)) => cargo(&["install", "--path", "crates/unmangle-bin"]),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    let run_args: Vec<&str> = args
        .get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.map(String::as_str).collect());

    let mut command = vec!["run", "--bin", BIN, "--"];
    command.extend(run_args);
    cargo(&command)
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _)) => {
            cargo(&["test", "--package", "unmangle-core"])?;
            cargo(&["test", "--package", "unmangle-bin"])?;
            scratch_checks()
        }
        Some(("core", _)) => cargo(&["test", "--package", "unmangle-core"]),
        Some(("bin", _)) => cargo(&["test", "--package", "unmangle-bin"]),
        Some(("scratch", _)) => scratch_checks(),
        _ => anyhow::bail!("Expected one of: all, core, bin, scratch"),
    }
}

/// Builds a small tree whose names only need the built-in table, so the
/// binary runs without prompting.
fn scratch_checks() -> Result<()> {
    cargo(&["build", "--bin", BIN])?;

    let scratch = std::env::temp_dir().join("unmangle-xtask-scratch");
    let result = run_scratch(&scratch);
    if scratch.exists() {
        fs::remove_dir_all(&scratch)?;
    }
    result?;

    println!("Scratch tree checks passed");
    Ok(())
}

fn run_scratch(scratch: &Path) -> Result<()> {
    if scratch.exists() {
        fs::remove_dir_all(scratch)?;
    }
    let mangled_dir = scratch.join("Ungek?rzt");
    fs::create_dir_all(&mangled_dir)?;
    fs::write(mangled_dir.join("Ungek?rzt_Hoerbuch.mp3"), b"")?;

    run_binary(scratch, &["--dry-run", "--no-summary"])?;
    expect_exists(&mangled_dir.join("Ungek?rzt_Hoerbuch.mp3"), "dry run renamed an entry")?;

    run_binary(scratch, &["--no-summary"])?;
    expect_exists(
        &scratch.join("Ungekürzt").join("Ungekürzt_Hoerbuch.mp3"),
        "live run did not rename the tree",
    )?;

    // Nothing is left to rename, so a second live run must succeed unchanged.
    run_binary(scratch, &["--no-summary"])?;
    expect_exists(
        &scratch.join("Ungekürzt").join("Ungekürzt_Hoerbuch.mp3"),
        "second run changed the tree",
    )
}

fn run_binary(target: &Path, flags: &[&str]) -> Result<()> {
    let status = process::Command::new(binary_path())
        .arg(target)
        .args(flags)
        .stdin(process::Stdio::null())
        .status()
        .with_context(|| format!("Failed to start {BIN}"))?;

    if !status.success() {
        anyhow::bail!("{BIN} {} failed", flags.join(" "));
    }
    Ok(())
}

fn binary_path() -> PathBuf {
    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target"));
    target_dir.join("debug").join(format!("{BIN}{}", std::env::consts::EXE_SUFFIX))
}

fn expect_exists(path: &Path, message: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{message}: {path:?} is missing");
    }
    Ok(())
}

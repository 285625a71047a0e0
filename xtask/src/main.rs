//! Corral xtask - Build automation tasks
//!
//! ## Usage
//!
//! ```bash
//! # Build the corral binary
//! cargo xtask build
//!
//! # Run all tests
//! cargo xtask test
//!
//! # Run lints
//! cargo xtask lint
//!
//! # Convert the demo project with the freshly built binary
//! cargo xtask smoke
//!
//! # Run everything CI runs
//! cargo xtask ci
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for Corral")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the corral binary
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run all tests
    Test {
        /// Run tests in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run lints (clippy and rustfmt check)
    Lint,
    /// Format code
    Fmt {
        /// Check formatting without making changes
        #[arg(long)]
        check: bool,
    },
    /// Convert and inspect the demo project
    Smoke,
    /// Clean build artifacts
    Clean,
    /// Install the binary locally
    Install,
    /// Generate documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// Run CI checks (fmt, lint, test, smoke)
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let project_root = project_root()?;
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build { release } => build(&sh, release)?,
        Commands::Test { release } => test(&sh, release)?,
        Commands::Lint => lint(&sh)?,
        Commands::Fmt { check } => fmt(&sh, check)?,
        Commands::Smoke => smoke(&sh)?,
        Commands::Clean => cmd!(sh, "cargo clean").run()?,
        Commands::Install => cmd!(sh, "cargo install --path .").run()?,
        Commands::Doc { open } => doc(&sh, open)?,
        Commands::Ci => ci(&sh)?,
    }

    Ok(())
}

fn project_root() -> Result<PathBuf> {
    let output = std::process::Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run cargo locate-project")?;

    let path = String::from_utf8(output.stdout)?;
    let manifest = PathBuf::from(path.trim());

    manifest
        .parent()
        .map(|p| p.to_path_buf())
        .context("Failed to find project root")
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("Building corral...");

    if release {
        cmd!(sh, "cargo build --release --bin corral").run()?;
    } else {
        cmd!(sh, "cargo build --bin corral").run()?;
    }

    Ok(())
}

fn test(sh: &Shell, release: bool) -> Result<()> {
    println!("Running tests...");

    if release {
        cmd!(sh, "cargo test --workspace --release").run()?;
    } else {
        cmd!(sh, "cargo test --workspace").run()?;
    }

    Ok(())
}

fn lint(sh: &Shell) -> Result<()> {
    println!("Running lints...");

    cmd!(sh, "cargo fmt --all -- --check").run()?;
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;

    Ok(())
}

fn fmt(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
    }

    Ok(())
}

/// Convert the demo project and read one container back from the result
fn smoke(sh: &Shell) -> Result<()> {
    println!("Converting demos/compose.yaml...");

    let group = cmd!(
        sh,
        "cargo run --quiet --bin corral -- convert -f demos/compose.yaml --location westeurope"
    )
    .read()?;
    let temp = sh.create_temp_dir()?;
    let group_file = temp.path().join("group.json");
    sh.write_file(&group_file, &group)?;

    let view = cmd!(sh, "cargo run --quiet --bin corral -- inspect {group_file} web").read()?;
    println!("{}", view);

    Ok(())
}

fn doc(sh: &Shell, open: bool) -> Result<()> {
    if open {
        cmd!(sh, "cargo doc --no-deps --open").run()?;
    } else {
        cmd!(sh, "cargo doc --no-deps").run()?;
    }

    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("\nStep 1/4: Format check");
    fmt(sh, true)?;

    println!("\nStep 2/4: Lint");
    lint(sh)?;

    println!("\nStep 3/4: Tests");
    test(sh, false)?;

    println!("\nStep 4/4: Smoke");
    smoke(sh)?;

    println!("\nAll CI checks passed!");
    Ok(())
}

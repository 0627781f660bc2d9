#![forbid(unsafe_code)]
//! Writes shell completions and the man page for the `autoindex` binary.

use anyhow::Context;
use autoindex::cli::Args;
use clap::{CommandFactory, Parser};
use clap_complete::{generate_to, Shell};
use clap_mangen::Man;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "generate-assets", about = "Generate completions and man page for autoindex")]
struct GenArgs {
    /// Output directory
    #[arg(long = "out-dir", default_value = "dist")]
    out_dir: PathBuf,

    /// Shells to generate completions for (default: all supported)
    #[arg(long = "shell", value_enum, action = clap::ArgAction::Append)]
    shells: Vec<Shell>,
}

fn write_completions(dir: &Path, shells: &[Shell]) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("{}: cannot create", dir.display()))?;
    for &shell in shells {
        let mut cmd = Args::command();
        let path = generate_to(shell, &mut cmd, "autoindex", dir)?;
        eprintln!("  {}", path.display());
    }
    Ok(())
}

fn write_man_page(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("{}: cannot create", dir.display()))?;
    let mut buffer = Vec::new();
    Man::new(Args::command()).render(&mut buffer)?;
    let path = dir.join("autoindex.1");
    fs::write(&path, buffer).with_context(|| format!("{}: cannot write", path.display()))?;
    eprintln!("  {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = GenArgs::parse();
    let shells = if args.shells.is_empty() {
        vec![Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell]
    } else {
        args.shells
    };

    eprintln!("generate-assets: writing under {}", args.out_dir.display());
    write_completions(&args.out_dir.join("completions"), &shells)?;
    write_man_page(&args.out_dir.join("man"))?;
    Ok(())
}

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  autoindex /srv/www                        List the root as HTML
  autoindex /srv/www docs --format text     List docs/ as plain text
  autoindex /srv/www docs --sort-by size --order desc
  autoindex /srv/www notes.txt > copy.txt   Stream a file to stdout";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Html,
    Text,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "autoindex",
    version,
    about = "Browsable directory listings with rule-based icons",
    after_help = EXAMPLES
)]
pub struct Args {
    /// Browse root (default: current directory)
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Path below the root to list or stream (default: the root itself)
    pub path: Option<String>,

    /// Sort key: name, size or modified
    #[arg(short = 's', long = "sort-by", default_value = "name")]
    pub sort_by: String,

    /// Sort order: asc or desc
    #[arg(short = 'o', long = "order", default_value = "asc")]
    pub order: String,

    /// Show hidden files (dotfiles)
    #[arg(short = 'a', long = "all")]
    pub show_hidden: bool,

    /// Glob patterns to exclude (repeatable)
    #[arg(short = 'I', long = "ignore", action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Output format for directory listings
    #[arg(short = 'f', long = "format", value_enum, default_value = "html")]
    pub format: Format,

    /// Do not install the bundled icon rules
    #[arg(long = "no-default-icons")]
    pub no_default_icons: bool,

    /// Template name recorded in the listing context
    #[arg(long = "template")]
    pub template: Option<String>,

    /// URL prefix icons are served under
    #[arg(long = "icon-prefix", default_value = "/__autoindex__/icons/")]
    pub icon_prefix: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log filter derived from -v/-q; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

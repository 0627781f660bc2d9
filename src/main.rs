#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use autoindex::cli::{Args, Format};
use autoindex::index::ListingQuery;
use autoindex::render::{self, RenderConfig};
use autoindex::{AutoIndex, Response};
use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run_app() {
        eprintln!("autoindex: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_app() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("{}: failed to resolve path", args.root.display()))?;

    anyhow::ensure!(root.is_dir(), "{}: Not a directory", root.display());

    let mut builder = AutoIndex::builder(&root)
        .show_hidden(args.show_hidden)
        .default_icons(!args.no_default_icons)
        .ignore(&args.ignore)
        .context("invalid --ignore pattern")?;
    if let Some(template) = &args.template {
        builder = builder.template(template.clone());
    }
    let index = builder.build()?;

    let request_path = args.path.as_deref().unwrap_or("");
    let query = ListingQuery::new(Some(args.sort_by.as_str()), Some(args.order.as_str()));
    tracing::info!(root = %root.display(), path = request_path, "rendering");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match index.render(request_path, &query)? {
        Response::Listing(ctx) => {
            let page = match args.format {
                Format::Html => {
                    let config = RenderConfig {
                        icon_prefix: args.icon_prefix.clone(),
                    };
                    render::listing_html(&ctx, index.icon_rules(), &config)
                }
                Format::Text => render::listing_text(&ctx, index.icon_rules()),
            };
            out.write_all(page.as_bytes())
                .context("failed to write listing")?;
        }
        Response::File(file) => {
            let written = file.stream_to(&mut out)?;
            tracing::info!(bytes = written, mimetype = %file.mimetype, "streamed file");
        }
    }
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

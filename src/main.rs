use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use linktools::preview::previewers::youtube::start_seconds;
use linktools::preview::HelperInfo;
use linktools::{Config, HelperRegistry, Resolution};

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Timecode { code } => {
            println!("{}", start_seconds(&code));
        }

        cli::Command::Preview {
            url,
            content_file,
            content_type,
        } => {
            let registry = load_registry(args.base_path.as_deref())?;
            let content = content_file
                .map(|path| std::fs::read(&path).with_context(|| format!("failed to read {path}")))
                .transpose()?;

            if let Resolution::NeedsContent(helper) = registry.resolve(&url) {
                if content.is_none() {
                    tracing::warn!(
                        helper = helper.key(),
                        "this link needs its page content, pass --content-file"
                    );
                }
            }

            match registry.preview(&url, content.as_deref(), content_type.as_deref())? {
                Some(html) => println!("{html}"),
                None => eprintln!("no helper supports {url}"),
            }
        }

        cli::Command::Resolve { url } => {
            let registry = load_registry(args.base_path.as_deref())?;
            let report = registry.resolve(&url).report();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        cli::Command::Helpers {} => {
            let registry = load_registry(args.base_path.as_deref())?;
            let helpers: Vec<HelperInfo> = registry.helpers().iter().map(|h| h.info()).collect();
            println!("{}", serde_json::to_string_pretty(&helpers)?);
        }
    }

    Ok(())
}

fn load_registry(base_path: Option<&str>) -> anyhow::Result<HelperRegistry> {
    let config = match base_path {
        Some(base_path) => Config::load_with(base_path),
        None => Config::load(),
    }
    .context("failed to load config")?;
    tracing::debug!(base_path = config.base_path(), "config loaded");

    HelperRegistry::from_config(&config).context("failed to register helpers")
}

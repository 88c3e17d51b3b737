mod commands;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use storekit::{LinkPolicy, LinkResolver, Source, SourcePriority};
use storekit_stores::{GooglePlayAdapter, HttpSizeProbe};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "storekit")]
#[command(about = "Find APK download links across Android app stores")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Language for stores that localize their pages
    #[arg(long, global = true)]
    language: Option<String>,
    /// Country for stores that localize their pages
    #[arg(long, global = true)]
    country: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a download link, trying stores in priority order
    Resolve {
        /// Package identifier, e.g. org.fdroid.fdroid
        package: String,
        /// Preferred source; repeat to give an order. Unlisted sources follow.
        #[arg(long = "source", value_name = "SOURCE")]
        sources: Vec<Source>,
        /// Treat a store answer without a download link as a failure
        #[arg(long)]
        strict: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Look a package up in a single store
    Info {
        source: Source,
        package: String,
        #[arg(long)]
        json: bool,
    },
    /// Print Google Play details as JSON
    Details { package: String },
    /// Show the effective source order
    Priority {
        /// Preferred source; repeat to give an order
        #[arg(long = "set", value_name = "SOURCE")]
        set: Vec<Source>,
    },
    /// Probe the size of a remote file without downloading it
    Size { url: String },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Order from the command line when given, else from the config file.
fn build_priority(config: &AppConfig, requested: &[Source]) -> Result<SourcePriority> {
    let requested = if requested.is_empty() {
        config
            .priority_sources()
            .context("invalid priority in config file")?
    } else {
        requested.to_vec()
    };

    if requested.is_empty() {
        return Ok(SourcePriority::new());
    }
    SourcePriority::with_order(&requested).context("invalid source priority")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app_config = config::load_config();
    let mut locale = app_config.locale();
    if let Some(language) = cli.language {
        locale.language = language;
    }
    if let Some(country) = cli.country {
        locale.country = country;
    }
    let client = storekit_stores::build_client(&app_config.http.to_http_config())
        .context("failed to build HTTP client")?;

    match cli.command {
        Command::Resolve {
            package,
            sources,
            strict,
            json,
        } => {
            let policy = if strict || app_config.require_download_link {
                LinkPolicy::RequireDownloadLink
            } else {
                LinkPolicy::Lenient
            };
            let resolver = LinkResolver::new(
                storekit_stores::default_adapters(&client),
                build_priority(&app_config, &sources)?,
                Arc::new(HttpSizeProbe::new(client.clone())),
            )
            .with_policy(policy)
            .with_locale(locale);

            commands::resolve::run(&resolver, &package, json).await
        }
        Command::Info {
            source,
            package,
            json,
        } => {
            let adapter = storekit_stores::adapter_for(source, client);
            commands::info::run(adapter.as_ref(), &package, &locale, json).await
        }
        Command::Details { package } => {
            let adapter = GooglePlayAdapter::new(client);
            commands::details::run(&adapter, &package, &locale).await
        }
        Command::Priority { set } => {
            let priority = build_priority(&app_config, &set)?;
            commands::priority::run(&priority);
            Ok(())
        }
        Command::Size { url } => {
            let probe = HttpSizeProbe::new(client);
            commands::size::run(&probe, &url).await;
            Ok(())
        }
    }
}

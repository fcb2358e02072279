//! # Quill Cache Control
//!
//! Operator entry point for the post cache: report health, inspect a key,
//! or flush key families. Connects with the same `CACHE_*` settings the
//! service uses, through the same startup selection.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_cache::{CacheBackendExt, CacheHealth, KeyFamily, select_backend};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "quill-cachectl")]
#[command(about = "Probe and maintain the Quill post cache", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the backend and print a health report as JSON
    Health,

    /// Print the raw cached value stored under a key
    Get {
        /// Full cache key, e.g. posts:all
        key: String,
    },

    /// Drop every entry in a key family
    Flush {
        /// post-by-id, post-by-slug, all-posts, paged-posts, or all
        family: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&config);

    let args = Args::parse();

    tracing::info!(
        version = quill_cache::VERSION,
        cache = ?config.cache,
        "Starting quill-cachectl"
    );

    let selection = select_backend(&config.cache).await;
    let backend = selection.backend();

    match args.command {
        Command::Health => {
            let health = CacheHealth::probe(backend.as_ref(), config.cache.enabled).await;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }

        Command::Get { key } => {
            let Some(raw) = backend.get_raw(&key).await else {
                anyhow::bail!("no cached value for '{key}' on {} backend", backend.name());
            };
            println!("{raw}");
        }

        Command::Flush { family } => {
            let families = parse_families(&family)?;
            if !selection.is_connected() {
                tracing::warn!(backend = backend.name(), "Cache not connected, nothing to flush");
            }

            for family in families {
                let removed = backend.invalidate_family(family).await;
                println!("{}\t{removed}", family.as_str());
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());

    // Logs go to stderr; stdout carries command output.
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

fn parse_families(arg: &str) -> Result<Vec<KeyFamily>> {
    if arg.eq_ignore_ascii_case("all") {
        return Ok(KeyFamily::ALL.to_vec());
    }

    let family = arg
        .parse::<KeyFamily>()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("cannot flush '{arg}'"))?;
    Ok(vec![family])
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_families() {
        assert_eq!(parse_families("all").unwrap().len(), KeyFamily::ALL.len());
        assert_eq!(
            parse_families("paged-posts").unwrap(),
            vec![KeyFamily::PagedPosts]
        );
        assert!(parse_families("everything").is_err());
    }

    #[tokio::test]
    async fn test_flush_on_disabled_cache_removes_nothing() {
        let selection = select_backend(&quill_cache::CacheSettings::default()).await;
        let backend = selection.backend();
        for family in KeyFamily::ALL {
            assert_eq!(backend.invalidate_family(family).await, 0);
        }
    }
}

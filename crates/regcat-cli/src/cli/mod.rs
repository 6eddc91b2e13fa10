//! CLI for the regcat registry catalog browser.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use regcat_core::config;

use commands::{
    registry_client, run_delete_manifest, run_ping, run_repos, run_retag, run_tag_details,
    run_tags,
};

/// Top-level CLI for regcat.
#[derive(Debug, Parser)]
#[command(name = "regcat")]
#[command(about = "regcat: browse large container registry catalogs", long_about = None)]
pub struct Cli {
    /// Registry root URL (overrides `registry_url` from config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub registry: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check that the registry answers the v2 API.
    Ping,

    /// List every repository in the catalog.
    Repos {
        /// Also fetch the tag count of each repository.
        #[arg(long)]
        details: bool,
        /// Detail requests in flight at once (default from config, 100).
        #[arg(long, value_name = "N")]
        window: Option<usize>,
    },

    /// List every tag of a repository.
    Tags {
        /// Repository name, e.g. `library/nginx`.
        repository: String,
    },

    /// Resolve every tag of a repository to its image digest.
    TagDetails {
        /// Repository name, e.g. `library/nginx`.
        repository: String,
        /// Detail requests in flight at once (default from config, 100).
        #[arg(long, value_name = "N")]
        window: Option<usize>,
        /// Print each tag as soon as it resolves instead of a sorted table.
        #[arg(long)]
        live: bool,
        /// Fetch both manifest schemas per tag (platform, size, history).
        #[arg(long)]
        full: bool,
    },

    /// Point a new tag at the manifest of an existing one.
    Retag {
        /// Repository name.
        repository: String,
        /// Existing tag.
        source_tag: String,
        /// Tag to create or move.
        new_tag: String,
    },

    /// Delete a manifest (and every tag pointing at it) by digest.
    DeleteManifest {
        /// Repository name.
        repository: String,
        /// Manifest digest, e.g. `sha256:...`.
        digest: String,
    },
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let client = registry_client(&cfg, cli.registry.as_deref())?;

        match cli.command {
            CliCommand::Ping => run_ping(&client).await?,
            CliCommand::Repos { details, window } => {
                run_repos(&client, &cfg, details, window).await?
            }
            CliCommand::Tags { repository } => run_tags(&client, &repository).await?,
            CliCommand::TagDetails {
                repository,
                window,
                live,
                full,
            } => run_tag_details(&client, &cfg, &repository, window, live, full).await?,
            CliCommand::Retag {
                repository,
                source_tag,
                new_tag,
            } => run_retag(&client, &repository, &source_tag, &new_tag).await?,
            CliCommand::DeleteManifest { repository, digest } => {
                run_delete_manifest(&client, &repository, &digest).await?
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

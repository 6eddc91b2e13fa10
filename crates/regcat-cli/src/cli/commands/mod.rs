//! CLI command handlers. Each command is in its own file.

mod delete_manifest;
mod ping;
mod repos;
mod retag;
mod tag_details;
mod tags;

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use regcat_core::config::RegcatConfig;
use regcat_core::fanout::{FailedItem, FanoutEvent, FanoutOptions, FanoutReport};
use regcat_core::registry::RegistryClient;

pub use delete_manifest::run_delete_manifest;
pub use ping::run_ping;
pub use repos::run_repos;
pub use retag::run_retag;
pub use tag_details::run_tag_details;
pub use tags::run_tags;

/// `--registry` wins over `registry_url` from the config file.
pub(crate) fn resolve_registry_url<'a>(cfg: &'a RegcatConfig, flag: Option<&'a str>) -> Option<&'a str> {
    flag.or(cfg.registry_url.as_deref())
}

pub fn registry_client(cfg: &RegcatConfig, flag: Option<&str>) -> Result<RegistryClient> {
    let url = resolve_registry_url(cfg, flag)
        .context("no registry configured: pass --registry or set registry_url in config.toml")?;
    let client = RegistryClient::new(url, cfg.transport())?.with_page_size(cfg.page_size);
    Ok(client)
}

/// Config fan-out options with an optional `--window` override.
pub(crate) fn fanout_options(cfg: &RegcatConfig, window: Option<usize>) -> FanoutOptions {
    let mut options = cfg.fanout_options();
    if let Some(window) = window {
        options.window_size = window.max(1);
    }
    options
}

/// Drains an aggregating fan-out, printing a progress line before each window.
pub(crate) async fn finish_with_progress<T>(
    events: impl Stream<Item = FanoutEvent<T>>,
) -> Result<FanoutReport<T>> {
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        match event {
            FanoutEvent::Window(p) => {
                let eta = p
                    .eta_secs()
                    .map(|s| format!("{:.0}s", s))
                    .unwrap_or_else(|| "?".to_string());
                eprintln!(
                    "  fetching {}-{} of {} ({:.0}%)  ETA {}",
                    p.offset + 1,
                    p.offset + p.window_len,
                    p.total_items,
                    p.fraction() * 100.0,
                    eta
                );
            }
            FanoutEvent::Finished(report) => return Ok(report),
        }
    }
    anyhow::bail!("detail fetch ended without a result")
}

pub(crate) fn print_failures(failures: &[FailedItem], dropped: usize) {
    for failure in failures {
        eprintln!("  {}: {}", failure.source, failure.error);
    }
    if dropped > 0 {
        eprintln!("  {} item(s) failed and were dropped", dropped);
    }
}

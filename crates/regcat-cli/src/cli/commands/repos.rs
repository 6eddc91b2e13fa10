//! `regcat repos` – list repositories, optionally with tag counts.

use anyhow::Result;
use regcat_core::catalog;
use regcat_core::config::RegcatConfig;
use regcat_core::registry::RegistryClient;

use super::{fanout_options, finish_with_progress, print_failures};

pub async fn run_repos(
    client: &RegistryClient,
    cfg: &RegcatConfig,
    details: bool,
    window: Option<usize>,
) -> Result<()> {
    let repos = catalog::repositories(client).await?;
    if repos.is_empty() {
        println!("No repositories in registry.");
        return Ok(());
    }
    if !details {
        for repo in repos {
            println!("{}", repo.name);
        }
        return Ok(());
    }

    let options = fanout_options(cfg, window);
    let report = finish_with_progress(catalog::repository_details(client, repos, options)).await?;

    println!("{:<50} {}", "REPOSITORY", "TAGS");
    for repo in &report.items {
        println!("{:<50} {}", repo.name, repo.tag_count);
    }
    print_failures(&report.failures, report.dropped);
    tracing::info!(
        repositories = report.items.len(),
        failed = report.failed(),
        "repos --details completed"
    );
    Ok(())
}

//! `regcat tag-details <repository>` – resolve every tag to its image digest,
//! or with `--full` to its platform, size and layer history.

use anyhow::Result;
use futures::{Stream, StreamExt};
use regcat_core::catalog;
use regcat_core::config::RegcatConfig;
use regcat_core::fanout::{FanoutEvent, Named};
use regcat_core::partial::PartialOutcome;
use regcat_core::registry::{RegistryClient, ShortTag, TagDetail};

use super::{fanout_options, finish_with_progress, print_failures};

/// One output line per tag.
trait TagRow: Named {
    fn header() -> String;
    fn row(&self) -> String;
}

impl TagRow for ShortTag {
    fn header() -> String {
        format!("{:<30} {:<75} {}", "TAG", "IMAGE DIGEST", "MANIFEST DIGEST")
    }

    fn row(&self) -> String {
        format!(
            "{:<30} {:<75} {}",
            self.name,
            self.image_digest,
            self.manifest_digest.as_deref().unwrap_or("-")
        )
    }
}

impl TagRow for TagDetail {
    fn header() -> String {
        format!("{:<30} {:<16} {:>12} {:>7} {}", "TAG", "PLATFORM", "SIZE", "LAYERS", "IMAGE DIGEST")
    }

    fn row(&self) -> String {
        let platform = format!(
            "{}/{}",
            self.os.as_deref().unwrap_or("?"),
            self.architecture.as_deref().unwrap_or("?")
        );
        format!(
            "{:<30} {:<16} {:>12} {:>7} {}",
            self.name,
            platform,
            self.size,
            self.history.len(),
            self.image_digest
        )
    }
}

pub async fn run_tag_details(
    client: &RegistryClient,
    cfg: &RegcatConfig,
    repository: &str,
    window: Option<usize>,
    live: bool,
    full: bool,
) -> Result<()> {
    let tags = catalog::tags(client, repository).await?;
    if tags.is_empty() {
        println!("No tags in {repository}.");
        return Ok(());
    }
    let options = fanout_options(cfg, window);

    match (full, live) {
        (false, true) => {
            let outcomes = catalog::tag_details_live(client, repository, tags, options.window_size);
            print_live(repository, outcomes).await
        }
        (true, true) => {
            let outcomes = catalog::full_tag_details_live(client, repository, tags, options.window_size);
            print_live(repository, outcomes).await
        }
        (false, false) => {
            print_table(repository, catalog::tag_details(client, repository, tags, options)).await
        }
        (true, false) => {
            print_table(repository, catalog::full_tag_details(client, repository, tags, options)).await
        }
    }
}

async fn print_live<T: TagRow>(
    repository: &str,
    outcomes: impl Stream<Item = PartialOutcome<T>>,
) -> Result<()> {
    let mut outcomes = std::pin::pin!(outcomes);
    let mut failed = 0usize;
    while let Some(outcome) = outcomes.next().await {
        match outcome.result {
            Ok(tag) => println!("{}", tag.row()),
            Err(e) => {
                failed += 1;
                eprintln!("{:<30} error: {}", outcome.source, e);
            }
        }
    }
    if failed > 0 {
        tracing::warn!(repository, failed, "some tags could not be resolved");
    }
    Ok(())
}

async fn print_table<T: TagRow>(
    repository: &str,
    events: impl Stream<Item = FanoutEvent<T>>,
) -> Result<()> {
    let report = finish_with_progress(events).await?;

    println!("{}", T::header());
    for tag in &report.items {
        println!("{}", tag.row());
    }
    print_failures(&report.failures, report.dropped);
    tracing::info!(
        repository,
        tags = report.items.len(),
        failed = report.failed(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "tag-details completed"
    );
    Ok(())
}

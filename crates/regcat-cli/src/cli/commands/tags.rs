//! `regcat tags <repository>` – list every tag of a repository.

use anyhow::Result;
use regcat_core::catalog;
use regcat_core::registry::RegistryClient;

pub async fn run_tags(client: &RegistryClient, repository: &str) -> Result<()> {
    let tags = catalog::tags(client, repository).await?;
    if tags.is_empty() {
        println!("No tags in {repository}.");
    }
    for tag in tags {
        println!("{tag}");
    }
    Ok(())
}

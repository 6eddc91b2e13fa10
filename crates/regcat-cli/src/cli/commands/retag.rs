//! `regcat retag <repository> <source-tag> <new-tag>` – point a tag at an existing manifest.

use anyhow::{Context, Result};
use regcat_core::registry::RegistryClient;

pub async fn run_retag(
    client: &RegistryClient,
    repository: &str,
    source_tag: &str,
    new_tag: &str,
) -> Result<()> {
    let digest = client
        .retag(repository, source_tag, new_tag)
        .await
        .with_context(|| format!("tagging {repository}:{source_tag} as {new_tag}"))?;
    match digest {
        Some(digest) => println!("Tagged {repository}:{new_tag} ({digest})"),
        None => println!("Tagged {repository}:{new_tag}"),
    }
    Ok(())
}

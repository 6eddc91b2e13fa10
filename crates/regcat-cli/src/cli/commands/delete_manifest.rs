//! `regcat delete-manifest <repository> <digest>` – delete a manifest by digest.

use anyhow::{Context, Result};
use regcat_core::registry::RegistryClient;

pub async fn run_delete_manifest(client: &RegistryClient, repository: &str, digest: &str) -> Result<()> {
    client
        .delete_manifest(repository, digest)
        .await
        .with_context(|| format!("deleting {repository}@{digest}"))?;
    println!("Deleted {repository}@{digest}");
    Ok(())
}

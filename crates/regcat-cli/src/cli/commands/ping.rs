//! `regcat ping` – check that the registry answers.

use anyhow::{Context, Result};
use regcat_core::registry::RegistryClient;

pub async fn run_ping(client: &RegistryClient) -> Result<()> {
    client
        .ping()
        .await
        .with_context(|| format!("registry {} is not reachable", client.base_url()))?;
    println!("Registry {} is up.", client.base_url());
    Ok(())
}

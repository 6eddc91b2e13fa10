//! `PageSource` adapters over the registry's paginated list endpoints.

use async_trait::async_trait;

use super::RegistryClient;
use crate::error::TransportError;
use crate::pager::{Cursor, Page, PageSource};

/// Pages of `/v2/_catalog`.
#[derive(Debug, Clone, Copy)]
pub struct CatalogPages<'a> {
    client: &'a RegistryClient,
}

impl<'a> CatalogPages<'a> {
    pub fn new(client: &'a RegistryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for CatalogPages<'_> {
    type Item = String;

    fn stage(&self) -> String {
        "repositories".to_string()
    }

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<String>, TransportError> {
        self.client.catalog_page(cursor).await
    }
}

/// Pages of `/v2/<repository>/tags/list`.
#[derive(Debug, Clone, Copy)]
pub struct TagPages<'a> {
    client: &'a RegistryClient,
    repository: &'a str,
}

impl<'a> TagPages<'a> {
    pub fn new(client: &'a RegistryClient, repository: &'a str) -> Self {
        Self { client, repository }
    }
}

#[async_trait]
impl PageSource for TagPages<'_> {
    type Item = String;

    fn stage(&self) -> String {
        format!("tags of {}", self.repository)
    }

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<String>, TransportError> {
        self.client.tags_page(self.repository, cursor).await
    }
}

//! Docker Registry HTTP API v2 client.
//!
//! Uses the curl crate (libcurl) for each request, run on tokio's blocking
//! pool so many detail fetches can be in flight at once. Paginated list
//! endpoints return a [`Page`] whose cursor comes from the `Link` header.

mod link;
mod manifest;
mod request;
mod sources;
mod types;

use url::Url;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::pager::{Cursor, Page};
use request::{Method, Response, Upload};

pub use link::next_cursor;
pub use sources::{CatalogPages, TagPages};
pub use types::{LayerHistory, Repository, RepositorySummary, ShortTag, TagDetail};

/// Media type of schema 2 image manifests.
pub const MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// Media type of signed schema 1 manifests (platform and layer history).
pub const MANIFEST_V1: &str = "application/vnd.docker.distribution.manifest.v1+prettyjws";

/// Handle on one registry. Cheap to clone; every clone talks to the same base URL.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base: Url,
    transport: TransportConfig,
    page_size: Option<u32>,
}

impl RegistryClient {
    /// `base_url` is the registry root, e.g. `https://registry.example.com/`.
    pub fn new(base_url: &str, transport: TransportConfig) -> Result<Self, TransportError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized).map_err(|source| TransportError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base,
            transport,
            page_size: None,
        })
    }

    /// Page size requested on the first page of every list (`n`). Later pages
    /// use whatever the server put in its cursor.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size.filter(|n| *n > 0);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Checks that the registry answers the v2 API base endpoint.
    pub async fn ping(&self) -> Result<(), TransportError> {
        let url = self.endpoint("v2/")?;
        let response = self.send(Method::Get, url, None, None).await?;
        tracing::debug!(url = %response.url, status = response.status, "registry ping ok");
        Ok(())
    }

    /// One page of the repository catalog.
    pub async fn catalog_page(&self, cursor: Option<&Cursor>) -> Result<Page<String>, TransportError> {
        let url = self.list_url("v2/_catalog", cursor)?;
        let response = self.send(Method::Get, url, None, None).await?;
        let body: types::CatalogBody = response.json()?;
        Ok(page_of(&response, body.repositories.unwrap_or_default()))
    }

    /// One page of a repository's tag list. A `null` tag list is an empty page.
    pub async fn tags_page(
        &self,
        repository: &str,
        cursor: Option<&Cursor>,
    ) -> Result<Page<String>, TransportError> {
        let url = self.list_url(&format!("v2/{repository}/tags/list"), cursor)?;
        let response = self.send(Method::Get, url, None, None).await?;
        let body: types::TagsBody = response.json()?;
        Ok(page_of(&response, body.tags.unwrap_or_default()))
    }

    /// Resolves `tag` to its image config digest via the v2 manifest.
    pub async fn short_tag(&self, repository: &str, tag: &str) -> Result<ShortTag, TransportError> {
        let response = self.manifest(repository, tag, MANIFEST_V2).await?;
        let body: types::ManifestBody = response.json()?;
        let config = body.config.ok_or_else(|| TransportError::Malformed {
            url: response.url.to_string(),
            reason: "manifest has no config descriptor".to_string(),
        })?;
        Ok(ShortTag {
            name: tag.to_string(),
            image_digest: config.digest,
            manifest_digest: response.header("docker-content-digest").map(str::to_string),
        })
    }

    /// Full detail of `tag`: both manifest schemas, fetched concurrently and merged.
    pub async fn tag(&self, repository: &str, tag: &str) -> Result<TagDetail, TransportError> {
        let (v1, v2) = tokio::try_join!(
            self.manifest(repository, tag, MANIFEST_V1),
            self.manifest(repository, tag, MANIFEST_V2),
        )?;
        manifest::merge(tag, &v1, &v2)
    }

    /// Uploads `body` as the manifest for `reference` (a tag or digest).
    /// Returns the digest the registry assigned, when it reports one.
    pub async fn put_manifest(
        &self,
        repository: &str,
        reference: &str,
        media_type: &str,
        body: Vec<u8>,
    ) -> Result<Option<String>, TransportError> {
        let url = self.endpoint(&format!("v2/{repository}/manifests/{reference}"))?;
        let upload = Upload {
            content_type: media_type.to_string(),
            body,
        };
        let response = self.send(Method::Put, url, None, Some(upload)).await?;
        let digest = response.header("docker-content-digest").map(str::to_string);
        tracing::info!(repository, reference, digest = ?digest, "manifest uploaded");
        Ok(digest)
    }

    /// Points `new_tag` at the manifest `source_tag` currently refers to.
    ///
    /// The manifest is re-uploaded byte for byte, so both tags share one digest.
    pub async fn retag(
        &self,
        repository: &str,
        source_tag: &str,
        new_tag: &str,
    ) -> Result<Option<String>, TransportError> {
        let source = self.manifest(repository, source_tag, MANIFEST_V2).await?;
        let media_type = source.media_type().unwrap_or(MANIFEST_V2).to_string();
        self.put_manifest(repository, new_tag, &media_type, source.body).await
    }

    /// Deletes a manifest by digest. Every tag pointing at it disappears too.
    pub async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<(), TransportError> {
        let url = self.endpoint(&format!("v2/{repository}/manifests/{digest}"))?;
        self.send(Method::Delete, url, None, None).await?;
        tracing::info!(repository, digest, "manifest deleted");
        Ok(())
    }

    async fn manifest(
        &self,
        repository: &str,
        reference: &str,
        accept: &'static str,
    ) -> Result<Response, TransportError> {
        let url = self.endpoint(&format!("v2/{repository}/manifests/{reference}"))?;
        self.send(Method::Get, url, Some(accept), None).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base.join(path).map_err(|source| TransportError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            source,
        })
    }

    fn list_url(&self, path: &str, cursor: Option<&Cursor>) -> Result<Url, TransportError> {
        let mut url = self.endpoint(path)?;
        match cursor {
            Some(cursor) => {
                url.query_pairs_mut()
                    .append_pair("n", &cursor.page_size.to_string())
                    .append_pair("last", &cursor.last_key);
            }
            None => {
                if let Some(n) = self.page_size {
                    url.query_pairs_mut().append_pair("n", &n.to_string());
                }
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        accept: Option<&'static str>,
        upload: Option<Upload>,
    ) -> Result<Response, TransportError> {
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || {
            request::perform(method, &url, accept, upload.as_ref(), &transport)
        })
        .await
        .map_err(|e| TransportError::Task(e.to_string()))?
    }
}

fn page_of(response: &Response, items: Vec<String>) -> Page<String> {
    let cursor = response
        .header("link")
        .and_then(|link| next_cursor(&response.url, link));
    Page { items, cursor }
}

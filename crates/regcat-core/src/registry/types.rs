use serde::{Deserialize, Serialize};

use crate::fanout::Named;

/// One repository from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
}

impl Named for Repository {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A repository enriched with the size of its tag list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub tag_count: usize,
}

impl Named for RepositorySummary {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A tag resolved to the digest of its image configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTag {
    pub name: String,
    /// `config.digest` of the v2 manifest; identifies the image.
    pub image_digest: String,
    /// `Docker-Content-Digest` of the manifest itself, needed to delete it.
    pub manifest_digest: Option<String>,
}

impl Named for ShortTag {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One layer of an image's build history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerHistory {
    pub id: Option<String>,
    pub created: Option<String>,
    /// Command that produced the layer, space-joined.
    pub created_by: Option<String>,
}

/// A tag with everything both manifest schemas say about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDetail {
    pub name: String,
    pub os: Option<String>,
    pub architecture: Option<String>,
    /// Sum of the compressed layer sizes, in bytes.
    pub size: u64,
    pub image_digest: String,
    pub manifest_digest: Option<String>,
    pub history: Vec<LayerHistory>,
}

impl Named for TagDetail {
    fn name(&self) -> &str {
        &self.name
    }
}

// Response bodies.

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogBody {
    #[serde(default)]
    pub repositories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagsBody {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManifestBody {
    #[serde(default)]
    pub config: Option<ManifestConfig>,
    #[serde(default)]
    pub layers: Vec<ManifestLayer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManifestConfig {
    pub digest: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManifestLayer {
    #[serde(default)]
    pub size: u64,
}

//! Combining the schema 1 and schema 2 manifests of one tag.
//!
//! Schema 2 carries the image config digest and the layer sizes. Schema 1
//! carries the platform and the per-layer build history, serialized as JSON
//! strings in `history[].v1Compatibility` (newest layer first).

use serde::Deserialize;

use super::request::Response;
use super::types::{LayerHistory, ManifestBody, TagDetail};
use crate::error::TransportError;

#[derive(Debug, Deserialize)]
struct ManifestV1Body {
    #[serde(default)]
    architecture: Option<String>,
    #[serde(default)]
    history: Vec<V1History>,
}

#[derive(Debug, Deserialize)]
struct V1History {
    #[serde(rename = "v1Compatibility")]
    v1_compatibility: String,
}

#[derive(Debug, Default, Deserialize)]
struct V1Compat {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    os: Option<String>,
    #[serde(default)]
    architecture: Option<String>,
    #[serde(default)]
    container_config: Option<ContainerConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ContainerConfig {
    #[serde(rename = "Cmd", default)]
    cmd: Option<Vec<String>>,
}

/// Builds the full detail of `tag` from its two manifest responses.
pub(crate) fn merge(tag: &str, v1: &Response, v2: &Response) -> Result<TagDetail, TransportError> {
    let v1_body: ManifestV1Body = v1.json()?;
    let v2_body: ManifestBody = v2.json()?;

    let config = v2_body.config.ok_or_else(|| TransportError::Malformed {
        url: v2.url.to_string(),
        reason: "manifest has no config descriptor".to_string(),
    })?;

    let mut history = Vec::with_capacity(v1_body.history.len());
    for entry in &v1_body.history {
        let compat: V1Compat =
            serde_json::from_str(&entry.v1_compatibility).map_err(|source| TransportError::Decode {
                url: v1.url.to_string(),
                source,
            })?;
        history.push(compat);
    }
    let newest = history.first();
    let os = newest.and_then(|h| h.os.clone());
    let architecture = v1_body
        .architecture
        .or_else(|| newest.and_then(|h| h.architecture.clone()));

    Ok(TagDetail {
        name: tag.to_string(),
        os,
        architecture,
        size: v2_body.layers.iter().map(|l| l.size).sum(),
        image_digest: config.digest,
        manifest_digest: v2.header("docker-content-digest").map(str::to_string),
        history: history
            .into_iter()
            .map(|h| LayerHistory {
                id: h.id,
                created: h.created,
                created_by: h
                    .container_config
                    .and_then(|c| c.cmd)
                    .map(|cmd| cmd.join(" ")),
            })
            .collect(),
    })
}

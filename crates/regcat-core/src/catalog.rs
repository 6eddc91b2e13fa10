//! Registry catalog operations built on the pager and the windowed fan-out.
//!
//! Full lists (repositories, tags) are walked page by page; per-item details
//! (tag counts, manifest digests, full tag details) are fetched concurrently,
//! one window at a time.

use futures::Stream;

use crate::fanout::{self, FanoutEvent, FanoutOptions};
use crate::pager::{self, PageFetchError};
use crate::partial::{PartialOutcome, RequestUnit};
use crate::registry::{
    CatalogPages, RegistryClient, Repository, RepositorySummary, ShortTag, TagDetail, TagPages,
};

/// Every repository in the registry, in catalog order.
pub async fn repositories(client: &RegistryClient) -> Result<Vec<Repository>, PageFetchError> {
    let names = pager::fetch_all(&CatalogPages::new(client)).await?;
    Ok(names.into_iter().map(|name| Repository { name }).collect())
}

/// Every tag of `repository`, in registry order.
pub async fn tags(client: &RegistryClient, repository: &str) -> Result<Vec<String>, PageFetchError> {
    pager::fetch_all(&TagPages::new(client, repository)).await
}

/// Tag counts for each repository, sorted by repository name.
///
/// A repository with no tags is reported with `tag_count == 0`; only failed
/// lookups go through the configured failure policy.
pub fn repository_details(
    client: &RegistryClient,
    repositories: Vec<Repository>,
    options: FanoutOptions,
) -> impl Stream<Item = FanoutEvent<RepositorySummary>> + Send {
    let client = client.clone();
    fanout::aggregate(
        repositories,
        move |repository: &Repository| {
            let client = client.clone();
            let name = repository.name.clone();
            RequestUnit::new(name.clone(), async move {
                let tag_list = tags(&client, &name).await?;
                Ok::<_, PageFetchError>(RepositorySummary {
                    name,
                    tag_count: tag_list.len(),
                })
            })
        },
        options,
    )
}

fn short_tag_unit(client: &RegistryClient, repository: &str, tag: &str) -> RequestUnit<ShortTag> {
    let client = client.clone();
    let repository = repository.to_string();
    let tag = tag.to_string();
    RequestUnit::new(tag.clone(), async move { client.short_tag(&repository, &tag).await })
}

/// Image digests for `tags`, with a progress event before each window and a
/// tag-name-sorted report at the end.
pub fn tag_details(
    client: &RegistryClient,
    repository: &str,
    tags: Vec<String>,
    options: FanoutOptions,
) -> impl Stream<Item = FanoutEvent<ShortTag>> + Send {
    let client = client.clone();
    let repository = repository.to_string();
    fanout::aggregate(
        tags,
        move |tag: &String| short_tag_unit(&client, &repository, tag),
        options,
    )
}

/// Image digests for `tags`, yielded as each lookup completes.
pub fn tag_details_live(
    client: &RegistryClient,
    repository: &str,
    tags: Vec<String>,
    window_size: usize,
) -> impl Stream<Item = PartialOutcome<ShortTag>> + Send {
    let client = client.clone();
    let repository = repository.to_string();
    fanout::stream_outcomes(
        tags,
        move |tag: &String| short_tag_unit(&client, &repository, tag),
        window_size,
    )
}

fn tag_detail_unit(client: &RegistryClient, repository: &str, tag: &str) -> RequestUnit<TagDetail> {
    let client = client.clone();
    let repository = repository.to_string();
    let tag = tag.to_string();
    RequestUnit::new(tag.clone(), async move { client.tag(&repository, &tag).await })
}

/// Full details (platform, size, history) for `tags`, windowed and sorted like
/// [`tag_details`].
pub fn full_tag_details(
    client: &RegistryClient,
    repository: &str,
    tags: Vec<String>,
    options: FanoutOptions,
) -> impl Stream<Item = FanoutEvent<TagDetail>> + Send {
    let client = client.clone();
    let repository = repository.to_string();
    fanout::aggregate(
        tags,
        move |tag: &String| tag_detail_unit(&client, &repository, tag),
        options,
    )
}

/// Full details for `tags`, yielded as each lookup completes.
pub fn full_tag_details_live(
    client: &RegistryClient,
    repository: &str,
    tags: Vec<String>,
    window_size: usize,
) -> impl Stream<Item = PartialOutcome<TagDetail>> + Send {
    let client = client.clone();
    let repository = repository.to_string();
    fanout::stream_outcomes(
        tags,
        move |tag: &String| tag_detail_unit(&client, &repository, tag),
        window_size,
    )
}

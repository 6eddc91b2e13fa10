//! Cursor-based pagination.
//!
//! A paginated endpoint hands back a continuation cursor with every page
//! except the last one. The next page can only be requested once the previous
//! cursor is known, so `fetch_all` walks the pages strictly one after another
//! and concatenates their items in fetch order.

mod error;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::TransportError;

pub use error::PageFetchError;

/// Continuation token for the next page: the last key seen and the page size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub last_key: String,
    pub page_size: u32,
}

impl Cursor {
    pub fn new(last_key: impl Into<String>, page_size: u32) -> Self {
        Self {
            last_key: last_key.into(),
            page_size,
        }
    }

    /// Builds a cursor only when both parts are present and non-empty.
    /// A missing key or a zero page size means there are no more pages.
    pub fn from_parts(last_key: Option<String>, page_size: Option<u32>) -> Option<Self> {
        match (last_key, page_size) {
            (Some(last_key), Some(page_size)) if !last_key.is_empty() && page_size > 0 => {
                Some(Self {
                    last_key,
                    page_size,
                })
            }
            _ => None,
        }
    }
}

/// One page of results plus the cursor for the following page, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// A page that has a successor.
    pub fn more(items: Vec<T>, cursor: Cursor) -> Self {
        Self {
            items,
            cursor: Some(cursor),
        }
    }

    /// The final page.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }
}

/// A paginated list endpoint (the full catalog, the tags of one repository).
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    /// Short label naming the list, used in failure descriptors.
    fn stage(&self) -> String;

    /// Fetches one page. `cursor` is `None` for the first page and the
    /// previous page's cursor, unchanged, afterwards.
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<Self::Item>, TransportError>;
}

/// Fetches every page of `source` and returns all items in fetch order.
///
/// Any page failure aborts the run: no partial list is returned and no
/// further pages are requested. A server that hands back any cursor that was
/// already followed (the one just sent, or an earlier one in a cycle) is
/// reported as `PageFetchError::StalledCursor`, so no page is fetched twice.
pub async fn fetch_all<S>(source: &S) -> Result<Vec<S::Item>, PageFetchError>
where
    S: PageSource + ?Sized,
{
    let mut items = Vec::new();
    let mut cursor: Option<Cursor> = None;
    let mut followed: HashSet<Cursor> = HashSet::new();
    let mut page = 1usize;

    loop {
        tracing::debug!(stage = %source.stage(), page, cursor = ?cursor, "fetching page");
        let fetched = source
            .fetch_page(cursor.as_ref())
            .await
            .map_err(|e| PageFetchError::Transport {
                stage: source.stage(),
                page,
                cursor: cursor.clone(),
                source: e,
            })?;

        items.extend(fetched.items);

        match fetched.cursor {
            None => break,
            Some(next) if followed.contains(&next) => {
                return Err(PageFetchError::StalledCursor {
                    stage: source.stage(),
                    page,
                    cursor: next,
                });
            }
            Some(next) => {
                followed.insert(next.clone());
                cursor = Some(next);
                page += 1;
            }
        }
    }

    tracing::debug!(stage = %source.stage(), pages = page, items = items.len(), "pagination done");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves canned pages in order and records the cursor of every call.
    struct ScriptedPages {
        pages: Mutex<VecDeque<Result<Page<&'static str>, TransportError>>>,
        seen: Mutex<Vec<Option<Cursor>>>,
    }

    impl ScriptedPages {
        fn new(pages: Vec<Result<Page<&'static str>, TransportError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<Cursor>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedPages {
        type Item = &'static str;

        fn stage(&self) -> String {
            "catalog".to_string()
        }

        async fn fetch_page(
            &self,
            cursor: Option<&Cursor>,
        ) -> Result<Page<&'static str>, TransportError> {
            self.seen.lock().unwrap().push(cursor.cloned());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetched past the last page")
        }
    }

    fn server_error() -> TransportError {
        TransportError::Http {
            method: "GET",
            url: "http://registry.test/v2/_catalog".to_string(),
            status: 500,
        }
    }

    #[test]
    fn cursor_requires_both_parts() {
        assert_eq!(
            Cursor::from_parts(Some("b".into()), Some(2)),
            Some(Cursor::new("b", 2))
        );
        assert_eq!(Cursor::from_parts(Some("b".into()), None), None);
        assert_eq!(Cursor::from_parts(None, Some(2)), None);
        assert_eq!(Cursor::from_parts(Some(String::new()), Some(2)), None);
        assert_eq!(Cursor::from_parts(Some("b".into()), Some(0)), None);
    }

    #[tokio::test]
    async fn three_pages_concatenate_in_order() {
        let source = ScriptedPages::new(vec![
            Ok(Page::more(vec!["a", "b"], Cursor::new("b", 2))),
            Ok(Page::more(vec!["c", "d"], Cursor::new("d", 2))),
            Ok(Page::last(vec!["e"])),
        ]);

        let items = fetch_all(&source).await.unwrap();

        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(
            source.calls(),
            vec![None, Some(Cursor::new("b", 2)), Some(Cursor::new("d", 2))]
        );
    }

    #[tokio::test]
    async fn empty_first_page_is_one_fetch() {
        let source = ScriptedPages::new(vec![Ok(Page::last(vec![]))]);

        let items = fetch_all(&source).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn page_failure_aborts_and_names_stage() {
        let source = ScriptedPages::new(vec![
            Ok(Page::more(vec!["a", "b"], Cursor::new("b", 2))),
            Err(server_error()),
            Ok(Page::last(vec!["never"])),
        ]);

        let err = fetch_all(&source).await.unwrap_err();

        match &err {
            PageFetchError::Transport {
                stage,
                page,
                cursor,
                source,
            } => {
                assert_eq!(stage, "catalog");
                assert_eq!(*page, 2);
                assert_eq!(cursor.as_ref(), Some(&Cursor::new("b", 2)));
                assert_eq!(source.status(), Some(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(source.calls().len(), 2);
        assert!(err.to_string().contains("catalog"));
    }

    #[tokio::test]
    async fn repeated_cursor_is_not_followed() {
        let source = ScriptedPages::new(vec![
            Ok(Page::more(vec!["a"], Cursor::new("a", 1))),
            Ok(Page::more(vec!["a"], Cursor::new("a", 1))),
        ]);

        let err = fetch_all(&source).await.unwrap_err();

        assert!(matches!(err, PageFetchError::StalledCursor { page: 2, .. }));
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn cursor_cycle_is_not_followed() {
        let source = ScriptedPages::new(vec![
            Ok(Page::more(vec!["a"], Cursor::new("a", 1))),
            Ok(Page::more(vec!["b"], Cursor::new("b", 1))),
            Ok(Page::more(vec!["a"], Cursor::new("a", 1))),
            Ok(Page::last(vec!["never"])),
        ]);

        let err = fetch_all(&source).await.unwrap_err();

        match err {
            PageFetchError::StalledCursor { page, cursor, .. } => {
                assert_eq!(page, 3);
                assert_eq!(cursor, Cursor::new("a", 1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            source.calls(),
            vec![None, Some(Cursor::new("a", 1)), Some(Cursor::new("b", 1))]
        );
    }
}

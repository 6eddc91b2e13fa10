//! `Link` response header parsing for registry pagination.
//!
//! Paginated registry endpoints announce the next page with a header such as
//! `Link: </v2/_catalog?last=b&n=2>; rel="next"`. The target may be relative
//! to the registry or absolute.

use url::Url;

use crate::pager::Cursor;

/// Extracts the continuation cursor from a `Link` header value.
///
/// Returns `None` when there is no `rel="next"` entry or when its target does
/// not carry both `last` and `n`.
pub fn next_cursor(base: &Url, header: &str) -> Option<Cursor> {
    header
        .split(',')
        .find_map(|entry| next_target(entry.trim()))
        .and_then(|target| base.join(target).ok())
        .and_then(|url| cursor_from_query(&url))
}

/// Returns the `<...>` target of a link entry whose `rel` is `next`.
fn next_target(entry: &str) -> Option<&str> {
    let (target, params) = entry.split_once(';')?;
    let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
    let is_next = params.split(';').any(|p| {
        p.split_once('=').is_some_and(|(k, v)| {
            k.trim().eq_ignore_ascii_case("rel")
                && v.trim().trim_matches('"').split_whitespace().any(|r| r.eq_ignore_ascii_case("next"))
        })
    });
    is_next.then_some(target)
}

fn cursor_from_query(url: &Url) -> Option<Cursor> {
    let mut last = None;
    let mut n = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "last" => last = Some(value.into_owned()),
            "n" => n = value.parse::<u32>().ok(),
            _ => {}
        }
    }
    Cursor::from_parts(last, n)
}

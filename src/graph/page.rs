//! Cursor-based pagination.
//!
//! A listing request yields a first [`Page`] plus a [`Pager`] that follows
//! the server's `paging.next` continuation until the server stops supplying
//! one. The sequence is lazy, finite and non-restartable; there is no page
//! cap, so popular entities legitimately produce many pages. Any transport
//! or decode failure aborts the sequence and propagates — no retries.

use serde::Deserialize;
use serde_json::Value;

use super::{decode, GraphError, GraphSession};

/// One page of a paginated listing, in server order.
#[derive(Debug)]
pub struct Page {
    pub records: Vec<Value>,
    /// Aggregate summary object, present when the request asked for one.
    pub summary: Option<Value>,
}

/// Continuation over the remaining pages of a listing.
pub struct Pager<'a> {
    session: &'a dyn GraphSession,
    next: Option<String>,
}

impl std::fmt::Debug for Pager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager").field("next", &self.next).finish()
    }
}

impl Pager<'_> {
    /// Fetch the next page, or `None` once the server signals the end.
    pub async fn next(&mut self) -> Result<Option<Page>, GraphError> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };
        let value = self.session.get_url(&url).await?;
        let (page, next) = parse(&url, value)?;
        self.next = next;
        Ok(Some(page))
    }
}

#[derive(Deserialize)]
struct PageBody {
    data: Vec<Value>,
    #[serde(default)]
    summary: Option<Value>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Default, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

fn parse(resource: &str, value: Value) -> Result<(Page, Option<String>), GraphError> {
    let body: PageBody = decode(resource, value)?;
    let next = body.paging.and_then(|p| p.next);
    Ok((
        Page {
            records: body.data,
            summary: body.summary,
        },
        next,
    ))
}

/// Issue a listing request and return its first page plus the continuation.
pub async fn fetch<'a>(
    session: &'a dyn GraphSession,
    path: &str,
    params: &[(&str, &str)],
) -> Result<(Page, Pager<'a>), GraphError> {
    let value = session.get(path, params).await?;
    let (page, next) = parse(path, value)?;
    Ok((page, Pager { session, next }))
}

/// Drain every page of a listing, concatenating records in server order.
/// The summary comes from the first page, where the API attaches it.
pub async fn drain(
    session: &dyn GraphSession,
    path: &str,
    params: &[(&str, &str)],
) -> Result<(Vec<Value>, Option<Value>), GraphError> {
    let (mut first, mut pager) = fetch(session, path, params).await?;
    let summary = first.summary.take();
    let mut records = first.records;
    while let Some(page) = pager.next().await? {
        records.extend(page.records);
    }
    Ok((records, summary))
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    total_count: Option<u64>,
    count: Option<u64>,
}

/// Read the total out of a summary object.
///
/// The API uses `total_count` on edges and `count` on nested summaries; an
/// absent or unexpectedly-shaped summary deliberately reads as zero, since
/// requests that don't ask for a summary simply don't get one.
pub fn summary_total(summary: Option<&Value>) -> u64 {
    summary
        .and_then(|v| serde_json::from_value::<Summary>(v.clone()).ok())
        .and_then(|s| s.total_count.or(s.count))
        .unwrap_or(0)
}

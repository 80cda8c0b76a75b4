//! Comment-thread resolution.
//!
//! The listing endpoints inline the first page of each comment's reply
//! thread, capped at 100 items. An inline page shorter than the cap is
//! complete and gets decoded as-is; a page that hits the cap is treated as
//! evidence of truncation, discarded, and replaced by a full paginated fetch
//! of that comment's thread — recursively, since the refetched comments
//! carry inline reply payloads of their own.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::graph::page::{self, summary_total};
use crate::graph::{decode, GraphError, GraphSession};
use crate::harvest::model::{Comment, CommentFields};

/// The API's undocumented inline-page cap. An inline payload of this many
/// items may have been truncated, so it triggers a full refetch. The
/// 99-vs-100 cutoff is reverse-engineered, not a documented contract.
pub(crate) const INLINE_REPLY_CAP: usize = 100;

const THREAD_FIELDS: &str =
    "id,created_time,from,message,like_count,comment_count,comments.limit(100){id,created_time,from,message}";

/// Resolve a comment thread from an entity's inline payload.
///
/// Absent payload means an empty thread. A payload under the cap is decoded
/// shallowly (nested replies come only from what was inlined). A payload at
/// the cap is discarded in favor of [`fetch_thread`] on the entity itself.
/// Any fetch failure aborts the whole resolution; partial trees are never
/// returned.
pub async fn resolve_inline(
    session: &dyn GraphSession,
    entity: &str,
    inline: Option<&Value>,
) -> Result<Vec<Comment>, GraphError> {
    let Some(payload) = inline else {
        return Ok(Vec::new());
    };
    let resource = format!("{entity}/comments (inline)");
    let data = payload
        .get("data")
        .cloned()
        .unwrap_or(Value::Null);
    let items: Vec<Value> = decode(&resource, data)?;
    if items.len() >= INLINE_REPLY_CAP {
        let (thread, _) = fetch_thread_boxed(session, entity).await?;
        return Ok(thread);
    }
    items
        .iter()
        .map(|item| decode_shallow(&resource, item))
        .collect()
}

/// Fetch an entity's full comment thread, paginated, recursing into each
/// comment's own inline reply payload. Returns the thread plus the
/// server-reported total comment count for the entity.
pub async fn fetch_thread(
    session: &dyn GraphSession,
    entity: &str,
) -> Result<(Vec<Comment>, u64), GraphError> {
    let path = format!("{entity}/comments");
    let params = [
        ("fields", THREAD_FIELDS),
        ("summary", "1"),
        ("limit", "100"),
    ];
    let (records, summary) = page::drain(session, &path, &params).await?;
    let total = summary_total(summary.as_ref());

    let mut thread = Vec::with_capacity(records.len());
    for record in records {
        let fields: CommentFields = decode(&path, record)?;
        let replies = resolve_inline(session, &fields.id, fields.comments.as_ref()).await?;
        thread.push(build(fields, replies));
    }
    Ok((thread, total))
}

// The indirection breaks the resolve_inline -> fetch_thread async cycle.
fn fetch_thread_boxed<'a>(
    session: &'a dyn GraphSession,
    entity: &'a str,
) -> Pin<Box<dyn Future<Output = Result<(Vec<Comment>, u64), GraphError>> + Send + 'a>> {
    Box::pin(fetch_thread(session, entity))
}

/// Decode an inline item without issuing further fetches; nested inline
/// replies are decoded the same way.
fn decode_shallow(resource: &str, item: &Value) -> Result<Comment, GraphError> {
    let fields: CommentFields = decode(resource, item.clone())?;
    let replies = match fields
        .comments
        .as_ref()
        .and_then(|c| c.get("data"))
        .and_then(Value::as_array)
    {
        Some(items) => items
            .iter()
            .map(|i| decode_shallow(resource, i))
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };
    Ok(build(fields, replies))
}

/// Zero counts normalize to absent: the record only carries counts the API
/// actually reported as non-zero, and downstream consumers rely on that.
fn build(fields: CommentFields, replies: Vec<Comment>) -> Comment {
    Comment {
        id: fields.id,
        created_time: fields.created_time,
        author: fields.from,
        message: fields.message,
        like_count: fields.like_count.filter(|&n| n != 0),
        reply_count: fields.comment_count.filter(|&n| n != 0),
        replies,
    }
}

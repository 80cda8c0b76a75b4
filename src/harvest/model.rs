//! Archive records and their wire-decoding counterparts.
//!
//! The serialized field names preserve the archive format the packer reads
//! back (`name` for captions, `from` for authors, `comment_count` /
//! `comments` for the reply tree), so previously-written archives stay
//! compatible. Wire structs are decode-only and never serialized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

/// One comment in a thread. Replies form a strictly hierarchical tree owned
/// by value; a reply never appears under two parents.
///
/// A count of `None` means "not reported by the API", which is distinct from
/// a confirmed zero — zeros are normalized to absent at decode time, and
/// absent counts are omitted from the serialized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub created_time: String,
    #[serde(rename = "from")]
    pub author: Actor,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u32>,
    #[serde(rename = "comment_count", skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u32>,
    #[serde(rename = "comments", default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

/// Total number of comments in a thread, including every nested reply.
/// Computed by traversal; never stored.
pub fn thread_size(thread: &[Comment]) -> usize {
    thread
        .iter()
        .map(|c| 1 + thread_size(&c.replies))
        .sum()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub created_time: String,
    pub updated_time: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub permalink_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "name", default)]
    pub caption: String,
    #[serde(rename = "shares")]
    pub share_count: u64,
    pub like_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<Like>>,
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    /// Supplied by the caller from the album listing; the per-photo fetch
    /// does not return it.
    #[serde(rename = "album")]
    pub album_name: String,
    pub created_time: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "name", default)]
    pub caption: String,
    pub like_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<Like>>,
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

// ---------------------------------------------------------------------------
// Wire structs (decode-only)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PostFields {
    pub id: String,
    pub created_time: String,
    pub updated_time: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub permalink_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shares: Option<ShareSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShareSummary {
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoFields {
    pub id: String,
    pub created_time: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentFields {
    pub id: String,
    pub created_time: String,
    pub from: Actor,
    #[serde(default)]
    pub message: String,
    pub like_count: Option<u32>,
    pub comment_count: Option<u32>,
    /// Inline first page of this comment's own reply thread, when the
    /// request asked for one.
    pub comments: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListedPost {
    pub id: String,
    pub created_time: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListedVideo {
    pub id: String,
    #[serde(default)]
    pub permalink_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListedPhoto {
    pub id: String,
    #[serde(default)]
    pub link: String,
    pub album: AlbumRef,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRef {
    pub source: String,
}

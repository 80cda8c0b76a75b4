//! Per-entity enrichment.
//!
//! A harvested post or photo is assembled in a fixed order: scalar fields,
//! share count (posts), comments, likes. Whether comments and likes arrive
//! as full collections or as summary counts is decided once per run by
//! [`HarvestOptions`]; there is no partial-success state — any sub-fetch
//! failure fails the whole entity.

use crate::config::HarvestOptions;
use crate::graph::page::{self, summary_total};
use crate::graph::{decode, GraphError, GraphSession};
use crate::harvest::comments;
use crate::harvest::model::{Comment, Like, Photo, PhotoFields, Post, PostFields};

const POST_FIELDS: &str =
    "id,created_time,updated_time,message,type,permalink_url,link,name,shares";
const PHOTO_FIELDS: &str = "id,created_time,updated_time,link,name";
const LIKE_FIELDS: &str = "id,name";

pub struct EntityHarvester<'a> {
    session: &'a dyn GraphSession,
    options: &'a HarvestOptions,
}

impl<'a> EntityHarvester<'a> {
    pub fn new(session: &'a dyn GraphSession, options: &'a HarvestOptions) -> Self {
        Self { session, options }
    }

    /// Harvest one post: scalars, share count, comments, likes.
    pub async fn post(&self, id: &str) -> Result<Post, GraphError> {
        let value = self.session.get(id, &[("fields", POST_FIELDS)]).await?;
        let fields: PostFields = decode(id, value)?;
        // The nested shares summary is optional; absence means zero.
        let share_count = fields.shares.map_or(0, |s| s.count);
        let (comments, comment_count) = self.comments(id).await?;
        let (likes, like_count) = self.likes(id).await?;
        Ok(Post {
            id: fields.id,
            created_time: fields.created_time,
            updated_time: fields.updated_time,
            message: fields.message,
            kind: fields.kind,
            permalink_url: fields.permalink_url,
            link: fields.link,
            caption: fields.name,
            share_count,
            like_count,
            likes,
            comment_count,
            comments,
        })
    }

    /// Harvest one photo. The album name comes from the top-level photo
    /// listing; the per-photo fetch does not return it.
    pub async fn photo(&self, id: &str, album_name: &str) -> Result<Photo, GraphError> {
        let value = self.session.get(id, &[("fields", PHOTO_FIELDS)]).await?;
        let fields: PhotoFields = decode(id, value)?;
        let (comments, comment_count) = self.comments(id).await?;
        let (likes, like_count) = self.likes(id).await?;
        Ok(Photo {
            id: fields.id,
            album_name: album_name.to_string(),
            created_time: fields.created_time,
            link: fields.link,
            caption: fields.name,
            like_count,
            likes,
            comment_count,
            comments,
        })
    }

    /// Full comment tree when requested, otherwise just the edge count.
    /// The single-entity fetch doesn't inline comments, so the full path
    /// goes straight to the paginated thread fetch.
    async fn comments(&self, id: &str) -> Result<(Option<Vec<Comment>>, u64), GraphError> {
        if self.options.full_comments {
            let (thread, count) = comments::fetch_thread(self.session, id).await?;
            tracing::debug!(
                "{}: {} comments in thread",
                id,
                crate::harvest::model::thread_size(&thread)
            );
            Ok((some_if_nonempty(thread), count))
        } else {
            Ok((None, self.edge_count(id, "comments").await?))
        }
    }

    /// Full like listing (drained across pages) when requested, otherwise
    /// just the edge count. The summary count rides on the same response as
    /// the first page of likers.
    async fn likes(&self, id: &str) -> Result<(Option<Vec<Like>>, u64), GraphError> {
        if !self.options.full_likes {
            return Ok((None, self.edge_count(id, "likes").await?));
        }
        let path = format!("{id}/likes");
        let params = [("fields", LIKE_FIELDS), ("summary", "1"), ("limit", "100")];
        let (records, summary) = page::drain(self.session, &path, &params).await?;
        let count = summary_total(summary.as_ref());
        let likes = records
            .into_iter()
            .map(|r| decode::<Like>(&path, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((some_if_nonempty(likes), count))
    }

    async fn edge_count(&self, id: &str, edge: &str) -> Result<u64, GraphError> {
        let path = format!("{id}/{edge}");
        let value = self
            .session
            .get(&path, &[("summary", "1"), ("limit", "1")])
            .await?;
        Ok(summary_total(value.get("summary")))
    }
}

/// Empty collections are omitted from the record entirely.
fn some_if_nonempty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::graph::testing::ScriptedSession;

    fn counts_only() -> HarvestOptions {
        HarvestOptions {
            full_comments: false,
            full_likes: false,
        }
    }

    fn post_fields(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "created_time": "2018-01-02T03:04:05+0000",
            "updated_time": "2018-01-03T03:04:05+0000",
            "message": "a post",
            "type": "photo",
            "permalink_url": "https://example.com/p",
            "link": "https://example.com/l",
            "name": "caption",
            "shares": {"count": 5},
        })
    }

    #[tokio::test]
    async fn test_post_counts_only() {
        let session = ScriptedSession::new()
            .with("100_1", post_fields("100_1"))
            .with("100_1/comments", json!({"data": [], "summary": {"total_count": 7}}))
            .with("100_1/likes", json!({"data": [], "summary": {"total_count": 9}}));
        let options = counts_only();
        let post = EntityHarvester::new(&session, &options)
            .post("100_1")
            .await
            .unwrap();
        assert_eq!(post.share_count, 5);
        assert_eq!(post.comment_count, 7);
        assert_eq!(post.like_count, 9);
        assert!(post.comments.is_none());
        assert!(post.likes.is_none());
        assert_eq!(post.caption, "caption");
        assert_eq!(post.kind, "photo");
    }

    #[tokio::test]
    async fn test_absent_shares_summary_is_zero() {
        let mut fields = post_fields("100_2");
        fields.as_object_mut().unwrap().remove("shares");
        let session = ScriptedSession::new()
            .with("100_2", fields)
            .with("100_2/comments", json!({"data": [], "summary": {"total_count": 0}}))
            .with("100_2/likes", json!({"data": [], "summary": {"total_count": 0}}));
        let options = counts_only();
        let post = EntityHarvester::new(&session, &options)
            .post("100_2")
            .await
            .unwrap();
        assert_eq!(post.share_count, 0);
    }

    #[tokio::test]
    async fn test_full_likes_drains_every_page() {
        let session = ScriptedSession::new()
            .with("100_1", post_fields("100_1"))
            .with("100_1/comments", json!({"data": [], "summary": {"total_count": 0}}))
            .with(
                "100_1/likes",
                json!({
                    "data": [{"id": "u1", "name": "A"}],
                    "summary": {"total_count": 2},
                    "paging": {"next": "likes:2"},
                }),
            )
            .with("likes:2", json!({"data": [{"id": "u2", "name": "B"}]}));
        let options = HarvestOptions {
            full_comments: false,
            full_likes: true,
        };
        let post = EntityHarvester::new(&session, &options)
            .post("100_1")
            .await
            .unwrap();
        assert_eq!(post.like_count, 2);
        let likes = post.likes.unwrap();
        assert_eq!(likes.len(), 2);
        assert_eq!(likes[1].display_name, "B");
    }

    #[tokio::test]
    async fn test_full_comments_builds_thread() {
        let session = ScriptedSession::new()
            .with("100_1", post_fields("100_1"))
            .with(
                "100_1/comments",
                json!({
                    "data": [{
                        "id": "c1",
                        "created_time": "2018-01-02T03:04:05+0000",
                        "from": {"id": "9", "name": "Someone"},
                        "message": "nice",
                        "like_count": 0,
                    }],
                    "summary": {"total_count": 1},
                }),
            )
            .with("100_1/likes", json!({"data": [], "summary": {"total_count": 0}}));
        let options = HarvestOptions {
            full_comments: true,
            full_likes: false,
        };
        let post = EntityHarvester::new(&session, &options)
            .post("100_1")
            .await
            .unwrap();
        assert_eq!(post.comment_count, 1);
        let thread = post.comments.unwrap();
        assert_eq!(thread[0].message, "nice");
        assert_eq!(thread[0].like_count, None);
    }

    #[tokio::test]
    async fn test_photo_album_comes_from_caller() {
        let session = ScriptedSession::new()
            .with(
                "200_7",
                json!({
                    "id": "200_7",
                    "created_time": "2019-05-06T07:08:09+0000",
                    "link": "https://example.com/photo",
                    "name": "at the beach",
                }),
            )
            .with("200_7/comments", json!({"data": [], "summary": {"total_count": 0}}))
            .with("200_7/likes", json!({"data": [], "summary": {"total_count": 3}}));
        let options = counts_only();
        let photo = EntityHarvester::new(&session, &options)
            .photo("200_7", "Holidays")
            .await
            .unwrap();
        assert_eq!(photo.album_name, "Holidays");
        assert_eq!(photo.like_count, 3);
        assert_eq!(photo.caption, "at the beach");
    }

    #[tokio::test]
    async fn test_sub_fetch_failure_fails_whole_entity() {
        // Likes edge unscripted: the entity must not come back partially.
        let session = ScriptedSession::new()
            .with("100_1", post_fields("100_1"))
            .with("100_1/comments", json!({"data": [], "summary": {"total_count": 0}}));
        let options = counts_only();
        assert!(EntityHarvester::new(&session, &options)
            .post("100_1")
            .await
            .is_err());
    }
}

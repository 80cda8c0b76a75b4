//! Harvest orchestration.
//!
//! Drives the three top-level listings (posts, photos, videos) through the
//! paginated fetcher, persists each as a line-oriented index file, then
//! walks the persisted post and photo indices invoking the entity harvester
//! and writing one pretty-printed JSON record per entity. Every run
//! re-harvests from scratch; no cursors are persisted.

pub mod comments;
pub mod entity;
pub mod model;

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::graph::page;
use crate::graph::{decode, GraphError, GraphSession};
use self::entity::EntityHarvester;
use self::model::{ListedPhoto, ListedPost, ListedVideo};

const POST_IDS_FILE: &str = "post_ids.txt";
const VIDEOS_FILE: &str = "videos.txt";
const VIDEOS_URLS_FILE: &str = "videos_urls.txt";
const PHOTOS_FILE: &str = "photos.txt";
const PHOTOS_URLS_FILE: &str = "photos_urls.txt";

/// Run a full harvest for `user` according to the configured toggles.
pub async fn run(session: &dyn GraphSession, user: &str, config: &Config) -> anyhow::Result<()> {
    if config.print_id {
        println!("{}", user_id(session, user).await?);
    }
    if config.videos {
        info!("writing videos list");
        write_videos(session, user, config).await?;
    }
    if config.photos {
        info!("writing photos list");
        write_photo_list(session, user, config).await?;
        info!("writing photo records");
        write_photo_records(session, config).await?;
    }
    if config.feed {
        info!("writing post ids");
        write_post_ids(session, user, config).await?;
        info!("writing post records");
        write_post_records(session, config).await?;
    }
    Ok(())
}

#[derive(serde::Deserialize)]
struct IdOnly {
    id: String,
}

/// Look up the numeric id behind a user name.
pub async fn user_id(session: &dyn GraphSession, user: &str) -> Result<String, GraphError> {
    let value = session.get(user, &[("fields", "id")]).await?;
    let body: IdOnly = decode(user, value)?;
    Ok(body.id)
}

/// Posts listing: one `id<space>YYYY-MM-DD` line per post.
async fn write_post_ids(
    session: &dyn GraphSession,
    user: &str,
    config: &Config,
) -> anyhow::Result<()> {
    let path = format!("{user}/feed");
    let (records, _) = page::drain(session, &path, &[("fields", "id,created_time")]).await?;
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        let post: ListedPost = decode(&path, record)?;
        let date = created_date(&path, &post.created_time)?;
        lines.push(format!("{} {}", post.id, date));
    }
    info!("{} posts listed", lines.len());
    save(&config.data_dir.join(POST_IDS_FILE), &lines)
}

/// Videos listing: `id<space>permalink` lines plus a derived URL-only file
/// feeding an external downloader.
async fn write_videos(
    session: &dyn GraphSession,
    user: &str,
    config: &Config,
) -> anyhow::Result<()> {
    let path = format!("{user}/videos");
    let params = [("fields", "id,permalink_url"), ("limit", "100")];
    let (records, _) = page::drain(session, &path, &params).await?;
    let mut lines = Vec::with_capacity(records.len());
    let mut urls = Vec::with_capacity(records.len());
    for record in records {
        let video: ListedVideo = decode(&path, record)?;
        lines.push(format!("{} {}", video.id, video.permalink_url));
        urls.push(video.permalink_url);
    }
    info!("{} videos listed", lines.len());
    save(&config.data_dir.join(VIDEOS_FILE), &lines)?;
    save(&config.data_dir.join(VIDEOS_URLS_FILE), &urls)
}

/// Photos listing: `image-url<space>id<space>permalink<space>album` lines
/// plus a derived image-URL-only file. The album name goes last because it
/// may contain spaces.
async fn write_photo_list(
    session: &dyn GraphSession,
    user: &str,
    config: &Config,
) -> anyhow::Result<()> {
    let path = format!("{user}/photos");
    let params = [
        ("fields", "id,album{name},link,images"),
        ("type", "uploaded"),
        ("limit", "100"),
    ];
    let (records, _) = page::drain(session, &path, &params).await?;
    let mut lines = Vec::with_capacity(records.len());
    let mut urls = Vec::with_capacity(records.len());
    for record in records {
        let photo: ListedPhoto = decode(&path, record)?;
        let image = photo
            .images
            .first()
            .with_context(|| format!("photo {} has no image sources", photo.id))?;
        lines.push(format!(
            "{} {} {} {}",
            image.source, photo.id, photo.link, photo.album.name
        ));
        urls.push(image.source.clone());
    }
    info!("{} photos listed", lines.len());
    save(&config.data_dir.join(PHOTOS_FILE), &lines)?;
    save(&config.data_dir.join(PHOTOS_URLS_FILE), &urls)
}

/// Read the post index back and harvest one record per post.
async fn write_post_records(session: &dyn GraphSession, config: &Config) -> anyhow::Result<()> {
    let rows = load(&config.data_dir.join(POST_IDS_FILE), 2)?;
    let dir = config.data_dir.join("posts");
    fs::create_dir_all(&dir)?;
    let harvester = EntityHarvester::new(session, &config.harvest);
    for (i, row) in rows.iter().enumerate() {
        let (id, date) = (&row[0], &row[1]);
        info!("post {}/{}: {}", i + 1, rows.len(), date);
        let post = harvester.post(id).await?;
        write_record(&dir, date, id, &post)?;
    }
    Ok(())
}

/// Read the photo index back and harvest one record per photo, feeding the
/// album column through to the record.
async fn write_photo_records(session: &dyn GraphSession, config: &Config) -> anyhow::Result<()> {
    let rows = load(&config.data_dir.join(PHOTOS_FILE), 4)?;
    let dir = config.data_dir.join("photos");
    fs::create_dir_all(&dir)?;
    let harvester = EntityHarvester::new(session, &config.harvest);
    for (i, row) in rows.iter().enumerate() {
        let (id, album) = (&row[1], &row[3]);
        info!("photo {}/{}: {}", i + 1, rows.len(), id);
        let photo = harvester.photo(id, album).await?;
        let date = created_date(id, &photo.created_time)?.to_string();
        write_record(&dir, &date, id, &photo)?;
    }
    Ok(())
}

fn write_record<T: Serialize>(dir: &Path, date: &str, id: &str, record: &T) -> anyhow::Result<()> {
    let path = dir.join(format!("{date}_{id}.json"));
    let body = serde_json::to_vec_pretty(record)?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))
}

/// Validate and return the `YYYY-MM-DD` prefix of a remote timestamp before
/// it lands in a filename.
fn created_date<'a>(resource: &str, created_time: &'a str) -> Result<&'a str, GraphError> {
    let bad = || GraphError::BadTimestamp {
        resource: resource.to_string(),
        value: created_time.to_string(),
    };
    let prefix = created_time.get(..10).ok_or_else(bad)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").map_err(|_| bad())?;
    Ok(prefix)
}

fn save(path: &Path, lines: &[String]) -> anyhow::Result<()> {
    fs::write(path, lines.join("\n")).with_context(|| format!("writing {}", path.display()))
}

/// Load a line-oriented index file, splitting each line into `columns`
/// space-separated fields; only the final column may contain spaces.
fn load(path: &Path, columns: usize) -> anyhow::Result<Vec<Vec<String>>> {
    let body =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, line) in body.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let row: Vec<String> = line.splitn(columns, ' ').map(str::to_string).collect();
        if row.len() < columns {
            anyhow::bail!("malformed line {} in {}: {line:?}", i + 1, path.display());
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::config::HarvestOptions;
    use crate::graph::testing::ScriptedSession;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            user: Some("someone".to_string()),
            app_id: None,
            app_secret: None,
            redirect_uri: None,
            data_dir: dir.path().to_path_buf(),
            harvest: HarvestOptions {
                full_comments: false,
                full_likes: false,
            },
            print_id: false,
            feed: true,
            videos: true,
            photos: true,
            pack_posts: false,
            pack_photos: false,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photos.txt");
        let lines = vec![
            "http://x/a_1_b.jpg 100_1 http://fb/1 My Album".to_string(),
            "http://x/a_2_b.jpg 100_2 http://fb/2 Other".to_string(),
        ];
        save(&path, &lines).unwrap();
        let rows = load(&path, 4).unwrap();
        assert_eq!(rows.len(), 2);
        // The album column keeps its internal spaces.
        assert_eq!(rows[0][3], "My Album");
        assert_eq!(rows[1][1], "100_2");
    }

    #[test]
    fn test_load_malformed_line_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post_ids.txt");
        fs::write(&path, "only-one-column").unwrap();
        assert!(load(&path, 2).is_err());
    }

    #[test]
    fn test_created_date_validates_prefix() {
        assert_eq!(
            created_date("x", "2018-01-02T03:04:05+0000").unwrap(),
            "2018-01-02"
        );
        assert!(created_date("x", "2018").is_err());
        assert!(created_date("x", "not-a-date-at-all").is_err());
    }

    #[tokio::test]
    async fn test_write_post_ids_line_format() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let session = ScriptedSession::new().with(
            "someone/feed",
            json!({"data": [
                {"id": "100_1", "created_time": "2018-01-02T03:04:05+0000"},
                {"id": "100_2", "created_time": "2019-11-12T03:04:05+0000"},
            ]}),
        );
        write_post_ids(&session, "someone", &config).await.unwrap();
        let body = fs::read_to_string(dir.path().join(POST_IDS_FILE)).unwrap();
        assert_eq!(body, "100_1 2018-01-02\n100_2 2019-11-12");
    }

    #[tokio::test]
    async fn test_write_videos_and_derived_urls() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let session = ScriptedSession::new().with(
            "someone/videos",
            json!({"data": [
                {"id": "v1", "permalink_url": "http://fb/v1"},
                {"id": "v2", "permalink_url": "http://fb/v2"},
            ]}),
        );
        write_videos(&session, "someone", &config).await.unwrap();
        let body = fs::read_to_string(dir.path().join(VIDEOS_FILE)).unwrap();
        assert_eq!(body, "v1 http://fb/v1\nv2 http://fb/v2");
        let urls = fs::read_to_string(dir.path().join(VIDEOS_URLS_FILE)).unwrap();
        assert_eq!(urls, "http://fb/v1\nhttp://fb/v2");
    }

    #[tokio::test]
    async fn test_write_post_records_names_files_by_date_and_id() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        fs::write(dir.path().join(POST_IDS_FILE), "100_1 2018-01-02").unwrap();
        let session = ScriptedSession::new()
            .with(
                "100_1",
                json!({
                    "id": "100_1",
                    "created_time": "2018-01-02T03:04:05+0000",
                    "updated_time": "2018-01-02T03:04:05+0000",
                    "type": "status",
                }),
            )
            .with("100_1/comments", json!({"data": [], "summary": {"total_count": 2}}))
            .with("100_1/likes", json!({"data": [], "summary": {"total_count": 4}}));
        write_post_records(&session, &config).await.unwrap();

        let body = fs::read_to_string(dir.path().join("posts/2018-01-02_100_1.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["comment_count"], 2);
        assert_eq!(value["like_count"], 4);
        assert!(value.get("comments").is_none());
    }

    #[tokio::test]
    async fn test_user_id_lookup() {
        let session = ScriptedSession::new().with("someone", json!({"id": "1234"}));
        assert_eq!(user_id(&session, "someone").await.unwrap(), "1234");
    }
}

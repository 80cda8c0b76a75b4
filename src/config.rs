use std::path::PathBuf;

use crate::cli::Cli;

/// What the entity harvester fetches in full versus as summary counts.
#[derive(Debug, Clone, Copy)]
pub struct HarvestOptions {
    /// Resolve full recursive comment threads instead of counts only.
    pub full_comments: bool,
    /// Drain full like listings instead of counts only.
    pub full_likes: bool,
}

/// Application configuration, built once from the CLI and passed by
/// reference into every component that needs it. Nothing reads ambient
/// global state after startup.
pub struct Config {
    pub user: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub data_dir: PathBuf,
    pub harvest: HarvestOptions,
    pub print_id: bool,
    pub feed: bool,
    pub videos: bool,
    pub photos: bool,
    pub pack_posts: bool,
    pub pack_photos: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("app_id", &self.app_id)
            .field(
                "app_secret",
                &self.app_secret.as_deref().map(|_| "<redacted>"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field("data_dir", &self.data_dir)
            .field("harvest", &self.harvest)
            .field("feed", &self.feed)
            .field("videos", &self.videos)
            .field("photos", &self.photos)
            .field("pack_posts", &self.pack_posts)
            .field("pack_photos", &self.pack_photos)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            user: cli.user,
            app_id: cli.app_id,
            app_secret: cli.app_secret,
            redirect_uri: cli.redirect_uri,
            data_dir: PathBuf::from(cli.data),
            harvest: HarvestOptions {
                full_comments: !cli.skip_comments,
                full_likes: cli.likes,
            },
            print_id: cli.print_id,
            feed: !cli.skip_feed,
            videos: !cli.skip_videos,
            photos: !cli.skip_photos,
            pack_posts: cli.pack_posts,
            pack_photos: cli.pack_photos,
        }
    }

    /// Pack flags short-circuit harvesting entirely.
    pub fn pack_only(&self) -> bool {
        self.pack_posts || self.pack_photos
    }
}

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fbarc",
    about = "Harvest a Facebook user's public activity and pack media archives"
)]
pub struct Cli {
    /// Facebook user name or id to harvest, e.g. `fbarc richardlehane`
    pub user: Option<String>,

    /// Print the user's numeric id
    #[arg(short = 'i', long)]
    pub print_id: bool,

    /// Don't harvest the feed (post ids and post records)
    #[arg(long)]
    pub skip_feed: bool,

    /// Only record comment counts, skipping full comment threads
    #[arg(long)]
    pub skip_comments: bool,

    /// Capture the full list of users that liked each entity
    #[arg(short = 'l', long)]
    pub likes: bool,

    /// Don't harvest the video listing
    #[arg(long)]
    pub skip_videos: bool,

    /// Don't harvest the photo listing and photo records
    #[arg(long)]
    pub skip_photos: bool,

    /// Pack harvested posts into archive folders (skips harvesting)
    #[arg(long)]
    pub pack_posts: bool,

    /// Pack harvested photos into archive folders (skips harvesting)
    #[arg(long)]
    pub pack_photos: bool,

    /// Location of harvested data
    #[arg(long, default_value = ".")]
    pub data: String,

    /// Graph API app id
    #[arg(long, env = "FB_APP_ID")]
    pub app_id: Option<String>,

    /// Graph API app secret.
    /// WARNING: passing via --app-secret is visible in process listings.
    /// Prefer the FB_APP_SECRET environment variable instead.
    #[arg(long, env = "FB_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    /// OAuth redirect URI registered with the app
    #[arg(long, env = "FB_REDIRECT")]
    pub redirect_uri: Option<String>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

//! Media reconciliation and archive packing.
//!
//! Matches independently-downloaded media files against previously-harvested
//! JSON records and assembles one archive directory per entity under `out/`.
//! Matching is by simple identifier first, then by outbound link for photos.
//! Records whose media never turns up and media never referenced by any
//! record are diagnostics reported at the end of a successful run, not
//! errors; a copy failure, by contrast, aborts the whole pass.

pub mod error;
pub mod index;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;
use walkdir::WalkDir;

use crate::config::Config;
use self::error::PackError;
use self::index::MediaIndex;

const RUN_LOG_FILE: &str = "run.log";

/// Outcome of a pack run. Suspicious records and orphaned media are
/// diagnostics for the operator, not failures.
#[derive(Debug, Default)]
pub struct PackReport {
    /// Number of records packed into archive directories.
    pub records: usize,
    /// Number of file copies performed.
    pub copies: usize,
    /// Records that looked like they should have had media but matched none.
    pub suspicious: Vec<String>,
    /// Indexed media files never referenced by any record, each once.
    pub orphans: Vec<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Post,
    Photo,
}

/// The JSON record fields reconciliation needs; the rest of the record is
/// copied verbatim, never re-fetched.
#[derive(Deserialize)]
struct ArchivedRecord {
    id: String,
    created_time: String,
    #[serde(default)]
    link: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// The trailing segment after the last underscore of a compound remote id,
/// used as the archive folder key.
fn simple_id(id: &str) -> &str {
    id.rsplit('_').next().unwrap_or(id)
}

/// Run a pack pass over the configured data directory.
pub fn run(config: &Config) -> Result<PackReport, PackError> {
    let data = &config.data_dir;
    let photos_media = data.join("media").join("photos");
    let videos_media = data.join("media").join("videos");

    let mut photos = MediaIndex::build(&photos_media, index::photo_id)?;
    let photos_index = data.join("photos.txt");
    if photos_index.is_file() {
        photos.add_permalinks(&photos_index, &photos_media)?;
    }
    let videos = MediaIndex::build(&videos_media, index::video_id)?;

    // Truncates any previous run's log.
    let log = BufWriter::new(File::create(data.join(RUN_LOG_FILE))?);

    let mut packer = Packer {
        photos,
        videos,
        out_root: data.join("out"),
        log,
        linked: HashSet::new(),
        report: PackReport::default(),
    };

    if config.pack_posts {
        info!("packing posts");
        packer.walk_records(&data.join("posts"), RecordKind::Post)?;
    }
    if config.pack_photos {
        info!("packing photos");
        packer.walk_records(&data.join("photos"), RecordKind::Photo)?;
    }
    packer.finish()
}

struct Packer {
    photos: MediaIndex,
    videos: MediaIndex,
    out_root: PathBuf,
    log: BufWriter<File>,
    linked: HashSet<PathBuf>,
    report: PackReport,
}

impl Packer {
    fn walk_records(&mut self, dir: &Path, kind: RecordKind) -> Result<(), PackError> {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if entry.path().extension().map_or(true, |e| e != "json") {
                continue;
            }
            self.pack_record(entry.path(), kind)?;
        }
        Ok(())
    }

    fn pack_record(&mut self, path: &Path, kind: RecordKind) -> Result<(), PackError> {
        let body = fs::read(path)?;
        let record: ArchivedRecord =
            serde_json::from_slice(&body).map_err(|source| PackError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let sid = simple_id(&record.id);
        let date = record
            .created_time
            .get(..10)
            .ok_or_else(|| PackError::BadTimestamp {
                path: path.to_path_buf(),
                value: record.created_time.clone(),
            })?;
        let target = self.out_root.join(format!("{date}_{sid}"));

        let mut matched = false;

        // Photos match by simple id, falling back to the outbound link,
        // which the permalink ingestion keyed into the same index.
        let photo = self
            .photos
            .get(sid)
            .or_else(|| match record.link.as_str() {
                "" => None,
                link => self.photos.get(link),
            })
            .map(Path::to_path_buf);
        if let Some(source) = photo {
            self.copy_into(&source, &target)?;
            self.linked.insert(source);
            matched = true;
        }

        if let Some(video) = self.videos.get(sid).map(Path::to_path_buf) {
            self.copy_into(&video, &target)?;
            self.linked.insert(video);
            matched = true;
        }

        if !matched && self.looks_media_backed(&record, kind) {
            self.report
                .suspicious
                .push(format!("{} ({})", record.id, path.display()));
        }

        self.copy_into(path, &target)?;
        self.report.records += 1;
        Ok(())
    }

    /// A post typed `link` or `status` legitimately has no media; anything
    /// else, and every photo record, should have matched something.
    fn looks_media_backed(&self, record: &ArchivedRecord, kind: RecordKind) -> bool {
        match kind {
            RecordKind::Photo => true,
            RecordKind::Post => !matches!(record.kind.as_deref(), Some("link") | Some("status")),
        }
    }

    fn copy_into(&mut self, source: &Path, target_dir: &Path) -> Result<(), PackError> {
        fs::create_dir_all(target_dir)?;
        let name = source.file_name().unwrap_or(source.as_os_str());
        let dest = target_dir.join(name);
        fs::copy(source, &dest)?;
        writeln!(self.log, "copy {} -> {}", source.display(), dest.display())?;
        self.report.copies += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<PackReport, PackError> {
        self.log.flush()?;
        let mut orphans: Vec<PathBuf> = self
            .photos
            .paths()
            .chain(self.videos.paths())
            .filter(|p| !self.linked.contains(*p))
            .map(Path::to_path_buf)
            .collect();
        orphans.sort();
        orphans.dedup();
        self.report.orphans = orphans;
        Ok(self.report)
    }
}

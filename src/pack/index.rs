//! Media file indexing.
//!
//! Walks a media directory and maps a heuristically-extracted identifier to
//! each file's path. The heuristics mirror how the downloaders name files:
//! videos carry their id after the last hyphen of the stem, photos as the
//! second underscore-delimited segment of the name. Files yielding an empty
//! identifier are skipped; two files yielding the same identifier are a
//! fatal conflict.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::error::PackError;

pub(crate) type PathToId = for<'a> fn(&'a str) -> &'a str;

fn basename(s: &str) -> &str {
    s.rsplit(['/', '\\']).next().unwrap_or(s)
}

/// `clip-12345.mp4` -> `12345`. A name without an interior hyphen yields an
/// empty id and is skipped.
pub(crate) fn video_id(path: &str) -> &str {
    let base = basename(path);
    let stem = match base.rfind('.') {
        Some(dot) => &base[..dot],
        None => base,
    };
    match stem.rfind('-') {
        Some(sep) if sep > 0 => &stem[sep + 1..],
        _ => "",
    }
}

/// `2020-01-01_98765_x.jpg` -> `98765`. Fewer than two underscore-delimited
/// segments yields an empty id. Also applied to image URLs, which follow the
/// same naming convention in their final path segment.
pub(crate) fn photo_id(path: &str) -> &str {
    basename(path).split('_').nth(1).unwrap_or("")
}

/// Identifier -> file path index for one media directory tree.
#[derive(Debug, Default)]
pub struct MediaIndex {
    paths: HashMap<String, PathBuf>,
}

impl MediaIndex {
    /// Index every file under `root`. A missing root yields an empty index
    /// (the media for that kind simply wasn't downloaded).
    pub fn build(root: &Path, id_of: PathToId) -> Result<Self, PackError> {
        let mut paths = HashMap::new();
        if !root.is_dir() {
            debug!("no media directory at {}", root.display());
            return Ok(Self { paths });
        }
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path_str = entry.path().to_string_lossy();
            let id = id_of(&path_str);
            if id.is_empty() {
                continue;
            }
            match paths.entry(id.to_string()) {
                Entry::Occupied(existing) => {
                    return Err(PackError::DuplicateId {
                        id: id.to_string(),
                        first: existing.get().clone(),
                        second: entry.path().to_path_buf(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.path().to_path_buf());
                }
            }
        }
        Ok(Self { paths })
    }

    /// Ingest a photos index file, keying each listed permalink to the local
    /// path already indexed under the image URL's photo id, or to a
    /// synthesized path under `media_dir` using the URL's basename when no
    /// local file matched.
    pub fn add_permalinks(&mut self, index_file: &Path, media_dir: &Path) -> Result<(), PackError> {
        let body = std::fs::read_to_string(index_file)?;
        for (i, line) in body.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.splitn(4, ' ').collect();
            if cols.len() < 4 {
                return Err(PackError::MalformedIndex {
                    path: index_file.to_path_buf(),
                    line: i + 1,
                });
            }
            let (url, permalink) = (cols[0], cols[2]);
            let path = match self.paths.get(photo_id(url)) {
                Some(found) => found.clone(),
                None => media_dir.join(basename(url)),
            };
            self.paths.insert(permalink.to_string(), path);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.paths.get(key).map(PathBuf::as_path)
    }

    /// Every indexed path. Paths may appear under several keys (id and
    /// permalink), so callers dedupe.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.values().map(PathBuf::as_path)
    }
}

//! Episode cache for favorite series.
//!
//! Listing favorite series writes every episode of every series into one JSON
//! document; opening a series later reads that document back and scans it by
//! series title. The document is replaced wholesale on each write, through a
//! temp file in the same directory so readers never see a partial file.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::{FavoriteSeries, PlaylistItem};
use crate::errors::{PluginError, Result};

/// Cache version. Bump when CachedEpisode changes shape.
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedEpisode {
    /// Title of the series the episode belongs to
    pub title: String,
    pub episode: PlaylistItem,
}

#[derive(Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    written_at: i64, // Unix timestamp (seconds)
    episodes: Vec<CachedEpisode>,
}

pub fn flatten_series(series: &[FavoriteSeries]) -> Vec<CachedEpisode> {
    series
        .iter()
        .flat_map(|s| {
            s.items.iter().map(move |item| CachedEpisode {
                title: s.title.clone(),
                episode: item.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct EpisodeCache {
    path: PathBuf,
}

impl EpisodeCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the cache with the episodes of `series`. Returns the episode count.
    pub fn write(&self, series: &[FavoriteSeries]) -> Result<usize> {
        let episodes = flatten_series(series);
        let count = episodes.len();
        let doc = CacheDocument {
            version: CACHE_VERSION,
            written_at: chrono::Utc::now().timestamp(),
            episodes,
        };
        let encoded = serde_json::to_vec(&doc)?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&encoded)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| PluginError::Cache(e.error.to_string()))?;

        debug!(path = %self.path.display(), episodes = count, "episode cache written");
        Ok(count)
    }

    pub fn load(&self) -> Result<Vec<CachedEpisode>> {
        if !self.path.exists() {
            return Err(PluginError::NotFound(
                "episode cache; list favorite series first".to_string(),
            ));
        }
        let data = std::fs::read(&self.path)?;
        let doc: CacheDocument = serde_json::from_slice(&data)
            .map_err(|e| PluginError::Cache(format!("corrupt cache: {}", e)))?;
        if doc.version != CACHE_VERSION {
            return Err(PluginError::Cache(format!(
                "cache version {} is outdated",
                doc.version
            )));
        }
        Ok(doc.episodes)
    }

    /// Episodes whose series title equals `title` exactly.
    ///
    /// Titles are not unique: two favorite series sharing a title both match.
    pub fn list_serie(&self, title: &str) -> Result<Vec<CachedEpisode>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|e| e.title == title)
            .collect())
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::Track;

/// Cap on remembered tracks.
pub const MAX_RECENT: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentEntry {
    pub track: Track,
    /// Unix timestamp of the most recent play.
    pub played_at: i64,
}

/// Recently played tracks, most recent first, deduplicated by id.
/// Persisted write-through as one JSON file; a missing or unreadable
/// file just means an empty history.
#[derive(Debug, Clone, Default)]
pub struct RecentList {
    entries: Vec<RecentEntry>,
    file: Option<PathBuf>,
}

impl RecentList {
    pub fn load(file: PathBuf) -> Self {
        let entries = Self::read_entries(&file);
        Self {
            entries,
            file: Some(file),
        }
    }

    fn read_entries(file: &Path) -> Vec<RecentEntry> {
        if let Ok(content) = std::fs::read_to_string(file) {
            if let Ok(entries) = serde_json::from_str::<Vec<RecentEntry>>(&content) {
                return entries;
            }
        }
        Vec::new()
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a play: same id moves to the front, the list stays capped.
    /// Persists immediately; the in-memory list stays authoritative when
    /// the write fails.
    pub fn record(&mut self, track: Track) {
        self.record_at(track, chrono::Utc::now().timestamp());
        self.save();
    }

    fn record_at(&mut self, track: Track, played_at: i64) {
        self.entries.retain(|e| e.track.id != track.id);
        self.entries.insert(0, RecentEntry { track, played_at });
        self.entries.truncate(MAX_RECENT);
    }

    fn save(&self) {
        let Some(file) = &self.file else {
            return;
        };
        if let Err(e) = self.write_entries(file) {
            warn!("Failed to save recent tracks to {}: {}", file.display(), e);
        }
    }

    fn write_entries(&self, file: &Path) -> anyhow::Result<()> {
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(file, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: id.to_uppercase(),
            file: format!("{}.mp3", id),
            genre: Genre::Sleeping,
        }
    }

    fn ids(list: &RecentList) -> Vec<&str> {
        list.entries().iter().map(|e| e.track.id.as_str()).collect()
    }

    #[test]
    fn test_repeat_moves_to_front_without_duplicate() {
        let mut list = RecentList::default();
        for id in ["a", "b", "c", "a"] {
            list.record_at(track(id), 0);
        }
        assert_eq!(ids(&list), ["a", "c", "b"]);
    }

    #[test]
    fn test_capped_at_max() {
        let mut list = RecentList::default();
        for i in 0..10 {
            list.record_at(track(&format!("t{}", i)), i);
        }
        assert_eq!(list.entries().len(), MAX_RECENT);
        assert_eq!(ids(&list), ["t9", "t8", "t7", "t6", "t5", "t4"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let list = RecentList::load(PathBuf::from("/nonexistent/recent.json"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = std::env::temp_dir().join("mellow-recent-test");
        let path = dir.join("recent.json");
        let _ = std::fs::remove_file(&path);

        let mut list = RecentList::load(path.clone());
        list.record(track("a"));
        list.record(track("b"));

        let reloaded = RecentList::load(path.clone());
        assert_eq!(ids(&reloaded), ["b", "a"]);
        let _ = std::fs::remove_file(&path);
    }
}

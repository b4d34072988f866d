use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::Config;

/// Track grouping. Playlists are keyed by genre and keep insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Sleeping,
    Focus,
}

impl Genre {
    pub const ALL: [Genre; 2] = [Genre::Sleeping, Genre::Focus];

    /// Human-facing playlist label.
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Sleeping => "Sleep Music",
            Genre::Focus => "Focus Music",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Media location, resolved against the configured music dir when relative.
    pub file: String,
    pub genre: Genre,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    #[serde(default)]
    track: Vec<Track>,
}

/// Immutable track catalog, grouped by genre in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sleeping: Vec<Track>,
    focus: Vec<Track>,
}

impl Catalog {
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut catalog = Catalog::default();
        for track in tracks {
            match track.genre {
                Genre::Sleeping => catalog.sleeping.push(track),
                Genre::Focus => catalog.focus.push(track),
            }
        }
        catalog
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: TomlCatalogFile = toml::from_str(content)?;
        Ok(Self::from_tracks(file.track))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Bundled catalog compiled into the binary, used when no user file exists.
    pub fn bundled() -> Self {
        Self::from_toml_str(include_str!("../assets/catalog.toml"))
            .unwrap_or_else(|_| Catalog::default())
    }

    pub fn tracks(&self, genre: Genre) -> &[Track] {
        match genre {
            Genre::Sleeping => &self.sleeping,
            Genre::Focus => &self.focus,
        }
    }

    pub fn len(&self, genre: Genre) -> usize {
        self.tracks(genre).len()
    }

    pub fn is_empty(&self, genre: Genre) -> bool {
        self.tracks(genre).is_empty()
    }

    pub fn total(&self) -> usize {
        self.sleeping.len() + self.focus.len()
    }

    pub fn find(&self, id: &str) -> Option<&Track> {
        Genre::ALL
            .iter()
            .flat_map(|g| self.tracks(*g))
            .find(|t| t.id == id)
    }

    /// Index of a track within its genre playlist.
    pub fn position(&self, genre: Genre, id: &str) -> Option<usize> {
        self.tracks(genre).iter().position(|t| t.id == id)
    }
}

/// Load the catalog with a priority chain: user config dir, beside the
/// executable, then the bundled default.
pub fn load_catalog(config: &Config) -> Catalog {
    let toml_path = &config.paths.catalog_toml;
    if toml_path.exists() {
        match Catalog::load_from_file(toml_path) {
            Ok(c) => {
                info!("Loaded {} tracks from {}", c.total(), toml_path.display());
                return c;
            }
            Err(e) => warn!("Failed to load {}: {}", toml_path.display(), e),
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let beside = dir.join("catalog.toml");
            if beside.exists() {
                match Catalog::load_from_file(&beside) {
                    Ok(c) => {
                        info!(
                            "Loaded {} tracks from beside-exe: {}",
                            c.total(),
                            beside.display()
                        );
                        return c;
                    }
                    Err(e) => warn!("Failed to load {}: {}", beside.display(), e),
                }
            }
        }
    }

    let catalog = Catalog::bundled();
    info!("Using bundled catalog ({} tracks)", catalog.total());
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_catalog() -> Catalog {
        Catalog::from_toml_str(
            r#"
[[track]]
id = "a"
name = "Alpha"
file = "a.mp3"
genre = "sleeping"

[[track]]
id = "b"
name = "Beta"
file = "b.mp3"
genre = "sleeping"

[[track]]
id = "c"
name = "Gamma"
file = "c.mp3"
genre = "focus"
"#,
        )
        .expect("parse")
    }

    #[test]
    fn test_groups_by_genre_in_file_order() {
        let catalog = toy_catalog();
        let ids: Vec<&str> = catalog
            .tracks(Genre::Sleeping)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(catalog.len(Genre::Focus), 1);
    }

    #[test]
    fn test_find_and_position() {
        let catalog = toy_catalog();
        assert_eq!(catalog.find("b").map(|t| t.name.as_str()), Some("Beta"));
        assert_eq!(catalog.position(Genre::Sleeping, "b"), Some(1));
        assert_eq!(catalog.position(Genre::Focus, "b"), None);
        assert!(catalog.find("zzz").is_none());
    }

    #[test]
    fn test_bundled_catalog() {
        let catalog = Catalog::bundled();
        assert_eq!(catalog.len(Genre::Sleeping), 10);
        assert!(catalog.is_empty(Genre::Focus));
        assert_eq!(
            catalog.find("sleep-1").map(|t| t.name.as_str()),
            Some("Afterthought")
        );
    }

    #[test]
    fn test_genre_labels() {
        assert_eq!(Genre::Sleeping.label(), "Sleep Music");
        assert_eq!(Genre::Focus.to_string(), "Focus Music");
    }
}

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("could not read feed types file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse feed types file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("feed types file {} has no 'all' field", path.display())]
    Empty { path: PathBuf },
}

/// Every valid feed type, and the ones whose items carry a score.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedTypes {
    pub all: Vec<String>,
    #[serde(default)]
    pub has_scores: Vec<String>,
}

impl FeedTypes {
    pub fn new(all: Vec<String>, has_scores: Vec<String>) -> Self {
        Self { all, has_scores }
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let types: FeedTypes =
            serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if types.all.is_empty() {
            return Err(CatalogError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(types)
    }

    pub fn contains(&self, feed_type: &str) -> bool {
        self.all.iter().any(|t| t == feed_type)
    }

    pub fn supports_score(&self, feed_type: &str) -> bool {
        self.has_scores.iter().any(|t| t == feed_type)
    }

    /// Feed types a score-ordered query should run over.
    ///
    /// `None` means no restriction (no score-capable types are configured).
    pub fn score_eligible(&self, requested: &[String]) -> Option<Vec<String>> {
        if self.has_scores.is_empty() {
            return None;
        }
        if requested.is_empty() {
            return Some(self.has_scores.clone());
        }
        Some(
            requested
                .iter()
                .filter(|t| self.supports_score(t))
                .cloned()
                .collect(),
        )
    }
}

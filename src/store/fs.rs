use log::info;
use std::fs;
use std::path::PathBuf;

use crate::domain::unsubscribe::ArtifactKey;
use crate::error::Result;
use crate::store::repo::ArtifactStore;

pub const DEFAULT_RESPONSE_DIR: &str = "unsubscribe_response";

/// Writes each response to `<root>/<sender>/<subject><index>.html`.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        self.root
            .join(sanitize_component(&key.sender))
            .join(format!("{}.html", sanitize_component(&key.name)))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, key: &ArtifactKey, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, bytes)?;
        info!("wrote response to {}", path.display());
        Ok(())
    }
}

/// Keeps a header value usable as a single path component.
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

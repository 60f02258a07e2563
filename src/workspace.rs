//! Project directory helpers.

use crate::error::{Result, RunnerError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories the preprocessing and training scripts write into.
pub const PROJECT_DIRS: [&str; 4] = ["data/raw", "data/processed", "models", "results"];

/// Create every project directory under `base`. Existing ones are left alone.
pub async fn ensure_all_dirs(base: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::with_capacity(PROJECT_DIRS.len());
    for rel in PROJECT_DIRS {
        let path = base.join(rel);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| RunnerError::CreateDir {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "ensured directory");
        created.push(path);
    }
    Ok(created)
}

/// Pick the project root: `explicit` or the current directory, canonicalized
/// when possible.
pub fn resolve_base_dir(explicit: Option<&Path>) -> PathBuf {
    let raw = match explicit {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|e| {
            warn!("cannot read current directory: {e}");
            PathBuf::from(".")
        }),
    };
    match raw.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            warn!(path = %raw.display(), "cannot resolve base directory: {e}");
            raw
        }
    }
}

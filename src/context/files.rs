//! Full file content loader for changed files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::models::FileContentMap;

/// Read every file in `paths`, relative to `repo_root`, concurrently.
///
/// The returned map has exactly one entry per distinct input path, in input
/// order. A file that cannot be read is still present: its value is an
/// `Error reading file: ...` placeholder so the reviewer knows it changed.
pub async fn read_all(repo_root: &Path, paths: &[String]) -> FileContentMap {
    let mut contents = FileContentMap::new();
    for path in paths {
        contents.insert(path.clone(), String::new());
    }

    let mut set = JoinSet::new();
    for path in contents.keys() {
        let rel = path.clone();
        let full: PathBuf = repo_root.join(path);
        set.spawn(async move {
            let text = match tokio::fs::read_to_string(&full).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("cannot read {}: {e}", full.display());
                    read_error(&e)
                }
            };
            (rel, text)
        });
    }

    let mut loaded = HashSet::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((path, text)) => {
                debug!("loaded {path} ({} bytes)", text.len());
                contents.insert(path.clone(), text);
                loaded.insert(path);
            }
            Err(e) => warn!("file read task failed: {e}"),
        }
    }

    // A task that died never reported back; keep the entry but say so.
    for (path, text) in contents.iter_mut() {
        if !loaded.contains(path) {
            *text = "Error reading file: read task did not complete".to_string();
        }
    }

    contents
}

fn read_error(err: &std::io::Error) -> String {
    format!("Error reading file: {err}")
}

//! Review file persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, error};

use crate::models::{NamingPolicy, Review};

/// Write `content` to `target`, creating missing parent directories.
///
/// The file is written to a temporary sibling and renamed into place, so
/// `target` either holds the full review or is left untouched. Returns
/// `false` (after logging) on any failure.
pub fn write_review(target: &Path, content: &str) -> bool {
    match write_atomically(target, content) {
        Ok(()) => {
            debug!("wrote {} bytes to {}", content.len(), target.display());
            true
        }
        Err(e) => {
            error!("failed to write review to {}: {e}", target.display());
            false
        }
    }
}

fn write_atomically(target: &Path, content: &str) -> std::io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "review".to_string());
    let tmp = dir.join(format!(".{file_name}.{}.tmp", std::process::id()));

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Longest title stem, in bytes. Leaves room for `.md` and the temporary
/// `.{name}.{pid}.tmp` sibling under the usual 255-byte name limit.
const MAX_STEM_BYTES: usize = 200;

/// File name for a review under the given naming policy.
///
/// Title naming replaces spaces and path separators with `_` and caps the
/// stem at [`MAX_STEM_BYTES`]. Reviews without a usable title get the
/// timestamp name instead.
pub fn review_file_name(policy: NamingPolicy, review: &Review, now: DateTime<Local>) -> String {
    if policy == NamingPolicy::Title {
        if let Some(stem) = review.title().and_then(title_stem) {
            return format!("{stem}.md");
        }
    }
    timestamp_name(now)
}

fn title_stem(title: &str) -> Option<String> {
    let mut stem = String::new();
    for c in title.trim().chars() {
        let c = match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        };
        if stem.len() + c.len_utf8() > MAX_STEM_BYTES {
            break;
        }
        stem.push(c);
    }

    let stem = stem.trim_end_matches(['_', '.']);
    // `.` and `..` are not file names, and `_` or dot runs say nothing.
    if stem.chars().all(|c| c == '.' || c == '_') {
        return None;
    }
    Some(stem.to_string())
}

/// `review_<YYYY-MM-DD>_<epoch-ms>.md`
pub fn timestamp_name(now: DateTime<Local>) -> String {
    format!(
        "review_{}_{}.md",
        now.format("%Y-%m-%d"),
        now.timestamp_millis()
    )
}

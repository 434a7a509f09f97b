//! File path extraction from unified diff text.
//!
//! Only the `diff --git` headers are read; hunks are never parsed.

use std::collections::HashSet;

use super::paths::is_valid_path;

/// Extract the changed file paths referenced by a unified diff.
///
/// Each `diff --git a/<old> b/<new>` header contributes its new path, so a
/// rename is listed once under its destination. Paths failing
/// [`is_valid_path`] are skipped and duplicates are dropped, keeping the
/// order in which files appear in the diff.
pub fn extract_paths(diff: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for line in diff.lines() {
        let Some(rest) = line.strip_prefix("diff --git ") else {
            continue;
        };
        let path = parse_header_paths(rest).1;
        if is_valid_path(&path) && seen.insert(path.clone()) {
            paths.push(path);
        }
    }

    paths
}

/// Split the remainder of a `diff --git` header into `(old, new)` paths.
fn parse_header_paths(rest: &str) -> (String, String) {
    // Paths with unusual characters are C-quoted: "a/x y" "b/x y"
    if let Some(quoted) = rest.strip_prefix('"') {
        if let Some((old, new)) = quoted.split_once("\" ") {
            let new = new.trim_matches('"');
            return (
                strip_diff_prefix(old).to_string(),
                strip_diff_prefix(new).to_string(),
            );
        }
    }

    // Renames can quote only one side: a/plain "b/caf\303\251"
    // Unquoted paths never contain `"`, so the first ` "` starts the new path.
    if rest.ends_with('"') {
        if let Some(idx) = rest.find(" \"") {
            let new = rest[idx + 2..].trim_end_matches('"');
            return (
                strip_diff_prefix(&rest[..idx]).to_string(),
                strip_diff_prefix(new).to_string(),
            );
        }
    }

    // Unrenamed files produce a symmetric header, which splits unambiguously
    // even when the path itself contains " b/".
    let mid = rest.len() / 2;
    if rest.len() % 2 == 1 && rest.is_char_boundary(mid) && rest.as_bytes()[mid] == b' ' {
        let (old, new) = (strip_diff_prefix(&rest[..mid]), strip_diff_prefix(&rest[mid + 1..]));
        if old == new {
            return (old.to_string(), new.to_string());
        }
    }

    match find_second_prefix(rest) {
        Some(b_idx) => (
            strip_diff_prefix(&rest[..b_idx]).to_string(),
            strip_diff_prefix(&rest[b_idx + 1..]).to_string(),
        ),
        None => {
            let (old, new) = rest.split_once(' ').unwrap_or((rest, rest));
            (
                strip_diff_prefix(old).to_string(),
                strip_diff_prefix(new).to_string(),
            )
        }
    }
}

/// Strip a single-character git diff prefix (`a/`, `b/`, or the
/// `diff.mnemonicPrefix` forms `c/`, `w/`, `i/`, `o/`).
fn strip_diff_prefix(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2
        && bytes[1] == b'/'
        && matches!(bytes[0], b'a' | b'b' | b'c' | b'w' | b'i' | b'o')
    {
        return &path[2..];
    }
    path
}

/// Position of the space before the destination path's prefix.
///
/// Scans for the last ` X/` so that source paths containing spaces stay
/// intact.
fn find_second_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (1..bytes.len().saturating_sub(2)).rev().find(|&i| {
        bytes[i] == b' '
            && bytes[i + 2] == b'/'
            && matches!(bytes[i + 1], b'b' | b'w' | b'i' | b'o' | b'c')
    })
}

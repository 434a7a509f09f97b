//! Candidate path filtering.

/// Version-control metadata directory, matched as a whole path component.
const VCS_DIR: &str = ".git";

/// OS-generated directory listing artifacts, matched by exact file name.
const OS_ARTIFACTS: [&str; 2] = [".DS_Store", "Thumbs.db"];

/// Whether `candidate` names a reviewable file.
///
/// Rejects blank input, anything inside a `.git` directory, and OS
/// artifact files at any depth. Both `/` and `\` separate components.
pub fn is_valid_path(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return false;
    }

    let components: Vec<&str> = trimmed
        .split(['/', '\\'])
        .filter(|c| !c.is_empty())
        .collect();

    if components.contains(&VCS_DIR) {
        return false;
    }

    match components.last() {
        Some(name) => !OS_ARTIFACTS.contains(name),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_source_paths_are_valid() {
        assert!(is_valid_path("src/main.rs"));
        assert!(is_valid_path("README.md"));
        assert!(is_valid_path("  lib/util.js  "));
    }

    #[test]
    fn blank_paths_are_invalid() {
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("   "));
        assert!(!is_valid_path("\t\n"));
        assert!(!is_valid_path("/"));
    }

    #[test]
    fn git_metadata_paths_are_invalid() {
        for path in [
            ".git",
            ".git/config",
            "sub/.git/HEAD",
            "vendor\\.git\\index",
            "/abs/repo/.git/",
        ] {
            assert!(!is_valid_path(path), "{path} should be rejected");
        }
    }

    #[test]
    fn git_is_matched_as_component_not_substring() {
        assert!(is_valid_path(".github/workflows/ci.yml"));
        assert!(is_valid_path(".gitignore"));
        assert!(is_valid_path("docs/using.git.md"));
        assert!(is_valid_path("my.git/readme"));
    }

    #[test]
    fn os_artifacts_are_invalid_at_any_depth() {
        assert!(!is_valid_path(".DS_Store"));
        assert!(!is_valid_path("assets/img/.DS_Store"));
        assert!(!is_valid_path("Thumbs.db"));
        assert!(!is_valid_path("photos\\Thumbs.db"));
    }

    #[test]
    fn os_artifact_names_must_match_exactly() {
        assert!(is_valid_path("notes/.DS_Store.txt"));
        assert!(is_valid_path("MyThumbs.db"));
        assert!(is_valid_path("Thumbs.db/inner.rs"));
    }
}

//! Usage file discovery

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension marking a per-task usage file
pub const USAGE_FILE_EXTENSION: &str = "parq";

/// Recursively collect every usage file below `root`
///
/// Entries are visited in file-name order, so the result is stable for an
/// unchanged tree. Symlinked usage files are kept; symlinked directories are
/// not descended into. A missing root yields no files.
#[must_use]
pub fn discover_usage_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root.as_ref()).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if entry.path().is_file() && is_usage_file(entry.path()) {
            debug!("Found usage file {}", entry.path().display());
            files.push(entry.into_path());
        }
    }

    files
}

fn is_usage_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == USAGE_FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_finds_nested_usage_files() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("isr_a.parq"));
        touch(&tmp.path().join("deep/nested/calibrate_b.parq"));
        touch(&tmp.path().join("deep/notes.txt"));
        touch(&tmp.path().join("deep/isr_a.parquet"));

        let files = discover_usage_files(tmp.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names.len(), 2);
        assert!(names.contains(&"isr_a.parq".to_string()));
        assert!(names.contains(&"calibrate_b.parq".to_string()));
    }

    #[test]
    fn test_empty_tree_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_usage_files(tmp.path()).is_empty());
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        assert!(discover_usage_files("/nonexistent/usage/tree").is_empty());
    }

    #[test]
    fn test_order_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["c_1.parq", "a_1.parq", "b/a_2.parq", "b_1.parq"] {
            touch(&tmp.path().join(name));
        }

        let first = discover_usage_files(tmp.path());
        let second = discover_usage_files(tmp.path());
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_usage_file_is_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = tmp.path().join("store/isr_1.parq");
        touch(&store);
        let results = tmp.path().join("results");
        fs::create_dir_all(&results).unwrap();
        std::os::unix::fs::symlink(&store, results.join("isr_1.parq")).unwrap();

        let files = discover_usage_files(&results);
        assert_eq!(files, vec![results.join("isr_1.parq")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.parq"), tmp.path().join("isr_1.parq"))
            .unwrap();
        assert!(discover_usage_files(tmp.path()).is_empty());
    }

    #[test]
    fn test_directory_named_like_usage_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("trap.parq")).unwrap();
        assert!(discover_usage_files(tmp.path()).is_empty());
    }
}

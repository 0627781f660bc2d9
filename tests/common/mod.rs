#![allow(dead_code)]

use autoindex::{AutoIndex, Entry};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Opt-in test logging:
///   RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Create a directory structure from a list of relative paths.
/// Paths ending with '/' create directories; others create empty files.
pub fn create_fixture(paths: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for p in paths {
        let full = tmp.path().join(p);
        if p.ends_with('/') {
            fs::create_dir_all(&full).unwrap();
        } else {
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, "").unwrap();
        }
    }
    tmp
}

/// Write a file of exactly `len` bytes.
pub fn write_sized(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'x'; len]).unwrap();
}

/// Set a file's modification time to `secs` seconds after the epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// The sample tree used across tests: two files and a subdirectory.
pub fn data_fixture() -> TempDir {
    let tmp = create_fixture(&["docs/", "docs/readme.md"]);
    write_sized(&tmp.path().join("photo.png"), 3000);
    write_sized(&tmp.path().join("notes.txt"), 10);
    tmp
}

/// Index over `root` without the bundled icon rules.
pub fn bare_index(root: &Path) -> AutoIndex {
    AutoIndex::builder(root)
        .default_icons(false)
        .build()
        .unwrap()
}

pub fn names(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| e.name().to_string()).collect()
}

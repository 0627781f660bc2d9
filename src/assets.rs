//! Lookup of icon image files for the serving layer.
//!
//! This crate ships no images and serves no URLs. The host mounts a handler
//! at the renderer's icon prefix (`/__autoindex__/icons/` by default) and
//! answers it with the file [`IconAssets::locate`] returns.

use std::path::{Path, PathBuf};

use crate::entry::is_plain_name;

/// Directory checked first for icon images. Empty unless the host installs
/// an icon set (such as Silk) there.
pub const BUNDLED_ASSET_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Where icon files are looked up: the bundled directory first, then the host's.
///
/// Neither directory has to exist. A missing one simply never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAssets {
    bundled: PathBuf,
    host: Option<PathBuf>,
}

impl Default for IconAssets {
    fn default() -> Self {
        Self::new(BUNDLED_ASSET_DIR, None::<PathBuf>)
    }
}

impl IconAssets {
    pub fn new(bundled: impl Into<PathBuf>, host: Option<impl Into<PathBuf>>) -> Self {
        Self {
            bundled: bundled.into(),
            host: host.map(Into::into),
        }
    }

    pub fn bundled_dir(&self) -> &Path {
        &self.bundled
    }

    pub fn host_dir(&self) -> Option<&Path> {
        self.host.as_deref()
    }

    /// Absolute path of the icon file called `filename`, if either directory has it.
    ///
    /// Only bare file names are looked up.
    pub fn locate(&self, filename: &str) -> Option<PathBuf> {
        if !is_plain_name(filename) {
            tracing::warn!(filename, "rejected asset name");
            return None;
        }
        std::iter::once(self.bundled.as_path())
            .chain(self.host.as_deref())
            .map(|dir| dir.join(filename))
            .find(|candidate| candidate.is_file())
    }
}

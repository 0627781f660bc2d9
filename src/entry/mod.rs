//! Entry model: files, directories and the browse root they hang off.

mod explore;

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{AutoIndexError, Result};
use crate::icons::IconRules;

pub use explore::{build_ignore_set, Children, ExploreConfig, Order, SortKey};

/// Symlinks followed while resolving one request path before giving up.
const MAX_LINK_HOPS: usize = 40;

/// Which variant of filesystem object an [`Entry`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    /// The directory a [`RootDirectory`] is anchored at.
    Root,
}

impl EntryKind {
    /// Directories and the root both list children.
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory | EntryKind::Root)
    }
}

/// The filesystem directory every served path is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDirectory {
    abspath: Arc<Path>,
}

impl RootDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            abspath: Arc::from(path.as_ref()),
        }
    }

    /// The root exactly as configured.
    pub fn abspath(&self) -> &Path {
        &self.abspath
    }

    /// The root itself as a listable entry.
    pub fn entry(&self) -> Entry {
        let name = self
            .abspath
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.abspath.to_string_lossy().to_string());
        Entry {
            kind: EntryKind::Root,
            name,
            path: String::new(),
            abspath: self.abspath.to_path_buf(),
            root: Arc::clone(&self.abspath),
        }
    }

    /// Resolve a request path to a file or directory entry below the root.
    ///
    /// `..` components and symlinks leading outside the root are rejected
    /// with [`AutoIndexError::PathEscapesRoot`]. Missing targets, and
    /// anything that is neither a regular file nor a directory (FIFOs,
    /// sockets, devices), yield [`AutoIndexError::NotFound`].
    pub fn resolve(&self, path: &str) -> Result<Entry> {
        let rel = normalize_path(path)?;
        if rel.is_empty() {
            return match fs::metadata(&self.abspath) {
                Ok(meta) if meta.is_dir() => Ok(self.entry()),
                Ok(_) => Err(AutoIndexError::NotADirectory(self.abspath.to_path_buf())),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(AutoIndexError::NotFound(self.abspath.display().to_string()))
                }
                Err(e) => Err(AutoIndexError::io(self.abspath.to_path_buf(), e)),
            };
        }

        let meta = self.locate(&rel)?;
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else {
            tracing::debug!(path = %rel, file_type = ?meta.file_type(), "neither file nor directory");
            return Err(AutoIndexError::NotFound(rel));
        };
        Ok(Entry::below(&self.abspath, rel, kind))
    }

    /// Like [`resolve`](Self::resolve) but insists on a directory.
    pub fn directory(&self, path: &str) -> Result<Entry> {
        let entry = self.resolve(path)?;
        if !entry.is_dir() {
            return Err(AutoIndexError::NotADirectory(entry.abspath));
        }
        Ok(entry)
    }

    /// Walk `rel` below the canonical root one component at a time and
    /// return the metadata of what it finally points at.
    ///
    /// Symlink targets are checked against the root before anything behind
    /// them is looked up, so an escaping link is rejected whether or not its
    /// target exists.
    fn locate(&self, rel: &str) -> Result<fs::Metadata> {
        let root = match self.abspath.canonicalize() {
            Ok(root) => root,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AutoIndexError::NotFound(self.abspath.display().to_string()));
            }
            Err(e) => return Err(AutoIndexError::io(self.abspath.to_path_buf(), e)),
        };
        let root_meta = fs::metadata(&root).map_err(|e| AutoIndexError::io(root.clone(), e))?;

        let mut resolved = root.clone();
        let mut meta = root_meta.clone();
        let mut pending: Vec<OsString> = rel.rsplit('/').map(OsString::from).collect();
        let mut hops = 0;

        while let Some(segment) = pending.pop() {
            if !meta.is_dir() {
                return Err(AutoIndexError::NotFound(rel.to_string()));
            }
            let candidate = resolved.join(&segment);
            let link_meta = match fs::symlink_metadata(&candidate) {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(AutoIndexError::NotFound(rel.to_string()));
                }
                Err(e) => return Err(AutoIndexError::io(candidate, e)),
            };
            if !link_meta.file_type().is_symlink() {
                resolved = candidate;
                meta = link_meta;
                continue;
            }

            hops += 1;
            if hops > MAX_LINK_HOPS {
                return Err(AutoIndexError::io(
                    candidate,
                    io::Error::new(io::ErrorKind::Other, "too many levels of symbolic links"),
                ));
            }
            let link = fs::read_link(&candidate).map_err(|e| AutoIndexError::io(candidate.clone(), e))?;
            let target = lexical_normalize(&resolved.join(&link));
            let rest = match target
                .strip_prefix(&root)
                .or_else(|_| target.strip_prefix(&*self.abspath))
            {
                Ok(rest) => rest,
                Err(_) => {
                    tracing::warn!(path = rel, resolved = %target.display(), "symlink leads outside browse root");
                    return Err(AutoIndexError::PathEscapesRoot(rel.to_string()));
                }
            };
            pending.extend(rest.components().rev().map(|c| c.as_os_str().to_os_string()));
            resolved = root.clone();
            meta = root_meta.clone();
        }
        Ok(meta)
    }
}

/// One filesystem object below a browse root.
///
/// Entries are cheap, transient values built per request. Metadata is read
/// from the filesystem only when asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    kind: EntryKind,
    name: String,
    path: String,
    abspath: PathBuf,
    root: Arc<Path>,
}

impl Entry {
    /// Build an entry for an already-normalised relative path.
    pub(crate) fn below(root: &Arc<Path>, rel: String, kind: EntryKind) -> Self {
        let name = rel.rsplit('/').next().unwrap_or_default().to_string();
        Entry {
            kind,
            name,
            abspath: join_relative(root, &rel),
            path: rel,
            root: Arc::clone(root),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Base name of the object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the browse root, `/`-separated, empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn abspath(&self) -> &Path {
        &self.abspath
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_root(&self) -> bool {
        self.kind == EntryKind::Root
    }

    /// Dotfiles; the root is never hidden.
    pub fn is_hidden(&self) -> bool {
        !self.is_root() && self.name.starts_with('.')
    }

    /// The enclosing directory, or `None` for the root.
    pub fn parent(&self) -> Option<Entry> {
        if self.is_root() {
            return None;
        }
        match self.path.rsplit_once('/') {
            Some((parent, _)) => Some(Entry::below(
                &self.root,
                parent.to_string(),
                EntryKind::Directory,
            )),
            None => Some(RootDirectory {
                abspath: Arc::clone(&self.root),
            }
            .entry()),
        }
    }

    pub fn metadata(&self) -> Result<fs::Metadata> {
        fs::metadata(&self.abspath).map_err(|e| AutoIndexError::io(self.abspath.clone(), e))
    }

    /// Size in bytes as reported by the filesystem.
    pub fn size(&self) -> Result<u64> {
        Ok(self.metadata()?.len())
    }

    pub fn modified(&self) -> Result<SystemTime> {
        self.metadata()?
            .modified()
            .map_err(|e| AutoIndexError::io(self.abspath.clone(), e))
    }

    /// Mimetype guessed from the file name. Directories have none.
    pub fn mimetype(&self) -> Option<String> {
        if !self.is_file() {
            return None;
        }
        mime_guess::from_path(&self.name)
            .first()
            .map(|m| m.essence_str().to_string())
    }

    /// Whether this directory holds a child called `name`.
    pub fn contains(&self, name: &str) -> bool {
        if !self.is_dir() || !is_plain_name(name) {
            return false;
        }
        self.abspath.join(name).symlink_metadata().is_ok()
    }

    /// Icon reference for this entry under `rules`.
    pub fn icon(&self, rules: &IconRules) -> String {
        rules.resolve(self)
    }

    /// Child entry named `name` of a directory entry.
    pub(crate) fn child(&self, name: &str, kind: EntryKind) -> Entry {
        let rel = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        };
        Entry::below(&self.root, rel, kind)
    }
}

/// Normalise a request path to the `/`-separated form used by [`Entry::path`].
///
/// Empty and `.` segments are dropped, so leading and trailing slashes
/// vanish. Any `..` segment fails with [`AutoIndexError::PathEscapesRoot`].
pub fn normalize_path(path: &str) -> Result<String> {
    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                tracing::warn!(path, "rejected parent-directory traversal");
                return Err(AutoIndexError::PathEscapesRoot(path.to_string()));
            }
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

fn join_relative(root: &Path, rel: &str) -> PathBuf {
    let mut abspath = root.to_path_buf();
    for segment in rel.split('/').filter(|s| !s.is_empty()) {
        abspath.push(segment);
    }
    abspath
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A single path component that cannot walk anywhere else.
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

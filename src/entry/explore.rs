use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::str::FromStr;
use std::time::SystemTime;
use walkdir::WalkDir;

use super::{Entry, EntryKind};
use crate::error::{AutoIndexError, Result};

/// Column a listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Modified,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Size => "size",
            SortKey::Modified => "modified",
        }
    }
}

impl FromStr for SortKey {
    type Err = AutoIndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SortKey::Name),
            "size" => Ok(SortKey::Size),
            "modified" => Ok(SortKey::Modified),
            other => Err(AutoIndexError::InvalidSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    /// `1` for ascending, `-1` for descending.
    pub fn multiplier(self) -> i8 {
        match self {
            Order::Asc => 1,
            Order::Desc => -1,
        }
    }

    /// Inverse of [`multiplier`](Self::multiplier); any negative value is descending.
    pub fn from_multiplier(m: i8) -> Self {
        if m < 0 {
            Order::Desc
        } else {
            Order::Asc
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Order::Asc => Order::Desc,
            Order::Desc => Order::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }
}

impl FromStr for Order {
    type Err = AutoIndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(AutoIndexError::InvalidOrder(other.to_string())),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which children a listing shows.
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    /// Whether to include hidden entries (dotfiles).
    pub show_hidden: bool,
    /// Glob patterns (matched against the entry name) for entries to exclude.
    pub ignore_patterns: GlobSet,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            ignore_patterns: GlobSet::empty(),
        }
    }
}

/// Build a GlobSet from ignore patterns. The first invalid pattern is an error.
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| AutoIndexError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| AutoIndexError::InvalidPattern {
            pattern: patterns.join(","),
            source,
        })
}

/// Sorted children of one directory, handed out one at a time.
#[derive(Debug)]
pub struct Children {
    inner: std::vec::IntoIter<Entry>,
}

impl Iterator for Children {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children {
    fn next_back(&mut self) -> Option<Entry> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Children {}

/// Per-entry sort value. Ties on the key fall back to the name.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Name,
    Size(u64),
    Modified(SystemTime),
}

impl SortValue {
    fn of(entry: &Entry, key: SortKey) -> Result<Self> {
        Ok(match key {
            SortKey::Name => SortValue::Name,
            SortKey::Size => SortValue::Size(sort_metadata(entry)?.len()),
            SortKey::Modified => SortValue::Modified(
                sort_metadata(entry)?
                    .modified()
                    .map_err(|e| AutoIndexError::io(entry.abspath.clone(), e))?,
            ),
        })
    }
}

/// Metadata used for sorting. Dangling symlinks sort by the link itself.
fn sort_metadata(entry: &Entry) -> Result<fs::Metadata> {
    match fs::metadata(&entry.abspath) {
        Ok(meta) => Ok(meta),
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::symlink_metadata(&entry.abspath)
            .map_err(|e| AutoIndexError::io(entry.abspath.clone(), e)),
        Err(e) => Err(AutoIndexError::io(entry.abspath.clone(), e)),
    }
}

impl Entry {
    /// List this directory's children sorted by `sort_by` in `order`.
    ///
    /// Hidden entries are skipped; see [`explore_with`](Self::explore_with).
    pub fn explore(&self, sort_by: SortKey, order: Order) -> Result<Children> {
        self.explore_with(sort_by, order, &ExploreConfig::default())
    }

    /// List this directory's children, one level deep.
    ///
    /// Files and directories are sorted together by the key alone, ties
    /// broken by name. [`Order::Desc`] yields exactly the reverse of
    /// [`Order::Asc`].
    pub fn explore_with(
        &self,
        sort_by: SortKey,
        order: Order,
        config: &ExploreConfig,
    ) -> Result<Children> {
        if !self.is_dir() {
            return Err(AutoIndexError::NotADirectory(self.abspath.clone()));
        }

        let show_hidden = config.show_hidden;
        let ignore_patterns = &config.ignore_patterns;
        let walker = WalkDir::new(&self.abspath)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        let mut keyed = Vec::new();
        for entry_result in walker.into_iter() {
            let dent = entry_result.map_err(|e| {
                let path = e
                    .path()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| self.abspath.clone());
                match e.into_io_error() {
                    Some(io_err) => AutoIndexError::io(path, io_err),
                    None => AutoIndexError::io(
                        path,
                        io::Error::new(io::ErrorKind::Other, "filesystem loop"),
                    ),
                }
            })?;

            let name = dent.file_name().to_string_lossy().to_string();
            if !show_hidden && name.starts_with('.') {
                continue;
            }
            if ignore_patterns.is_match(&name) {
                continue;
            }

            // Symlinks list as whatever they point at; dangling ones as files.
            let is_dir = if dent.path_is_symlink() {
                fs::metadata(dent.path())
                    .map(|m| m.is_dir())
                    .unwrap_or(false)
            } else {
                dent.file_type().is_dir()
            };
            let kind = if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let child = self.child(&name, kind);
            keyed.push((SortValue::of(&child, sort_by)?, child));
        }

        keyed.sort_by(|(ka, a), (kb, b)| order.apply(ka.cmp(kb).then_with(|| a.name.cmp(&b.name))));

        tracing::debug!(
            path = %self.abspath.display(),
            sort_by = sort_by.as_str(),
            order = order.as_str(),
            count = keyed.len(),
            "explored directory"
        );

        let entries: Vec<Entry> = keyed.into_iter().map(|(_, e)| e).collect();
        Ok(Children {
            inner: entries.into_iter(),
        })
    }
}

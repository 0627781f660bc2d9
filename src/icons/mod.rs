//! Icon rule engine.
//!
//! Rules are collected on an [`IconRulesBuilder`] during setup and sealed
//! into an immutable [`IconRules`] before any request is served. Resolution
//! walks the rules in registration order and the first match wins; when
//! nothing matches the default icon is used.

pub mod defaults;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::sync::Arc;

use crate::entry::{Entry, EntryKind};
use crate::error::{AutoIndexError, Result};

/// Icon used when no rule matches.
pub const DEFAULT_ICON: &str = "page_white.png";

/// Custom predicate over an entry.
pub type Predicate = Arc<dyn Fn(&Entry) -> bool + Send + Sync>;

/// Computes an icon for an entry, or declines with `None`.
pub type Resolver = Arc<dyn Fn(&Entry) -> Option<String> + Send + Sync>;

/// The icon side of a rule: a fixed reference or one computed per entry.
#[derive(Clone)]
pub enum Icon {
    Static(String),
    Dynamic(Resolver),
}

impl Icon {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Entry) -> Option<String> + Send + Sync + 'static,
    {
        Icon::Dynamic(Arc::new(f))
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Icon::Dynamic(_))
    }
}

impl From<&str> for Icon {
    fn from(s: &str) -> Self {
        Icon::Static(s.to_string())
    }
}

impl From<String> for Icon {
    fn from(s: String) -> Self {
        Icon::Static(s)
    }
}

impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Icon::Static(s) => f.debug_tuple("Static").field(s).finish(),
            Icon::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Entry variants a class rule can name. `Directory` also covers the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    /// Any entry.
    Entry,
    File,
    Directory,
    RootDirectory,
}

impl EntryClass {
    pub fn matches(self, kind: EntryKind) -> bool {
        match self {
            EntryClass::Entry => true,
            EntryClass::File => kind == EntryKind::File,
            EntryClass::Directory => kind.is_dir(),
            EntryClass::RootDirectory => kind == EntryKind::Root,
        }
    }
}

enum Matcher {
    Custom(Predicate),
    /// Dynamic icon registered without any predicate.
    Any,
    Extension(Vec<String>),
    Mimetype(GlobSet),
    Name(Vec<String>),
    FileName(Vec<String>),
    DirName(Vec<String>),
    Class(Vec<EntryClass>),
}

impl Matcher {
    fn matches(&self, entry: &Entry) -> bool {
        match self {
            Matcher::Custom(pred) => pred(entry),
            Matcher::Any => true,
            Matcher::Extension(exts) => {
                if !entry.is_file() {
                    return false;
                }
                let name = entry.name().to_ascii_lowercase();
                exts.iter().any(|ext| {
                    name.len() > ext.len() + 1
                        && name.ends_with(ext.as_str())
                        && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
                })
            }
            Matcher::Mimetype(globs) => entry
                .mimetype()
                .map(|mime| globs.is_match(mime))
                .unwrap_or(false),
            Matcher::Name(names) => names.iter().any(|n| n == entry.name()),
            Matcher::FileName(names) => {
                entry.is_file() && names.iter().any(|n| n == entry.name())
            }
            Matcher::DirName(names) => entry.is_dir() && names.iter().any(|n| n == entry.name()),
            Matcher::Class(classes) => classes.iter().any(|c| c.matches(entry.kind())),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Matcher::Custom(_) => "custom",
            Matcher::Any => "any",
            Matcher::Extension(_) => "ext",
            Matcher::Mimetype(_) => "mimetype",
            Matcher::Name(_) => "name",
            Matcher::FileName(_) => "filename",
            Matcher::DirName(_) => "dirname",
            Matcher::Class(_) => "cls",
        }
    }
}

/// One predicate/icon pair.
pub struct IconRule {
    matcher: Matcher,
    icon: Icon,
}

impl IconRule {
    /// The icon for `entry` if this rule applies to it.
    ///
    /// A dynamic icon may still decline after the predicate matched, in
    /// which case resolution moves on to the next rule.
    fn apply(&self, entry: &Entry) -> Option<String> {
        if !self.matcher.matches(entry) {
            return None;
        }
        match &self.icon {
            Icon::Static(icon) => Some(icon.clone()),
            Icon::Dynamic(resolve) => resolve(entry).filter(|icon| !icon.is_empty()),
        }
    }
}

impl fmt::Debug for IconRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IconRule")
            .field("matcher", &self.matcher.label())
            .field("icon", &self.icon)
            .finish()
    }
}

/// Matcher shapes for one [`IconRulesBuilder::add_icon_rule`] call.
///
/// Every non-empty shape becomes its own rule, appended in this order:
/// custom rule, extensions, mimetypes, names, filenames, dirnames, classes.
#[derive(Clone, Default)]
pub struct IconRuleSpec {
    rule: Option<Predicate>,
    ext: Vec<String>,
    mimetype: Vec<String>,
    name: Vec<String>,
    filename: Vec<String>,
    dirname: Vec<String>,
    cls: Vec<EntryClass>,
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl IconRuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, pred: F) -> Self
    where
        F: Fn(&Entry) -> bool + Send + Sync + 'static,
    {
        self.rule = Some(Arc::new(pred));
        self
    }

    /// File extensions, with or without the leading dot, case-insensitive.
    pub fn ext<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ext = strings(exts)
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Mimetype globs such as `image/*`.
    pub fn mimetype<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mimetype = strings(patterns);
        self
    }

    /// Exact names of files or directories.
    pub fn name<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name = strings(names);
        self
    }

    /// Exact names, files only.
    pub fn filename<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filename = strings(names);
        self
    }

    /// Exact names, directories only.
    pub fn dirname<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirname = strings(names);
        self
    }

    pub fn cls<I>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = EntryClass>,
    {
        self.cls = classes.into_iter().collect();
        self
    }

    fn into_matchers(self) -> Result<Vec<Matcher>> {
        let mut matchers = Vec::new();
        if let Some(pred) = self.rule {
            matchers.push(Matcher::Custom(pred));
        }
        if !self.ext.is_empty() {
            matchers.push(Matcher::Extension(self.ext));
        }
        if !self.mimetype.is_empty() {
            matchers.push(Matcher::Mimetype(build_mimetype_set(&self.mimetype)?));
        }
        if !self.name.is_empty() {
            matchers.push(Matcher::Name(self.name));
        }
        if !self.filename.is_empty() {
            matchers.push(Matcher::FileName(self.filename));
        }
        if !self.dirname.is_empty() {
            matchers.push(Matcher::DirName(self.dirname));
        }
        if !self.cls.is_empty() {
            matchers.push(Matcher::Class(self.cls));
        }
        Ok(matchers)
    }
}

fn build_mimetype_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .case_insensitive(true)
            .build()
            .map_err(|source| AutoIndexError::InvalidPattern {
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

/// Append-only rule list used during setup.
#[derive(Debug)]
pub struct IconRulesBuilder {
    rules: Vec<IconRule>,
    default_icon: String,
}

impl Default for IconRulesBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl IconRulesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_icon(&mut self, icon: impl Into<String>) -> &mut Self {
        self.default_icon = icon.into();
        self
    }

    /// Register `icon` for every matcher shape set on `spec`.
    ///
    /// A dynamic icon with no shapes at all is consulted for every entry.
    /// A static icon with no shapes registers nothing.
    pub fn add_icon_rule(&mut self, icon: impl Into<Icon>, spec: IconRuleSpec) -> Result<&mut Self> {
        let icon = icon.into();
        let mut matchers = spec.into_matchers()?;
        if matchers.is_empty() && icon.is_dynamic() {
            matchers.push(Matcher::Any);
        }
        for matcher in matchers {
            self.rules.push(IconRule {
                matcher,
                icon: icon.clone(),
            });
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freeze the list. Nothing can be added afterwards.
    pub fn build(self) -> IconRules {
        IconRules {
            rules: self.rules,
            default_icon: self.default_icon,
        }
    }
}

/// Sealed, read-only rule list shared by every request.
#[derive(Debug)]
pub struct IconRules {
    rules: Vec<IconRule>,
    default_icon: String,
}

impl Default for IconRules {
    fn default() -> Self {
        IconRulesBuilder::default().build()
    }
}

impl IconRules {
    pub fn builder() -> IconRulesBuilder {
        IconRulesBuilder::new()
    }

    /// First matching icon for `entry`, or the default icon.
    pub fn resolve(&self, entry: &Entry) -> String {
        for (idx, rule) in self.rules.iter().enumerate() {
            if let Some(icon) = rule.apply(entry) {
                tracing::trace!(entry = entry.path(), rule = idx, matcher = rule.matcher.label(), %icon, "icon rule matched");
                return icon;
            }
        }
        self.default_icon.clone()
    }

    pub fn default_icon(&self) -> &str {
        &self.default_icon
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn file(name: &str) -> Entry {
        Entry::below(&Arc::from(Path::new("/data")), name.to_string(), EntryKind::File)
    }

    fn dir(name: &str) -> Entry {
        Entry::below(&Arc::from(Path::new("/data")), name.to_string(), EntryKind::Directory)
    }

    #[test]
    fn test_empty_rules_use_default() {
        let rules = IconRules::default();
        assert_eq!(rules.resolve(&file("a.txt")), DEFAULT_ICON);
    }

    #[test]
    fn test_one_call_appends_one_rule_per_shape() {
        let mut builder = IconRules::builder();
        builder
            .add_icon_rule(
                "x.png",
                IconRuleSpec::new()
                    .rule(|_| false)
                    .ext(["a"])
                    .mimetype(["text/*"])
                    .name(["n"])
                    .cls([EntryClass::File]),
            )
            .unwrap();
        assert_eq!(builder.len(), 5);
    }

    #[test]
    fn test_static_icon_without_shapes_adds_nothing() {
        let mut builder = IconRules::builder();
        builder.add_icon_rule("x.png", IconRuleSpec::new()).unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn test_extension_is_case_insensitive_and_files_only() {
        let mut builder = IconRules::builder();
        builder
            .add_icon_rule("image.png", IconRuleSpec::new().ext([".PNG", "tar.gz"]))
            .unwrap();
        let rules = builder.build();
        assert_eq!(rules.resolve(&file("Photo.Png")), "image.png");
        assert_eq!(rules.resolve(&file("backup.tar.gz")), "image.png");
        assert_eq!(rules.resolve(&file("png")), DEFAULT_ICON);
        assert_eq!(rules.resolve(&file("notpng")), DEFAULT_ICON);
        assert_eq!(rules.resolve(&dir("icons.png")), DEFAULT_ICON);
    }

    #[test]
    fn test_mimetype_wildcard() {
        let mut builder = IconRules::builder();
        builder
            .add_icon_rule("picture.png", IconRuleSpec::new().mimetype(["image/*"]))
            .unwrap();
        let rules = builder.build();
        assert_eq!(rules.resolve(&file("a.jpg")), "picture.png");
        assert_eq!(rules.resolve(&file("a.txt")), DEFAULT_ICON);
        assert_eq!(rules.resolve(&file("no_extension")), DEFAULT_ICON);
    }

    #[test]
    fn test_bad_mimetype_glob_is_rejected() {
        let mut builder = IconRules::builder();
        let err = builder
            .add_icon_rule("x.png", IconRuleSpec::new().mimetype(["image/["]))
            .unwrap_err();
        assert!(matches!(err, AutoIndexError::InvalidPattern { .. }));
    }

    #[test]
    fn test_filename_and_dirname_are_variant_specific() {
        let mut builder = IconRules::builder();
        builder
            .add_icon_rule("file.png", IconRuleSpec::new().filename(["build"]))
            .unwrap()
            .add_icon_rule("dir.png", IconRuleSpec::new().dirname(["build"]))
            .unwrap()
            .add_icon_rule("both.png", IconRuleSpec::new().name(["docs"]))
            .unwrap();
        let rules = builder.build();
        assert_eq!(rules.resolve(&file("build")), "file.png");
        assert_eq!(rules.resolve(&dir("build")), "dir.png");
        assert_eq!(rules.resolve(&file("docs")), "both.png");
        assert_eq!(rules.resolve(&dir("docs")), "both.png");
    }

    #[test]
    fn test_class_directory_covers_root() {
        assert!(EntryClass::Directory.matches(EntryKind::Root));
        assert!(!EntryClass::RootDirectory.matches(EntryKind::Directory));
        assert!(EntryClass::Entry.matches(EntryKind::File));
        assert!(!EntryClass::File.matches(EntryKind::Directory));
    }

    #[test]
    fn test_dynamic_icon_empty_string_declines() {
        let mut builder = IconRules::builder();
        builder
            .add_icon_rule(Icon::dynamic(|_| Some(String::new())), IconRuleSpec::new())
            .unwrap()
            .add_icon_rule("fallback.png", IconRuleSpec::new().cls([EntryClass::Entry]))
            .unwrap();
        assert_eq!(builder.build().resolve(&file("a")), "fallback.png");
    }

    #[test]
    fn test_custom_default_icon() {
        let mut builder = IconRules::builder();
        builder.default_icon("blank.gif");
        assert_eq!(builder.build().resolve(&dir("x")), "blank.gif");
    }
}

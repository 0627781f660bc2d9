//! Index service: turns a request path into a listing context or a file to stream.
//!
//! The HTTP layer is not part of this crate. It hands a path and the query
//! parameters to [`AutoIndex::render`] and turns the returned [`Response`]
//! (or the error's [`status_code`](crate::AutoIndexError::status_code))
//! into bytes on the wire.

use globset::GlobSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::entry::{build_ignore_set, Entry, ExploreConfig, Order, RootDirectory, SortKey};
use crate::error::{AutoIndexError, Result};
use crate::icons::{self, Icon, IconRuleSpec, IconRules, IconRulesBuilder, DEFAULT_ICON};

/// Template name handed to the renderer when none is given.
pub const DEFAULT_TEMPLATE: &str = "autoindex.html";

/// Service-wide settings.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Whether listings include hidden entries (dotfiles).
    pub show_hidden: bool,
    /// Glob patterns (matched against entry names) excluded from listings.
    pub ignore_patterns: GlobSet,
    /// Whether to append the bundled icon rules after the user's.
    pub default_icons: bool,
    /// Icon used when no rule matches.
    pub default_icon: String,
    /// Template name put into listing contexts.
    pub template: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            ignore_patterns: GlobSet::empty(),
            default_icons: true,
            default_icon: DEFAULT_ICON.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Setup-time builder. Icon rules can only be added here.
#[derive(Debug)]
pub struct AutoIndexBuilder {
    root: RootDirectory,
    config: IndexConfig,
    icons: IconRulesBuilder,
}

impl AutoIndexBuilder {
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    pub fn show_hidden(mut self, show: bool) -> Self {
        self.config.show_hidden = show;
        self
    }

    pub fn ignore(mut self, patterns: &[String]) -> Result<Self> {
        self.config.ignore_patterns = build_ignore_set(patterns)?;
        Ok(self)
    }

    pub fn default_icons(mut self, enabled: bool) -> Self {
        self.config.default_icons = enabled;
        self
    }

    pub fn default_icon(mut self, icon: impl Into<String>) -> Self {
        self.config.default_icon = icon.into();
        self
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.config.template = name.into();
        self
    }

    /// Register an icon rule; see [`IconRulesBuilder::add_icon_rule`].
    pub fn add_icon_rule(mut self, icon: impl Into<Icon>, spec: IconRuleSpec) -> Result<Self> {
        self.icons.add_icon_rule(icon, spec)?;
        Ok(self)
    }

    /// Seal the icon rules and produce the service.
    pub fn build(self) -> Result<AutoIndex> {
        let AutoIndexBuilder {
            root,
            config,
            mut icons,
        } = self;
        if config.default_icons {
            icons::defaults::install(&mut icons)?;
        }
        icons.default_icon(config.default_icon.clone());
        let rules = Arc::new(icons.build());
        tracing::debug!(root = %root.abspath().display(), rules = rules.len(), "autoindex ready");
        Ok(AutoIndex {
            root,
            explore: ExploreConfig {
                show_hidden: config.show_hidden,
                ignore_patterns: config.ignore_patterns,
            },
            template: config.template,
            rules,
        })
    }
}

/// Raw `sort_by` / `order` request parameters, validated only for listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListingQuery {
    pub fn new(sort_by: Option<&str>, order: Option<&str>) -> Self {
        Self {
            sort_by: sort_by.map(str::to_string),
            order: order.map(str::to_string),
        }
    }

    /// Pick `sort_by` and `order` out of an URL query string. Other keys are ignored.
    pub fn parse(query: &str) -> Self {
        let mut out = ListingQuery::default();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "sort_by" => out.sort_by = Some(value.into_owned()),
                "order" => out.order = Some(value.into_owned()),
                _ => {}
            }
        }
        out
    }

    /// Defaults to [`SortKey::Name`] when absent.
    pub fn sort_key(&self) -> Result<SortKey> {
        self.sort_by
            .as_deref()
            .map_or(Ok(SortKey::default()), str::parse)
    }

    /// Defaults to [`Order::Asc`] when absent.
    pub fn order(&self) -> Result<Order> {
        self.order.as_deref().map_or(Ok(Order::default()), str::parse)
    }
}

/// Everything a template needs to draw one directory page.
#[derive(Debug, Clone)]
pub struct ListingContext {
    pub current_directory: Entry,
    pub path: String,
    pub entries: Vec<Entry>,
    pub sort_by: SortKey,
    pub order: Order,
    pub template: String,
}

/// A file the serving layer should stream back.
#[derive(Debug, Clone)]
pub struct FileResponse {
    pub entry: Entry,
    pub mimetype: String,
    pub size: u64,
}

impl FileResponse {
    pub fn open(&self) -> Result<fs::File> {
        fs::File::open(self.entry.abspath())
            .map_err(|e| AutoIndexError::io(self.entry.abspath().to_path_buf(), e))
    }

    /// Copy the file's bytes into `out`, returning how many were written.
    pub fn stream_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<u64> {
        let mut file = self.open()?;
        io::copy(&mut file, out).map_err(|e| AutoIndexError::io(self.entry.abspath().to_path_buf(), e))
    }
}

#[derive(Debug, Clone)]
pub enum Response {
    Listing(ListingContext),
    File(FileResponse),
}

/// A configured directory index.
#[derive(Debug, Clone)]
pub struct AutoIndex {
    root: RootDirectory,
    explore: ExploreConfig,
    template: String,
    rules: Arc<IconRules>,
}

impl AutoIndex {
    pub fn builder(browse_root: impl AsRef<Path>) -> AutoIndexBuilder {
        AutoIndexBuilder {
            root: RootDirectory::new(browse_root),
            config: IndexConfig::default(),
            icons: IconRules::builder(),
        }
    }

    pub fn root(&self) -> &RootDirectory {
        &self.root
    }

    /// The sealed rule list, shared by every request.
    pub fn icon_rules(&self) -> &Arc<IconRules> {
        &self.rules
    }

    pub fn icon(&self, entry: &Entry) -> String {
        self.rules.resolve(entry)
    }

    /// Resolve `path` against the configured root.
    pub fn render(&self, path: &str, query: &ListingQuery) -> Result<Response> {
        self.render_with(path, query, None, None)
    }

    /// Resolve `path`, optionally against another root and with an explicit template.
    ///
    /// Directories produce a [`ListingContext`], files a [`FileResponse`].
    /// Missing paths fail with [`AutoIndexError::NotFound`], paths leaving
    /// the root with [`AutoIndexError::PathEscapesRoot`].
    pub fn render_with(
        &self,
        path: &str,
        query: &ListingQuery,
        browse_root: Option<&Path>,
        template: Option<&str>,
    ) -> Result<Response> {
        let override_root;
        let root = match browse_root {
            Some(dir) => {
                override_root = RootDirectory::new(dir);
                &override_root
            }
            None => &self.root,
        };

        let entry = root.resolve(path)?;
        if entry.is_file() {
            let size = entry.size()?;
            let mimetype = entry
                .mimetype()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            tracing::debug!(path = entry.path(), size, %mimetype, "serving file");
            return Ok(Response::File(FileResponse {
                entry,
                mimetype,
                size,
            }));
        }

        let sort_by = query.sort_key()?;
        let order = query.order()?;
        let entries: Vec<Entry> = entry.explore_with(sort_by, order, &self.explore)?.collect();
        tracing::debug!(
            path = entry.path(),
            entries = entries.len(),
            %sort_by,
            %order,
            "rendering listing"
        );
        Ok(Response::Listing(ListingContext {
            path: entry.path().to_string(),
            current_directory: entry,
            entries,
            sort_by,
            order,
            template: template.unwrap_or(self.template.as_str()).to_string(),
        }))
    }
}

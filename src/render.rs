//! Built-in rendering of a listing context as an HTML page or plain text.

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::time::SystemTime;

use crate::entry::{Entry, Order, SortKey};
use crate::icons::IconRules;
use crate::index::ListingContext;

/// Configuration for the rendering pipeline.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// URL prefix under which icon files are served.
    pub icon_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            icon_prefix: "/__autoindex__/icons/".to_string(),
        }
    }
}

/// Escape text for use inside HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode one path segment, leaving RFC 3986 unreserved bytes alone.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }
    out
}

/// Link target for an entry; directories get a trailing slash.
pub fn href(entry: &Entry) -> String {
    let mut out = String::from("/");
    let encoded: Vec<String> = entry
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(encode_segment)
        .collect();
    out.push_str(&encoded.join("/"));
    if entry.is_dir() && !encoded.is_empty() {
        out.push('/');
    }
    out
}

/// Byte count in binary units, one decimal above bytes.
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_modified(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

fn size_cell(entry: &Entry) -> String {
    if entry.is_dir() {
        return "-".to_string();
    }
    entry.size().map(human_size).unwrap_or_else(|_| "?".to_string())
}

fn modified_cell(entry: &Entry) -> String {
    entry
        .modified()
        .map(format_modified)
        .unwrap_or_else(|_| "?".to_string())
}

/// Query string for a column header: the active column flips its order.
fn sort_link(ctx: &ListingContext, key: SortKey) -> String {
    let order = if ctx.sort_by == key {
        ctx.order.reversed()
    } else {
        Order::Asc
    };
    format!("?sort_by={}&amp;order={}", key, order)
}

fn sort_marker(ctx: &ListingContext, key: SortKey) -> &'static str {
    match (ctx.sort_by == key, ctx.order) {
        (false, _) => "",
        (true, Order::Asc) => " \u{25b4}",
        (true, Order::Desc) => " \u{25be}",
    }
}

/// Render a directory page.
pub fn listing_html(ctx: &ListingContext, rules: &IconRules, config: &RenderConfig) -> String {
    let title = format!("Index of /{}", escape_html(&ctx.path));
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html><head><meta charset=\"utf-8\"><title>{}</title></head>", title);
    let _ = writeln!(html, "<body><h1>{}</h1>", title);
    let _ = writeln!(html, "<table>");
    let _ = write!(html, "<thead><tr><th></th>");
    for (key, label) in [
        (SortKey::Name, "Name"),
        (SortKey::Modified, "Last modified"),
        (SortKey::Size, "Size"),
    ] {
        let _ = write!(
            html,
            "<th><a href=\"{}\">{}{}</a></th>",
            sort_link(ctx, key),
            label,
            sort_marker(ctx, key)
        );
    }
    let _ = writeln!(html, "</tr></thead>");
    let _ = writeln!(html, "<tbody>");

    if let Some(parent) = ctx.current_directory.parent() {
        let _ = writeln!(
            html,
            "<tr><td><img src=\"{}arrow_up.png\" alt=\"\"></td><td><a href=\"{}\">Parent directory</a></td><td></td><td></td></tr>",
            escape_html(&config.icon_prefix),
            escape_html(&href(&parent))
        );
    }

    for entry in &ctx.entries {
        let icon = rules.resolve(entry);
        // Dynamic rules may hand back a full URL instead of a bare file name.
        let icon_src = if icon.starts_with('/') || icon.contains("://") {
            icon
        } else {
            format!("{}{}", config.icon_prefix, icon)
        };
        let _ = writeln!(
            html,
            "<tr><td><img src=\"{}\" alt=\"\"></td><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
            escape_html(&icon_src),
            escape_html(&href(entry)),
            escape_html(entry.name()),
            modified_cell(entry),
            size_cell(entry)
        );
    }

    let _ = writeln!(html, "</tbody></table>");
    let _ = writeln!(html, "</body></html>");
    html
}

/// Render a directory as aligned plain-text columns.
pub fn listing_text(ctx: &ListingContext, rules: &IconRules) -> String {
    let width = ctx
        .entries
        .iter()
        .map(|e| e.name().chars().count() + usize::from(e.is_dir()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "Index of /{}", ctx.path);
    for entry in &ctx.entries {
        let mut name = entry.name().to_string();
        if entry.is_dir() {
            name.push('/');
        }
        let _ = writeln!(
            out,
            "{:<width$}  {:>16}  {:>10}  {}",
            name,
            modified_cell(entry),
            size_cell(entry),
            rules.resolve(entry),
            width = width
        );
    }
    out
}

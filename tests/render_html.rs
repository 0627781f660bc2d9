mod common;

use autoindex::index::ListingQuery;
use autoindex::render::{listing_html, listing_text, RenderConfig};
use autoindex::{AutoIndex, Response};
use common::{create_fixture, data_fixture};

fn render_page(index: &AutoIndex, path: &str, query: &str) -> String {
    match index.render(path, &ListingQuery::parse(query)).unwrap() {
        Response::Listing(ctx) => listing_html(&ctx, index.icon_rules(), &RenderConfig::default()),
        Response::File(_) => panic!("expected listing"),
    }
}

#[test]
fn test_page_lists_entries_with_icons_and_links() {
    let tmp = data_fixture();
    let index = AutoIndex::builder(tmp.path()).build().unwrap();
    let page = render_page(&index, "", "");

    assert!(page.contains("<title>Index of /</title>"));
    assert!(page.contains("href=\"/docs/\""));
    assert!(page.contains("href=\"/photo.png\""));
    assert!(page.contains("src=\"/__autoindex__/icons/folder.png\""));
    assert!(page.contains("src=\"/__autoindex__/icons/picture.png\""));
    assert!(page.contains("2.9 KiB"));
    // The root has no parent link.
    assert!(!page.contains("Parent directory"));
}

#[test]
fn test_subdirectory_page_links_to_parent() {
    let tmp = create_fixture(&["a/b/file.txt"]);
    let index = AutoIndex::builder(tmp.path()).build().unwrap();
    let page = render_page(&index, "a/b", "");
    assert!(page.contains("<h1>Index of /a/b</h1>"));
    assert!(page.contains("<a href=\"/a/\">Parent directory</a>"));
    assert!(page.contains("href=\"/a/b/file.txt\""));
}

#[test]
fn test_active_column_header_flips_order() {
    let tmp = data_fixture();
    let index = AutoIndex::builder(tmp.path()).build().unwrap();
    let page = render_page(&index, "", "sort_by=size&order=desc");
    assert!(page.contains("href=\"?sort_by=size&amp;order=asc\""));
    assert!(page.contains("href=\"?sort_by=name&amp;order=asc\""));
}

#[test]
#[cfg(unix)]
fn test_names_are_html_escaped() {
    let tmp = create_fixture(&["<script>alert(1)<", "a&b\"c"]);
    let index = AutoIndex::builder(tmp.path()).build().unwrap();
    let page = render_page(&index, "", "");

    assert!(!page.contains("<script>"));
    assert!(page.contains("&lt;script&gt;alert(1)&lt;"));
    assert!(page.contains("a&amp;b&quot;c"));
    // Link targets are percent-encoded.
    assert!(page.contains("href=\"/%3Cscript%3Ealert%281%29%3C\""));
}

#[test]
fn test_absolute_dynamic_icon_is_used_verbatim() {
    let tmp = create_fixture(&["site/favicon.ico"]);
    let index = AutoIndex::builder(tmp.path())
        .add_icon_rule(
            autoindex::Icon::dynamic(|e| {
                e.contains("favicon.ico")
                    .then(|| format!("/{}/favicon.ico", e.path()))
            }),
            autoindex::IconRuleSpec::new(),
        )
        .unwrap()
        .build()
        .unwrap();
    let page = render_page(&index, "", "");
    assert!(page.contains("src=\"/site/favicon.ico\""));
}

#[test]
fn test_text_listing_marks_directories() {
    let tmp = data_fixture();
    let index = AutoIndex::builder(tmp.path()).build().unwrap();
    let ctx = match index.render("", &ListingQuery::default()).unwrap() {
        Response::Listing(ctx) => ctx,
        Response::File(_) => panic!("expected listing"),
    };
    let text = listing_text(&ctx, index.icon_rules());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Index of /");
    assert!(lines[1].starts_with("docs/"));
    assert!(lines[1].ends_with("folder.png"));
    assert!(lines[2].starts_with("notes.txt"));
    assert!(lines[3].contains("2.9 KiB"));
}

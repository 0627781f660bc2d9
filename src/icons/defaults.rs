//! Bundled icon rules using the Silk icon names.

use super::{EntryClass, IconRuleSpec, IconRulesBuilder};
use crate::error::Result;

const ARCHIVE_EXTS: &[&str] = &["zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar"];
const CODE_EXTS: &[&str] = &[
    "rs", "py", "rb", "c", "h", "cc", "cpp", "hpp", "java", "js", "ts", "go", "php", "sh", "pl",
    "lua", "swift", "kt", "cs",
];
const WEB_EXTS: &[&str] = &["html", "htm", "xhtml", "css"];

/// Append the default rules. Call after any site-specific rules so those
/// take precedence.
pub fn install(builder: &mut IconRulesBuilder) -> Result<()> {
    builder
        .add_icon_rule("server.png", IconRuleSpec::new().cls([EntryClass::RootDirectory]))?
        .add_icon_rule("folder.png", IconRuleSpec::new().cls([EntryClass::Directory]))?
        .add_icon_rule("page_white_acrobat.png", IconRuleSpec::new().ext(["pdf"]))?
        .add_icon_rule("page_white_compressed.png", IconRuleSpec::new().ext(ARCHIVE_EXTS.iter().copied()))?
        .add_icon_rule("page_white_code.png", IconRuleSpec::new().ext(CODE_EXTS.iter().copied()))?
        .add_icon_rule("html.png", IconRuleSpec::new().ext(WEB_EXTS.iter().copied()))?
        .add_icon_rule("page_white_word.png", IconRuleSpec::new().ext(["doc", "docx", "odt", "rtf"]))?
        .add_icon_rule("page_white_excel.png", IconRuleSpec::new().ext(["xls", "xlsx", "ods", "csv"]))?
        .add_icon_rule("page_white_powerpoint.png", IconRuleSpec::new().ext(["ppt", "pptx", "odp"]))?
        .add_icon_rule("picture.png", IconRuleSpec::new().mimetype(["image/*"]))?
        .add_icon_rule("music.png", IconRuleSpec::new().mimetype(["audio/*"]))?
        .add_icon_rule("film.png", IconRuleSpec::new().mimetype(["video/*"]))?
        .add_icon_rule("page_white_text.png", IconRuleSpec::new().mimetype(["text/*"]))?
        .add_icon_rule("page_white.png", IconRuleSpec::new().cls([EntryClass::File]))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryKind, RootDirectory};
    use crate::icons::IconRules;
    use std::path::Path;
    use std::sync::Arc;

    fn rules() -> IconRules {
        let mut builder = IconRules::builder();
        install(&mut builder).unwrap();
        builder.build()
    }

    fn entry(name: &str, kind: EntryKind) -> Entry {
        Entry::below(&Arc::from(Path::new("/data")), name.to_string(), kind)
    }

    #[test]
    fn test_defaults_cover_common_types() {
        let rules = rules();
        assert_eq!(rules.resolve(&entry("docs", EntryKind::Directory)), "folder.png");
        assert_eq!(rules.resolve(&RootDirectory::new("/data").entry()), "server.png");
        assert_eq!(rules.resolve(&entry("main.rs", EntryKind::File)), "page_white_code.png");
        assert_eq!(rules.resolve(&entry("a.tar.gz", EntryKind::File)), "page_white_compressed.png");
        assert_eq!(rules.resolve(&entry("cat.jpeg", EntryKind::File)), "picture.png");
        assert_eq!(rules.resolve(&entry("song.mp3", EntryKind::File)), "music.png");
        assert_eq!(rules.resolve(&entry("notes.txt", EntryKind::File)), "page_white_text.png");
        assert_eq!(rules.resolve(&entry("blob", EntryKind::File)), "page_white.png");
    }
}

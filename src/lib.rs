#![forbid(unsafe_code)]
//! Autoindex: browsable directory listings with rule-based entry icons.

pub mod assets;
pub mod cli;
pub mod entry;
pub mod error;
pub mod icons;
pub mod index;
pub mod render;

pub use entry::{Entry, EntryKind, Order, RootDirectory, SortKey};
pub use error::AutoIndexError;
pub use icons::{EntryClass, Icon, IconRuleSpec, IconRules};
pub use index::{AutoIndex, ListingContext, ListingQuery, Response};

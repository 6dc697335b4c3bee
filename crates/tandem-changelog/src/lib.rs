//! Tandem Changelog - release notes for multi-package releases
//!
//! Commits are parsed as conventional commits, scoped to the packages they
//! touch and rendered to markdown with links to the repository host.

pub mod filter;
pub mod formatter;
pub mod hosts;
pub mod notes;
pub mod parser;
pub mod presets;
pub mod repository;
pub mod types;

pub use formatter::{ChangelogFormatter, MarkdownFormatter, WriterContext};
pub use notes::{generate_notes, NotesGenerator};
pub use parser::{CommitParser, ConventionalParser, ParserSettings};
pub use repository::RepositoryUrl;
pub use types::{BreakingNote, ChangelogEntry, Note, ParsedCommit, Reference, Section};

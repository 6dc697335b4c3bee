//! Commit parsing

mod conventional;

pub use conventional::{ConventionalParser, ParserSettings};

use crate::types::ParsedCommit;
use tandem_core::types::CommitInfo;

/// Trait for commit parsers
pub trait CommitParser: Send + Sync {
    /// Parse a commit into a structured format, `None` for empty messages
    fn parse(&self, commit: &CommitInfo) -> Option<ParsedCommit>;
}

//! Changelog formatters

mod markdown;

pub use markdown::MarkdownFormatter;

use serde::Serialize;

use crate::types::ChangelogEntry;

/// Values available to a formatter besides the entry itself
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriterContext {
    /// Release date, omitted from the header when unset
    pub date: Option<String>,
    /// Web base URL of the repository host
    pub host: Option<String>,
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub previous_tag: Option<String>,
    pub current_tag: Option<String>,
    /// Render a compare link in the header
    pub link_compare: bool,
    /// Render issue and commit links
    pub link_references: bool,
    /// Issue path segment
    pub issue: String,
    /// Commit path segment
    pub commit: String,
}

impl WriterContext {
    /// `host/owner/repository` when a host is known
    pub fn repository_url(&self) -> Option<String> {
        let mut url = self.host.clone()?;
        for part in [&self.owner, &self.repository].into_iter().flatten() {
            url.push('/');
            url.push_str(part);
        }
        Some(url)
    }
}

/// Trait for changelog formatters
pub trait ChangelogFormatter: Send + Sync {
    /// Format a changelog entry to string
    fn format(&self, entry: &ChangelogEntry, context: &WriterContext) -> String;

    /// Get the file extension for this format
    fn extension(&self) -> &'static str;
}

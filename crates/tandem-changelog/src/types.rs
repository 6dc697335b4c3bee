//! Changelog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit parsed from conventional commit format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Original commit hash
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// First line of the message
    pub header: String,
    /// Commit type (feat, fix, etc.), `None` for non-conventional headers
    pub commit_type: Option<String>,
    /// Scope (optional, in parentheses)
    pub scope: Option<String>,
    /// Text after the type and scope
    pub subject: Option<String>,
    /// Commit body without notes
    pub body: Option<String>,
    /// Notes introduced by a note keyword
    pub notes: Vec<Note>,
    /// Issues referenced anywhere in the message
    pub references: Vec<Reference>,
    /// Set when this commit reverts another one
    pub revert: Option<Revert>,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl ParsedCommit {
    /// Whether the commit carries a breaking change note
    pub fn is_breaking(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// A footer note such as `BREAKING CHANGE: ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Keyword that introduced the note
    pub title: String,
    /// Note text
    pub text: String,
}

/// An issue reference such as `closes #12` or `acme/widgets#3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Verb preceding the reference
    pub action: Option<String>,
    /// Owner of another repository
    pub owner: Option<String>,
    /// Name of another repository
    pub repository: Option<String>,
    /// Issue prefix (`#`, `gh-`)
    pub prefix: String,
    /// Issue number
    pub issue: String,
}

/// The commit a revert commit undoes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revert {
    /// Header of the reverted commit
    pub header: String,
    /// Hash of the reverted commit
    pub hash: Option<String>,
}

/// A section in a changelog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section title
    pub title: String,
    /// Commits in this section
    pub commits: Vec<ParsedCommit>,
}

impl Section {
    /// Create a new section
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            commits: Vec::new(),
        }
    }

    /// Add a commit to the section
    pub fn add_commit(&mut self, commit: ParsedCommit) {
        self.commits.push(commit);
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// A breaking change listed under its own heading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakingNote {
    pub scope: Option<String>,
    pub text: String,
}

/// Release notes of one version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Version string
    pub version: String,
    /// Sections in display order
    pub sections: Vec<Section>,
    /// Breaking changes (highlighted separately)
    pub breaking_changes: Vec<BreakingNote>,
}

impl ChangelogEntry {
    /// Create a new changelog entry
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            sections: Vec::new(),
            breaking_changes: Vec::new(),
        }
    }

    /// Add a section, skipping empty ones
    pub fn add_section(&mut self, section: Section) {
        if !section.is_empty() {
            self.sections.push(section);
        }
    }

    /// Check if entry has any content
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.breaking_changes.is_empty()
    }
}

//! Conventional Commits parser
//!
//! Parses commits following the Conventional Commits specification:
//! https://www.conventionalcommits.org/
//!
//! Besides type, scope and subject the parser extracts footer notes
//! (`BREAKING CHANGE: ...`), issue references and revert markers.

use regex::Regex;
use std::sync::LazyLock;

use tandem_core::config::ParserOptions;
use tandem_core::types::CommitInfo;

use super::CommitParser;
use crate::types::{Note, ParsedCommit, Reference, Revert};

/// Regex for parsing conventional commit headers
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w*)(?:\((?P<scope>.*)\))?(?P<breaking>!)?: (?P<subject>.*)$")
        .expect("Invalid regex")
});

/// Regex for `git revert` messages
static REVERT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^(?:Revert|revert:)\s"?(?P<header>.+?)"?\s*This reverts commit (?P<hash>\w*)\."#)
        .expect("Invalid regex")
});

/// Keywords introducing a breaking change note
pub const DEFAULT_NOTE_KEYWORDS: &[&str] = &["BREAKING CHANGE", "BREAKING-CHANGE"];

/// Verbs that close an issue
pub const DEFAULT_REFERENCE_ACTIONS: &[&str] = &[
    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// Prefixes of issue references
pub const DEFAULT_ISSUE_PREFIXES: &[&str] = &["#"];

/// Resolved parser options
#[derive(Debug, Clone)]
pub struct ParserSettings {
    pub note_keywords: Vec<String>,
    pub reference_actions: Vec<String>,
    pub issue_prefixes: Vec<String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self::from_options(ParserOptions::default())
    }
}

impl ParserSettings {
    /// Fill unset options with defaults
    pub fn from_options(options: ParserOptions) -> Self {
        let owned = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        Self {
            note_keywords: options
                .note_keywords
                .unwrap_or_else(|| owned(DEFAULT_NOTE_KEYWORDS)),
            reference_actions: options
                .reference_actions
                .unwrap_or_else(|| owned(DEFAULT_REFERENCE_ACTIONS)),
            issue_prefixes: options
                .issue_prefixes
                .unwrap_or_else(|| owned(DEFAULT_ISSUE_PREFIXES)),
        }
    }
}

/// Parser for Conventional Commits format
pub struct ConventionalParser {
    notes: Option<Regex>,
    references: Option<Regex>,
    breaking_title: String,
}

impl ConventionalParser {
    /// Create a new parser with default settings
    pub fn new() -> Self {
        Self::with_settings(&ParserSettings::default())
    }

    /// Create a parser with custom settings
    pub fn with_settings(settings: &ParserSettings) -> Self {
        let notes = alternation(&settings.note_keywords).and_then(|keywords| {
            Regex::new(&format!(r"^[\s|*]*(?P<title>{})[:\s]+(?P<text>.*)$", keywords)).ok()
        });

        let references = alternation(&settings.issue_prefixes).and_then(|prefixes| {
            let actions = alternation(&settings.reference_actions)
                .map(|a| format!(r"(?:\b(?P<action>{})\b:?\s+)?", a))
                .unwrap_or_default();
            Regex::new(&format!(
                r"(?i){}(?:(?P<owner>[\w-]+)/(?P<repository>[\w.-]+))?(?P<prefix>{})(?P<issue>\d+)",
                actions, prefixes
            ))
            .ok()
        });

        Self {
            notes,
            references,
            breaking_title: settings
                .note_keywords
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_NOTE_KEYWORDS[0].to_string()),
        }
    }

    /// Split the lines after the header into body text and notes
    fn parse_body(&self, lines: &[&str]) -> (Option<String>, Vec<Note>) {
        let mut body_lines = Vec::new();
        let mut notes: Vec<Note> = Vec::new();

        for line in lines {
            let note = self.notes.as_ref().and_then(|re| re.captures(line));
            if let Some(caps) = note {
                notes.push(Note {
                    title: caps["title"].to_string(),
                    text: caps["text"].trim().to_string(),
                });
            } else if let Some(last) = notes.last_mut() {
                if !line.trim().is_empty() {
                    if !last.text.is_empty() {
                        last.text.push('\n');
                    }
                    last.text.push_str(line.trim_end());
                }
            } else {
                body_lines.push(*line);
            }
        }

        let body = body_lines.join("\n").trim().to_string();
        ((!body.is_empty()).then_some(body), notes)
    }

    /// Issue references found in `text`
    fn parse_references(&self, text: &str) -> Vec<Reference> {
        let Some(re) = &self.references else {
            return Vec::new();
        };

        re.captures_iter(text)
            .map(|caps| Reference {
                action: caps.name("action").map(|m| m.as_str().to_lowercase()),
                owner: caps.name("owner").map(|m| m.as_str().to_string()),
                repository: caps.name("repository").map(|m| m.as_str().to_string()),
                prefix: caps["prefix"].to_string(),
                issue: caps["issue"].to_string(),
            })
            .collect()
    }
}

impl Default for ConventionalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitParser for ConventionalParser {
    fn parse(&self, commit: &CommitInfo) -> Option<ParsedCommit> {
        let message = commit.full_message();
        if message.trim().is_empty() {
            return None;
        }

        let lines: Vec<&str> = message.lines().collect();
        let header = lines.first().map(|l| l.trim()).unwrap_or_default().to_string();
        let (body, mut notes) = self.parse_body(lines.get(1..).unwrap_or_default());

        let mut commit_type = None;
        let mut scope = None;
        let mut subject = None;
        if let Some(caps) = HEADER_REGEX.captures(&header) {
            commit_type = caps
                .name("type")
                .map(|m| m.as_str().to_string())
                .filter(|t| !t.is_empty());
            scope = caps
                .name("scope")
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty());
            subject = caps.name("subject").map(|m| m.as_str().to_string());

            if caps.name("breaking").is_some() && notes.is_empty() {
                notes.push(Note {
                    title: self.breaking_title.clone(),
                    text: subject.clone().unwrap_or_default(),
                });
            }
        }

        let revert = REVERT_REGEX.captures(&message).map(|caps| Revert {
            header: caps["header"].to_string(),
            hash: caps
                .name("hash")
                .map(|m| m.as_str().to_string())
                .filter(|h| !h.is_empty()),
        });

        Some(ParsedCommit {
            hash: commit.hash.clone(),
            short_hash: commit.short_hash.clone(),
            references: self.parse_references(&message),
            header,
            commit_type,
            scope,
            subject,
            body,
            notes,
            revert,
            author: commit.author.clone(),
            timestamp: commit.timestamp,
        })
    }
}

/// Regex alternation of escaped `values`, `None` when empty
fn alternation(values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

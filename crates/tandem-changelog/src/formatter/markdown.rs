//! Markdown changelog formatter

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use super::{ChangelogFormatter, WriterContext};
use crate::types::{ChangelogEntry, ParsedCommit, Reference};

static ISSUE_IN_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("Invalid regex"));

/// Markdown changelog formatter
#[derive(Debug, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self
    }

    fn header(&self, entry: &ChangelogEntry, context: &WriterContext) -> String {
        let compare = match (&context.previous_tag, &context.current_tag, context.repository_url()) {
            (Some(previous), Some(current), Some(url)) if context.link_compare => {
                Some(format!("{}/compare/{}...{}", url, previous, current))
            }
            _ => None,
        };

        let mut header = match compare {
            Some(url) => format!("## [{}]({})", entry.version, url),
            None => format!("## {}", entry.version),
        };
        if let Some(date) = &context.date {
            header.push_str(&format!(" ({})", date));
        }
        header
    }

    fn commit_line(&self, commit: &ParsedCommit, context: &WriterContext) -> String {
        let base = context.repository_url().filter(|_| context.link_references);
        let mut line = String::from("*");

        if let Some(scope) = &commit.scope {
            line.push_str(&format!(" **{}:**", scope));
        }

        let mut linked_issues = HashSet::new();
        let subject = commit.subject.as_deref().unwrap_or(&commit.header);
        let subject = match &base {
            Some(base) => ISSUE_IN_SUBJECT
                .replace_all(subject, |caps: &regex::Captures<'_>| {
                    linked_issues.insert(caps[1].to_string());
                    format!("[#{}]({}/{}/{})", &caps[1], base, context.issue, &caps[1])
                })
                .into_owned(),
            None => subject.to_string(),
        };
        line.push(' ');
        line.push_str(&subject);

        match &base {
            Some(base) => line.push_str(&format!(
                " ([{}]({}/{}/{}))",
                commit.short_hash, base, context.commit, commit.hash
            )),
            None => line.push_str(&format!(" {}", commit.short_hash)),
        }

        let references: Vec<String> = commit
            .references
            .iter()
            .filter(|r| r.owner.is_some() || !linked_issues.contains(&r.issue))
            .map(|r| self.reference(r, context, base.as_deref()))
            .collect();
        if !references.is_empty() {
            line.push_str(", closes ");
            line.push_str(&references.join(" "));
        }

        line
    }

    fn reference(&self, reference: &Reference, context: &WriterContext, base: Option<&str>) -> String {
        let repository = match (&reference.owner, &reference.repository) {
            (Some(owner), Some(repository)) => format!("{}/{}", owner, repository),
            _ => String::new(),
        };
        let label = format!("{}{}{}", repository, reference.prefix, reference.issue);

        let Some(base) = base else {
            return label;
        };
        let target = match (&reference.owner, &context.host) {
            (Some(_), Some(host)) => format!("{}/{}", host, repository),
            _ => base.to_string(),
        };
        format!("[{}]({}/{}/{})", label, target, context.issue, reference.issue)
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, entry, context), fields(version = %entry.version, section_count = entry.sections.len()))]
    fn format(&self, entry: &ChangelogEntry, context: &WriterContext) -> String {
        let mut output = self.header(entry, context);
        output.push_str("\n\n");

        for section in &entry.sections {
            if section.is_empty() {
                continue;
            }

            output.push_str(&format!("### {}\n\n", section.title));
            for commit in &section.commits {
                output.push_str(&self.commit_line(commit, context));
                output.push('\n');
            }
            output.push('\n');
        }

        if !entry.breaking_changes.is_empty() {
            output.push_str("### BREAKING CHANGES\n\n");
            for note in &entry.breaking_changes {
                match &note.scope {
                    Some(scope) => output.push_str(&format!("* **{}:** {}\n", scope, note.text)),
                    None => output.push_str(&format!("* {}\n", note.text)),
                }
            }
            output.push('\n');
        }

        let output = format!("{}\n", output.trim_end());
        debug!(output_len = output.len(), "markdown changelog formatted");
        output
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

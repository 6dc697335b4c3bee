//! Release notes generation

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, instrument};

use tandem_core::collaborators::VersionControl;
use tandem_core::config::{PluginConfig, TypeSection};
use tandem_core::error::Result;
use tandem_core::monorepo::Package;
use tandem_core::types::{CommitInfo, ReleaseContext};

use crate::filter::filter_reverted;
use crate::formatter::{ChangelogFormatter, MarkdownFormatter, WriterContext};
use crate::hosts::{host_config, DEFAULT_HOST};
use crate::parser::{CommitParser, ConventionalParser, ParserSettings};
use crate::presets::Preset;
use crate::repository::RepositoryUrl;
use crate::types::{BreakingNote, ChangelogEntry, ParsedCommit, Section};

/// Turns commits into a rendered changelog entry
pub struct NotesGenerator {
    parser: Box<dyn CommitParser>,
    formatter: Box<dyn ChangelogFormatter>,
    types: Vec<TypeSection>,
}

impl NotesGenerator {
    /// Create a generator rendering `types` as sections
    pub fn new(settings: &ParserSettings, types: Vec<TypeSection>) -> Self {
        Self {
            parser: Box::new(ConventionalParser::with_settings(settings)),
            formatter: Box::new(MarkdownFormatter::new()),
            types,
        }
    }

    /// Use a custom formatter
    pub fn with_formatter<F: ChangelogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Parse commits, dropping empty messages and reverted pairs
    pub fn parse(&self, commits: &[CommitInfo]) -> Vec<ParsedCommit> {
        let parsed = commits.iter().filter_map(|c| self.parser.parse(c)).collect();
        filter_reverted(parsed)
    }

    /// Group commits into sections in the order of the configured types
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    pub fn build(&self, version: &str, commits: Vec<ParsedCommit>) -> ChangelogEntry {
        let mut entry = ChangelogEntry::new(version);
        let mut grouped: HashMap<String, Vec<ParsedCommit>> = HashMap::new();

        for commit in commits {
            for note in &commit.notes {
                entry.breaking_changes.push(BreakingNote {
                    scope: commit.scope.clone(),
                    text: note.text.clone(),
                });
            }

            let Some(commit_type) = commit.commit_type.clone() else {
                continue;
            };
            grouped.entry(commit_type).or_default().push(commit);
        }

        let mut titles: Vec<&str> = Vec::new();
        for type_section in self.types.iter().filter(|t| !t.hidden) {
            let Some(mut commits) = grouped.remove(&type_section.commit_type) else {
                continue;
            };
            commits.sort_by(|a, b| (&a.scope, &a.subject).cmp(&(&b.scope, &b.subject)));

            // several types may share a section title
            if let Some(pos) = titles.iter().position(|t| *t == type_section.section) {
                entry.sections[pos].commits.extend(commits);
                continue;
            }
            titles.push(&type_section.section);
            entry.sections.push(Section {
                title: type_section.section.clone(),
                commits,
            });
        }

        debug!(
            section_count = entry.sections.len(),
            breaking_count = entry.breaking_changes.len(),
            "changelog sections built"
        );
        entry
    }

    /// Format a changelog entry to string
    pub fn format(&self, entry: &ChangelogEntry, context: &WriterContext) -> String {
        self.formatter.format(entry, context)
    }
}

/// Release notes for the commits of `ctx`, scoped to the packages they touch.
///
/// Returns an empty string when `generateNotes` is disabled.
#[instrument(skip_all, fields(version = %ctx.next_release.version))]
pub fn generate_notes(
    config: &PluginConfig,
    ctx: &ReleaseContext,
    vcs: &dyn VersionControl,
    packages: &[Package],
) -> Result<String> {
    if !config.generate_notes {
        info!("Release notes scope disabled, skipping");
        return Ok(String::new());
    }

    let repository = ctx
        .options
        .repository_url
        .as_deref()
        .map(RepositoryUrl::parse)
        .transpose()?;
    let host = repository
        .as_ref()
        .map(|r| host_config(&r.hostname))
        .unwrap_or(&DEFAULT_HOST);

    let preset = Preset::resolve(config, &ctx.cwd)?;
    let mut parser_opts = preset.parser_opts;
    parser_opts.reference_actions = parser_opts
        .reference_actions
        .or_else(|| Some(host.reference_actions()));
    parser_opts.issue_prefixes = parser_opts
        .issue_prefixes
        .or_else(|| Some(host.issue_prefixes()));
    let settings = ParserSettings::from_options(parser_opts);

    let generator = NotesGenerator::new(
        &settings,
        preset.writer_opts.types.unwrap_or_default(),
    );

    let mut commits = generator.parse(&ctx.commits);
    for commit in commits.iter_mut().filter(|c| c.scope.is_none()) {
        commit.scope = package_scope(vcs, &commit.hash, packages)?;
    }

    let previous_tag = ctx
        .last_release
        .git_tag
        .clone()
        .or_else(|| ctx.last_release.git_head.clone());
    let current_tag = ctx
        .next_release
        .git_tag
        .clone()
        .or_else(|| ctx.next_release.git_head.clone());

    let context = WriterContext {
        date: preset
            .writer_opts
            .include_date
            .unwrap_or(true)
            .then(|| Utc::now().format("%Y-%m-%d").to_string()),
        host: config
            .host
            .clone()
            .or_else(|| repository.as_ref().map(|r| r.host.clone())),
        owner: repository.as_ref().and_then(|r| r.owner.clone()),
        repository: repository.as_ref().and_then(|r| r.repository.clone()),
        link_compare: config
            .link_compare
            .unwrap_or(previous_tag.is_some() && current_tag.is_some()),
        link_references: config.link_references.unwrap_or(true),
        previous_tag,
        current_tag,
        issue: config.issue.clone().unwrap_or_else(|| host.issue.to_string()),
        commit: config.commit.clone().unwrap_or_else(|| host.commit.to_string()),
    };

    let entry = generator.build(&ctx.next_release.version, commits);
    Ok(generator.format(&entry, &context))
}

/// Comma separated names of the public packages touched by commit `hash`
fn package_scope(
    vcs: &dyn VersionControl,
    hash: &str,
    packages: &[Package],
) -> Result<Option<String>> {
    let mut names = Vec::new();
    for pkg in packages.iter().filter(|p| !p.is_private()) {
        if !vcs.commit_diff_names(hash, Some(&pkg.location))?.is_empty() {
            names.push(pkg.name.as_str());
        }
    }
    Ok((!names.is_empty()).then(|| names.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    /// Maps commit hashes to the package directories they touch
    #[derive(Default)]
    struct CommitFiles {
        touched: HashMap<String, Vec<PathBuf>>,
        queries: RefCell<usize>,
    }

    impl VersionControl for CommitFiles {
        fn has_tags(&self) -> Result<bool> {
            Ok(true)
        }

        fn describe(&self) -> Result<tandem_core::collaborators::DescribeResult> {
            Ok(Default::default())
        }

        fn diff_names(&self, _committish: &str, _pathspec: Option<&Path>) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn commit_diff_names(&self, hash: &str, pathspec: Option<&Path>) -> Result<Vec<String>> {
            *self.queries.borrow_mut() += 1;
            let dirs = self.touched.get(hash).cloned().unwrap_or_default();
            Ok(dirs
                .into_iter()
                .filter(|d| pathspec.map_or(true, |p| d == p))
                .map(|d| d.join("index.js").display().to_string())
                .collect())
        }

        fn uncommitted_tracked_files(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn commit(hash: &str, message: &str) -> CommitInfo {
        let (header, body) = message.split_once("\n\n").unwrap_or((message, ""));
        CommitInfo::new(hash, header, "Dev", "dev@example.com", Utc::now()).with_body(body)
    }

    fn packages() -> Vec<Package> {
        vec![
            Package::from_json(Path::new("/repo/packages/a"), json!({"name": "a", "version": "1.0.0"})).unwrap(),
            Package::from_json(Path::new("/repo/packages/b"), json!({"name": "b", "version": "1.0.0"})).unwrap(),
            Package::from_json(
                Path::new("/repo/packages/internal"),
                json!({"name": "internal", "version": "1.0.0", "private": true}),
            )
            .unwrap(),
        ]
    }

    fn context() -> ReleaseContext {
        let mut ctx = ReleaseContext::new("/repo", "1.1.0");
        ctx.options.repository_url = Some("git@github.com:acme/widgets.git".to_string());
        ctx.last_release.git_tag = Some("v1.0.0".to_string());
        ctx.next_release.git_tag = Some("v1.1.0".to_string());
        ctx
    }

    fn config() -> PluginConfig {
        PluginConfig {
            generate_notes: true,
            writer_opts: tandem_core::config::WriterOptions {
                include_date: Some(false),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled() {
        let notes = generate_notes(
            &PluginConfig::default(),
            &context(),
            &CommitFiles::default(),
            &packages(),
        )
        .unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_notes_scoped_to_packages() {
        let mut ctx = context();
        ctx.commits = vec![
            commit("1111111aaaaaaa", "feat: shared option"),
            commit("2222222bbbbbbb", "fix(docs): typo"),
            commit("3333333ccccccc", "chore: bump tooling"),
            commit("4444444ddddddd", "feat: internal only"),
        ];
        let vcs = CommitFiles {
            touched: HashMap::from([
                (
                    "1111111aaaaaaa".to_string(),
                    vec![PathBuf::from("/repo/packages/a"), PathBuf::from("/repo/packages/b")],
                ),
                (
                    "4444444ddddddd".to_string(),
                    vec![PathBuf::from("/repo/packages/internal")],
                ),
            ]),
            ..Default::default()
        };

        let notes = generate_notes(&config(), &ctx, &vcs, &packages()).unwrap();

        assert!(notes.starts_with(
            "## [1.1.0](https://github.com/acme/widgets/compare/v1.0.0...v1.1.0)\n"
        ));
        assert!(notes.contains("### Features\n\n* internal only"));
        assert!(notes.contains("* **a, b:** shared option ([1111111]("));
        assert!(notes.contains("### Bug Fixes\n\n* **docs:** typo"));
        assert!(!notes.contains("bump tooling"));
        // the scoped fix is not looked up
        assert_eq!(*vcs.queries.borrow(), 3 * 2);
    }

    #[test]
    fn test_reverted_commits_dropped() {
        let mut ctx = context();
        ctx.commits = vec![
            commit(
                "2222222bbbbbbb",
                "Revert \"feat: risky\"\n\nThis reverts commit 1111111aaaaaaa.",
            ),
            commit("1111111aaaaaaa", "feat: risky"),
            commit("3333333ccccccc", "fix: safe"),
        ];

        let notes = generate_notes(&config(), &ctx, &CommitFiles::default(), &packages()).unwrap();
        assert!(!notes.contains("risky"));
        assert!(notes.contains("safe"));
    }

    #[test]
    fn test_breaking_changes_section() {
        let mut ctx = context();
        ctx.commits = vec![commit(
            "1111111aaaaaaa",
            "feat(cli)!: rename flags\n\nBREAKING CHANGE: --out is now --output",
        )];

        let notes = generate_notes(&config(), &ctx, &CommitFiles::default(), &packages()).unwrap();
        assert!(notes.contains("### BREAKING CHANGES\n\n* **cli:** --out is now --output"));
    }

    #[test]
    fn test_build_merges_shared_titles() {
        let generator = NotesGenerator::new(
            &ParserSettings::default(),
            vec![
                TypeSection::new("feat", "Changes"),
                TypeSection::new("fix", "Changes"),
            ],
        );
        let commits = generator.parse(&[commit("1", "fix: b"), commit("2", "feat: a")]);
        let entry = generator.build("1.0.0", commits);
        assert_eq!(entry.sections.len(), 1);
        assert_eq!(entry.sections[0].commits.len(), 2);
    }
}

//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::monorepo::Latch;

/// Plugin configuration for tandem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Verify registry authentication during verification
    pub npm_verify_auth: bool,

    /// Publish to the registry; `false` skips publishing
    pub npm_publish: Option<bool>,

    /// Directory for packed tarballs
    pub tarball_dir: Option<String>,

    /// Directory holding the root package.json, relative to the working directory
    pub pkg_root: Option<String>,

    /// Write the release version to the root package.json
    pub root_version: bool,

    /// Latch setting (major, minor, patch, prerelease, none)
    pub latch: String,

    /// Generate release notes scoped to packages
    pub generate_notes: bool,

    /// Globs of changed files that do not cause a package release
    pub ignore_changes: Vec<String>,

    /// Release only packages with direct changes, not their dependents
    pub exclude_dependents: bool,

    /// Conventional changelog preset name
    pub preset: Option<String>,

    /// Preset file holding parser and writer options
    pub config: Option<PathBuf>,

    /// Commit parser options
    pub parser_opts: ParserOptions,

    /// Release notes writer options
    pub writer_opts: WriterOptions,

    /// Repository host override for release notes links
    pub host: Option<String>,

    /// Render a compare link in the notes header
    pub link_compare: Option<bool>,

    /// Render issue and commit links
    pub link_references: Option<bool>,

    /// Commit path segment of the host (e.g. `commit`, `commits`)
    pub commit: Option<String>,

    /// Issue path segment of the host (e.g. `issues`)
    pub issue: Option<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            npm_verify_auth: true,
            npm_publish: None,
            tarball_dir: None,
            pkg_root: None,
            root_version: true,
            latch: Latch::default().to_string(),
            generate_notes: false,
            ignore_changes: Vec::new(),
            exclude_dependents: false,
            preset: None,
            config: None,
            parser_opts: ParserOptions::default(),
            writer_opts: WriterOptions::default(),
            host: None,
            link_compare: None,
            link_references: None,
            commit: None,
            issue: None,
        }
    }
}

impl PluginConfig {
    /// Parsed latch setting, `none` when the value is unknown
    pub fn latch(&self) -> Latch {
        self.latch.parse().unwrap_or(Latch::None)
    }

    /// Whether publishing is enabled
    pub fn publish_enabled(&self) -> bool {
        self.npm_publish != Some(false)
    }
}

/// Conventional commit parser options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Keywords introducing a note in the commit footer
    pub note_keywords: Option<Vec<String>>,

    /// Verbs preceding an issue reference (e.g. `closes`)
    pub reference_actions: Option<Vec<String>>,

    /// Prefixes of issue references (e.g. `#`)
    pub issue_prefixes: Option<Vec<String>>,
}

impl ParserOptions {
    /// Fill unset fields from `base`
    pub fn or(self, base: ParserOptions) -> ParserOptions {
        ParserOptions {
            note_keywords: self.note_keywords.or(base.note_keywords),
            reference_actions: self.reference_actions.or(base.reference_actions),
            issue_prefixes: self.issue_prefixes.or(base.issue_prefixes),
        }
    }
}

/// Release notes writer options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WriterOptions {
    /// Commit types rendered as sections
    pub types: Option<Vec<TypeSection>>,

    /// Render the release date in the header
    pub include_date: Option<bool>,
}

impl WriterOptions {
    /// Fill unset fields from `base`
    pub fn or(self, base: WriterOptions) -> WriterOptions {
        WriterOptions {
            types: self.types.or(base.types),
            include_date: self.include_date.or(base.include_date),
        }
    }
}

/// Section a commit type is rendered under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSection {
    /// Commit type (e.g. `feat`)
    #[serde(rename = "type")]
    pub commit_type: String,

    /// Section title
    pub section: String,

    /// Hide commits of this type
    #[serde(default)]
    pub hidden: bool,
}

impl TypeSection {
    /// Create a visible section
    pub fn new(commit_type: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            section: section.into(),
            hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert!(config.npm_verify_auth);
        assert!(config.root_version);
        assert!(!config.generate_notes);
        assert_eq!(config.latch(), Latch::Minor);
        assert!(config.publish_enabled());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: PluginConfig = serde_yaml::from_str(
            "npmPublish: false\npkgRoot: dist\nrootVersion: false\nlatch: none\nignoreChanges:\n  - '*.md'\nwriterOpts:\n  types:\n    - type: feat\n      section: New\n",
        )
        .unwrap();
        assert!(!config.publish_enabled());
        assert_eq!(config.pkg_root.as_deref(), Some("dist"));
        assert!(!config.root_version);
        assert_eq!(config.latch(), Latch::None);
        assert_eq!(config.ignore_changes, vec!["*.md"]);
        assert_eq!(
            config.writer_opts.types,
            Some(vec![TypeSection::new("feat", "New")])
        );
    }

    #[test]
    fn test_parser_options_merge() {
        let inline = ParserOptions {
            issue_prefixes: Some(vec!["GH-".to_string()]),
            ..Default::default()
        };
        let base = ParserOptions {
            issue_prefixes: Some(vec!["#".to_string()]),
            reference_actions: Some(vec!["fixes".to_string()]),
            ..Default::default()
        };
        let merged = inline.or(base);
        assert_eq!(merged.issue_prefixes, Some(vec!["GH-".to_string()]));
        assert_eq!(merged.reference_actions, Some(vec!["fixes".to_string()]));
    }
}

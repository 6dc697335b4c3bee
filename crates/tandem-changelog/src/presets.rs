//! Built-in and file based changelog presets

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tandem_core::config::{ParserOptions, PluginConfig, TypeSection, WriterOptions};
use tandem_core::error::{ChangelogError, ConfigError, Result};

/// Parser and writer options of a preset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preset {
    pub parser_opts: ParserOptions,
    pub writer_opts: WriterOptions,
}

impl Preset {
    /// Options of a built-in preset
    pub fn builtin(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "angular" | "conventionalcommits" => Ok(Self::angular()),
            _ => Err(ChangelogError::UnsupportedPreset(name.to_string()).into()),
        }
    }

    /// The default preset
    pub fn angular() -> Self {
        let hidden = |commit_type: &str, section: &str| TypeSection {
            hidden: true,
            ..TypeSection::new(commit_type, section)
        };

        Self {
            parser_opts: ParserOptions {
                note_keywords: Some(vec![
                    "BREAKING CHANGE".to_string(),
                    "BREAKING-CHANGE".to_string(),
                ]),
                ..Default::default()
            },
            writer_opts: WriterOptions {
                types: Some(vec![
                    TypeSection::new("feat", "Features"),
                    TypeSection::new("fix", "Bug Fixes"),
                    TypeSection::new("perf", "Performance Improvements"),
                    TypeSection::new("revert", "Reverts"),
                    hidden("docs", "Documentation"),
                    hidden("style", "Styles"),
                    hidden("refactor", "Code Refactoring"),
                    hidden("test", "Tests"),
                    hidden("build", "Build System"),
                    hidden("ci", "Continuous Integration"),
                    hidden("chore", "Miscellaneous Chores"),
                ]),
                include_date: Some(true),
            },
        }
    }

    /// Load a preset from a TOML or YAML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }

        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        let preset = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(ConfigError::from)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(ConfigError::from)?,
            _ => {
                return Err(ConfigError::ParseError(format!(
                    "Unsupported preset file format: {}",
                    path.display()
                ))
                .into())
            }
        };
        Ok(preset)
    }

    /// Options for `config`: inline options over `preset`, the preset file, or the default preset
    pub fn resolve(config: &PluginConfig, cwd: &Path) -> Result<Self> {
        let base = if let Some(name) = &config.preset {
            debug!(preset = %name, "using built-in preset");
            Self::builtin(name)?
        } else if let Some(file) = &config.config {
            debug!(path = %file.display(), "loading preset file");
            Self::load(&cwd.join(file))?
        } else {
            Self::angular()
        };

        Ok(Self {
            parser_opts: config.parser_opts.clone().or(base.parser_opts),
            writer_opts: config.writer_opts.clone().or(base.writer_opts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_preset() {
        assert!(Preset::builtin("atom").is_err());
        assert!(Preset::builtin("Angular").is_ok());
    }

    #[test]
    fn test_inline_options_override_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("notes.yaml"),
            "writerOpts:\n  types:\n    - type: feat\n      section: New\n    - type: docs\n      section: Docs\n  includeDate: false\nparserOpts:\n  issuePrefixes: ['JIRA-']\n",
        )
        .unwrap();

        let config = PluginConfig {
            config: Some("notes.yaml".into()),
            parser_opts: ParserOptions {
                issue_prefixes: Some(vec!["#".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };

        let preset = Preset::resolve(&config, temp.path()).unwrap();
        let types = preset.writer_opts.types.unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].section, "Docs");
        assert_eq!(preset.writer_opts.include_date, Some(false));
        assert_eq!(preset.parser_opts.issue_prefixes, Some(vec!["#".to_string()]));
    }

    #[test]
    fn test_missing_preset_file() {
        let temp = TempDir::new().unwrap();
        let config = PluginConfig {
            config: Some("missing.toml".into()),
            ..Default::default()
        };
        assert!(Preset::resolve(&config, temp.path()).is_err());
    }
}

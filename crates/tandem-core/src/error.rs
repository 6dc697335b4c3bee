//! Error types for tandem

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TandemError
pub type Result<T> = std::result::Result<T, TandemError>;

/// Main error type for tandem operations
#[derive(Debug, Error)]
pub enum TandemError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Package graph errors
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Manifest (package.json) errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Registry authentication errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Subprocess errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Several validation failures reported together
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// No workspace package globs could be discovered
    #[error("No 'packages' property found in {0}")]
    MissingPackages(PathBuf),

    /// A package glob mixes a globstar with an explicit node_modules segment
    #[error("An explicit node_modules package path does not allow globstars (**)")]
    GlobstarNodeModules,

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Package graph errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two or more packages share a name
    #[error("Package name \"{name}\" used in multiple packages:\n\t{}", locations_list(.locations))]
    DuplicatePackageName {
        name: String,
        locations: Vec<PathBuf>,
    },

    /// A workspace: specifier did not resolve to the local package
    #[error(
        "Package specification \"{name}@{spec}\" could not be resolved within the workspace. \
         To reference a non-matching, remote version of a local dependency, remove the 'workspace:' prefix."
    )]
    WorkspaceResolution { name: String, spec: String },
}

fn locations_list(locations: &[PathBuf]) -> String {
    locations
        .iter()
        .map(|l| l.display().to_string())
        .collect::<Vec<_>>()
        .join("\n\t")
}

/// Manifest errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file is absent
    #[error("Missing package.json file at {0}")]
    NotFound(PathBuf),

    /// Manifest has no `name` field
    #[error("Missing `name` property in {0}")]
    MissingName(PathBuf),

    /// Failed to parse manifest
    #[error("Failed to parse manifest {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    /// Failed to write manifest
    #[error("Failed to write manifest {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Working copy has uncommitted changes to tracked files
    #[error("The working copy has uncommitted changes:\n{}", .files.join("\n"))]
    DirtyWorkingCopy { files: Vec<String> },

    /// Describe failed
    #[error("Failed to describe HEAD: {0}")]
    DescribeFailed(String),

    /// Unknown revision
    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Registry authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token available for the registry
    #[error("No npm token specified. An npm token must be created and set in the NPM_TOKEN environment variable to publish to {registry}")]
    NoToken { registry: String },

    /// Token was rejected by the registry
    #[error("Invalid npm token. The npm token configured in the NPM_TOKEN environment variable must be a valid token allowing to publish to the registry {registry}")]
    InvalidToken { registry: String },
}

/// Subprocess errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// Command could not be started
    #[error("Failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// Command exited unsuccessfully
    #[error("Command `{command}` failed with {status}")]
    Failed { command: String, status: String },
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Preset name is not known
    #[error("Unsupported changelog preset: {0}")]
    UnsupportedPreset(String),

    /// Repository URL could not be parsed
    #[error("Invalid repository URL '{0}'")]
    InvalidRepositoryUrl(String),
}

/// A collection of errors raised together
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<TandemError>,
}

impl AggregateError {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error, flattening nested aggregates
    pub fn push(&mut self, error: impl Into<TandemError>) {
        match error.into() {
            TandemError::Aggregate(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    /// Add several errors
    pub fn extend<I>(&mut self, errors: I)
    where
        I: IntoIterator<Item = TandemError>,
    {
        for error in errors {
            self.push(error);
        }
    }

    /// Whether no error was collected
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collected errors
    pub fn errors(&self) -> &[TandemError] {
        &self.errors
    }

    /// `Ok(())` when empty, the aggregate otherwise
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TandemError::Aggregate(self))
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if self.errors.len() == 1 { "" } else { "s" };
        write!(f, "{} error{} occurred:", self.errors.len(), s)?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl From<Vec<TandemError>> for AggregateError {
    fn from(errors: Vec<TandemError>) -> Self {
        let mut aggregate = Self::new();
        aggregate.extend(errors);
        aggregate
    }
}

impl TandemError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Individual errors, flattening an aggregate
    pub fn flatten(&self) -> Vec<&TandemError> {
        match self {
            Self::Aggregate(aggregate) => aggregate.errors().iter().collect(),
            other => vec![other],
        }
    }
}

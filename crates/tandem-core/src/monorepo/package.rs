//! Workspace package model

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ManifestError, Result};
use crate::manifest::JsonFile;

/// Manifest file name of every package
pub const MANIFEST_FILE: &str = "package.json";

/// Dependency mapping of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
    OptionalDependencies,
    PeerDependencies,
}

impl DependencyKind {
    /// Mappings that create graph edges, lowest precedence first
    pub const GRAPH: [DependencyKind; 3] = [
        DependencyKind::DevDependencies,
        DependencyKind::OptionalDependencies,
        DependencyKind::Dependencies,
    ];

    /// Mappings whose ranges are rewritten on release
    pub const REWRITTEN: [DependencyKind; 3] = [
        DependencyKind::Dependencies,
        DependencyKind::DevDependencies,
        DependencyKind::PeerDependencies,
    ];

    /// Manifest key of this mapping
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DevDependencies => "devDependencies",
            Self::OptionalDependencies => "optionalDependencies",
            Self::PeerDependencies => "peerDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package of the workspace, backed by its package.json
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Package directory
    pub location: PathBuf,
    manifest: JsonFile,
}

impl Package {
    /// Load the package located in `location`
    pub fn load(location: &Path) -> Result<Self> {
        let manifest = JsonFile::load(&location.join(MANIFEST_FILE))?;
        Self::from_manifest(location, manifest)
    }

    /// Build a package from an already parsed manifest
    pub fn from_manifest(location: &Path, manifest: JsonFile) -> Result<Self> {
        let name = manifest
            .get_str("name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ManifestError::MissingName(manifest.path().to_path_buf()))?
            .to_string();

        Ok(Self {
            name,
            location: location.to_path_buf(),
            manifest,
        })
    }

    /// Build an in-memory package from a JSON object
    pub fn from_json(location: &Path, data: Value) -> Result<Self> {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::from_manifest(location, JsonFile::from_data(location.join(MANIFEST_FILE), data))
    }

    /// Path of the package.json
    pub fn manifest_path(&self) -> &Path {
        self.manifest.path()
    }

    /// Current version, empty when the manifest has none
    pub fn version(&self) -> &str {
        self.manifest.get_str("version").unwrap_or_default()
    }

    /// Set the manifest version
    pub fn set_version(&mut self, version: &str) {
        self.manifest.set_str("version", version);
    }

    /// Whether the package is marked private
    pub fn is_private(&self) -> bool {
        self.manifest
            .data()
            .get("private")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Raw manifest value for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.manifest.data().get(key)
    }

    /// Registry configured in `publishConfig.registry`
    pub fn publish_registry(&self) -> Option<&str> {
        self.get("publishConfig")
            .and_then(|c| c.get("registry"))
            .and_then(Value::as_str)
    }

    /// Declared `(name, range)` pairs of a dependency mapping
    pub fn dependencies(&self, kind: DependencyKind) -> Vec<(String, String)> {
        self.manifest
            .data()
            .get(kind.as_str())
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, range)| {
                        range.as_str().map(|r| (name.clone(), r.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace the range of an existing dependency entry
    pub fn set_dependency(&mut self, kind: DependencyKind, name: &str, range: &str) {
        if let Some(deps) = self
            .manifest
            .data_mut()
            .get_mut(kind.as_str())
            .and_then(Value::as_object_mut)
        {
            if let Some(entry) = deps.get_mut(name) {
                *entry = Value::String(range.to_string());
            }
        }
    }

    /// Write the manifest back to disk
    pub fn save(&self) -> Result<()> {
        self.manifest.save()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

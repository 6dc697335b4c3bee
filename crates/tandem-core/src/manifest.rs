//! JSON manifest files that are rewritten in place

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ManifestError, Result};

const DEFAULT_INDENT: &str = "  ";

/// A JSON document read from disk together with its formatting conventions
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    data: Map<String, Value>,
    indent: String,
    trailing_newline: bool,
}

impl JsonFile {
    /// Read and parse a JSON object file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound(path.to_path_buf())
            } else {
                ManifestError::ParseFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;

        Self::parse(path, &content)
    }

    /// Parse JSON content that belongs to `path`
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let data: Map<String, Value> =
            serde_json::from_str(content).map_err(|e| ManifestError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            data,
            indent: detect_indent(content),
            trailing_newline: content.is_empty() || content.ends_with('\n'),
        })
    }

    /// Wrap an in-memory object with default formatting
    pub fn from_data(path: impl Into<PathBuf>, data: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            data,
            indent: DEFAULT_INDENT.to_string(),
            trailing_newline: true,
        }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed object
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Mutable parsed object
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    /// String value of a top-level key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Set a top-level string value, keeping the key's position
    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.data.insert(key.to_string(), Value::String(value.into()));
    }

    /// Serialize with the detected indentation and newline convention
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.data
            .serialize(&mut ser)
            .map_err(|e| ManifestError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let mut content = String::from_utf8(buf).map_err(|e| ManifestError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        if self.trailing_newline {
            content.push('\n');
        }
        Ok(content)
    }

    /// Write the document back to its path
    pub fn save(&self) -> Result<()> {
        let content = self.render()?;
        std::fs::write(&self.path, content).map_err(|e| ManifestError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// Indentation of the first indented line, two spaces when none is found
fn detect_indent(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - trimmed.len()]
        })
        .find(|ws| !ws.is_empty())
        .map(|ws| {
            if ws.starts_with('\t') {
                "\t".to_string()
            } else {
                ws.to_string()
            }
        })
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_indent() {
        assert_eq!(detect_indent("{\n    \"a\": 1\n}"), "    ");
        assert_eq!(detect_indent("{\n\t\"a\": 1\n}"), "\t");
        assert_eq!(detect_indent("{\"a\": 1}"), "  ");
    }

    #[test]
    fn test_save_preserves_indent_and_newline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(&path, "{\n    \"name\": \"a\",\n    \"version\": \"1.0.0\"\n}").unwrap();

        let mut file = JsonFile::load(&path).unwrap();
        file.set_str("version", "1.1.0");
        file.save().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"name\": \"a\",\n    \"version\": \"1.1.0\"\n}");
    }

    #[test]
    fn test_save_keeps_key_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(
            &path,
            "{\n  \"version\": \"1.0.0\",\n  \"name\": \"z\",\n  \"private\": true\n}\n",
        )
        .unwrap();

        let mut file = JsonFile::load(&path).unwrap();
        file.set_str("version", "2.0.0");
        file.save().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\n  \"version\": \"2.0.0\",\n  \"name\": \"z\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().unwrap();
        let err = JsonFile::load(&temp.path().join("package.json")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TandemError::Manifest(ManifestError::NotFound(_))
        ));
    }
}

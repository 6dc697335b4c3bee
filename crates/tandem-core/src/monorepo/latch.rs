//! Latching: releasing every package together on coarse-grained bumps

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LATCH_MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.0\.0$").expect("Invalid regex"));
static LATCH_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.0$").expect("Invalid regex"));
static LATCH_PATCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("Invalid regex"));
static LATCH_PRERELEASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+(-(.*\.)?\d+)?$").expect("Invalid regex"));

/// Granularity at and above which all packages are released together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Latch {
    Major,
    #[default]
    Minor,
    Patch,
    Prerelease,
    None,
}

impl Latch {
    /// Returns the string representation of the latch setting
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Prerelease => "prerelease",
            Self::None => "none",
        }
    }

    /// Whether `version` is shaped like a bump this setting latches on.
    ///
    /// Settings are cumulative: `minor` also latches on `X.0.0`, `patch`
    /// on every plain release version.
    pub fn should_latch(&self, version: &str) -> bool {
        match self {
            Self::Major => LATCH_MAJOR.is_match(version),
            Self::Minor => LATCH_MINOR.is_match(version),
            Self::Patch => LATCH_PATCH.is_match(version),
            Self::Prerelease => LATCH_PRERELEASE.is_match(version),
            Self::None => false,
        }
    }
}

impl std::fmt::Display for Latch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Latch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "prerelease" => Ok(Self::Prerelease),
            "none" => Ok(Self::None),
            _ => Err(format!("Unknown latch setting: {}", s)),
        }
    }
}

/// Whether all packages should be released together for `version`
pub fn should_latch(version: &str, latch: Latch) -> bool {
    latch.should_latch(version)
}

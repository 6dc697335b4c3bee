//! Tandem Core - multi-package release automation
//!
//! This crate holds the workspace model (package index, dependency graph,
//! change detection, latching and range rewriting), configuration, error
//! handling and the lifecycle hooks run during a release.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod manifest;
pub mod monorepo;
pub mod session;
pub mod types;
pub mod workflow;

pub use collaborators::{DescribeResult, LockfileUpdater, Publisher, RegistryAuth, VersionControl};
pub use config::PluginConfig;
pub use error::{AggregateError, Result, TandemError};
pub use monorepo::{DependencyGraph, Latch, Package, UpdateReason, UpdateSet};
pub use session::ReleaseSession;
pub use types::{CommitInfo, ReleaseContext, ReleaseInfo};
pub use workflow::{prepare, publish, verify_conditions, Collaborators, PrepareReport};

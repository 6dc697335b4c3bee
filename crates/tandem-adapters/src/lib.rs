//! Tandem Adapters - npm ecosystem collaborators
//!
//! Implements the core lockfile, registry authentication and publishing
//! traits on top of the `npm`, `pnpm` and `yarn` command line tools.

pub mod command;
pub mod credentials;
pub mod npmrc;
pub mod package_manager;
pub mod publish;

pub use command::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use credentials::NpmAuth;
pub use npmrc::{Npmrc, OFFICIAL_REGISTRY};
pub use package_manager::{NpmLockfiles, PackageManager};
pub use publish::{dist_tag, NpmPublisher};

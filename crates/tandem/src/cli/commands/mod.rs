//! CLI commands

mod changed;
mod notes;
mod prepare;
mod publish;
mod release;
mod verify;

pub use changed::ChangedCommand;
pub use notes::NotesCommand;
pub use prepare::PrepareCommand;
pub use publish::PublishCommand;
pub use release::ReleaseCommand;
pub use verify::VerifyCommand;

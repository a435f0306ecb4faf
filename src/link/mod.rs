//! Global install locations: classifying what sits at a shared path and
//! pointing it at an installed command.

mod linker;
mod status;

pub use linker::{GlobalLinker, LinkOutcome};
pub use status::InstallStatus;

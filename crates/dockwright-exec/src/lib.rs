//! Subprocess collaborators for dockwright: git checkouts and the image
//! builder, behind a mockable executor abstraction.
//!
//! Invocation outcomes are always captured: a failed subprocess surfaces as
//! an [`ExecError`] the pipeline can log and count, never as a silently
//! ignored exit status.

pub mod docker;
pub mod executor;
pub mod git;

pub use docker::{ImageBuilder, archive_name};
pub use executor::{CommandExecutor, ExecError, RealExecutor};
pub use git::SourceCheckout;

//! Core types and configuration for dockwright.
//!
//! This crate defines the per-image build descriptor ([`BuildDescriptor`]),
//! the workspace path layout ([`Workspace`]), the ignore list ([`SkipSet`]),
//! the credential store ([`CredentialStore`]), and shared error types.

pub mod auth;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod ignore;

pub use auth::CredentialStore;
pub use config::Workspace;
pub use descriptor::{BuildDescriptor, Instruction, strip_tag};
pub use error::{Error, Result};
pub use ignore::SkipSet;

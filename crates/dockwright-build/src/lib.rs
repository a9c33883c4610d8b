//! Descriptor discovery, dependency ordering, and build-context staging.
//!
//! # Build pipeline
//!
//! ```text
//! dockwright build
//!   1. Load      ── loader::load_batch() over images/**/build.toml
//!   2. Order     ── graph::order(), externals first, then parents before children
//!   3. Checkout  ── one clone-or-update per unique project URL
//!   4. Per image ── stage::stage_assets() → Preparer::prepare() →
//!                   to_manifest() → stage::write_manifest() → builder
//!   5. Cleanup   ── stage::cleanup()
//! ```
//!
//! # Internal vs. external
//!
//! An image is *internal* when its tag-stripped parent reference matches
//! another key in the loaded batch, *external* otherwise. The distinction is
//! computed against the batch actually loaded: excluding a parent via the
//! ignore list reclassifies its children as external.

pub mod graph;
pub mod loader;
pub mod prepare;
pub mod stage;

pub use graph::{BatchPartition, ancestors, classify, filter, order};
pub use loader::{Batch, DESCRIPTOR_FILE, load_batch};
pub use prepare::Preparer;

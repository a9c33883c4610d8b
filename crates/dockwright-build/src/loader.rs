use std::collections::BTreeMap;
use std::path::Path;

use dockwright_core::{BuildDescriptor, Error, Result, SkipSet, Workspace};

/// Descriptor entry point name searched for beneath the images root.
pub const DESCRIPTOR_FILE: &str = "build.toml";

/// The loaded batch, keyed by image key. Key order doubles as the
/// deterministic discovery order used wherever original order matters.
pub type Batch = BTreeMap<String, BuildDescriptor>;

/// Discover and load every descriptor beneath the images root.
///
/// Traversal is depth-first with directory entries sorted by name, so parent
/// directories are visited before their children. This fixes diagnostics
/// order only; build order comes from [`graph::order`](crate::graph::order).
/// Keys on the ignore list are excluded before their descriptor is ever
/// read. Any descriptor that fails to read or parse fails the whole run;
/// there are no partial batches.
pub fn load_batch(workspace: &Workspace, skip: &SkipSet) -> Result<Batch> {
    let root = workspace.images_dir();
    if !root.is_dir() {
        return Err(Error::ImagesRootMissing {
            path: root.to_path_buf(),
        });
    }

    let mut batch = Batch::new();
    visit(root, root, skip, &mut batch)?;
    tracing::info!(images = batch.len(), "batch loaded");
    Ok(batch)
}

fn visit(dir: &Path, root: &Path, skip: &SkipSet, batch: &mut Batch) -> Result<()> {
    let entry_point = dir.join(DESCRIPTOR_FILE);
    if entry_point.is_file() {
        match image_key(dir, root) {
            Some(key) if skip.contains(&key) => {
                tracing::info!(image = %key, "skipping (ignore list)");
            }
            Some(key) => {
                tracing::info!(image = %key, "loading");
                let descriptor = BuildDescriptor::from_path(&key, &entry_point)?;
                batch.insert(key, descriptor);
            }
            // A descriptor directly at the images root has no key.
            None => {
                tracing::warn!(path = %entry_point.display(), "descriptor at images root ignored");
            }
        }
    }

    let entries = std::fs::read_dir(dir).map_err(|e| Error::ImagesScan {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::ImagesScan {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();

    for subdir in subdirs {
        visit(&subdir, root, skip, batch)?;
    }
    Ok(())
}

/// Image key: the descriptor directory relative to the images root, with
/// separators normalized to `/`.
fn image_key(dir: &Path, root: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

use std::path::{Path, PathBuf};

use dockwright_core::{BuildDescriptor, Workspace};

/// Copy the image's declared assets into the staging area.
///
/// Each asset path is resolved relative to the image's directory under the
/// images root and lands under `assets_dir` by its final path component,
/// directories copied recursively.
pub fn stage_assets(workspace: &Workspace, descriptor: &BuildDescriptor) -> Result<(), StageError> {
    let image_dir = workspace.images_dir().join(descriptor.key());
    for asset in descriptor.assets() {
        let src = image_dir.join(asset);
        let Some(name) = src.file_name() else {
            return Err(StageError::InvalidAsset {
                image: descriptor.key().to_owned(),
                asset: asset.clone(),
            });
        };
        if !src.exists() {
            return Err(StageError::AssetMissing {
                image: descriptor.key().to_owned(),
                path: src,
            });
        }
        let dest = workspace.assets_dir().join(name);
        tracing::debug!(src = %src.display(), dest = %dest.display(), "staging asset");
        copy_recursively(&src, &dest)?;
    }
    Ok(())
}

/// Write the rendered manifest into the build context.
pub fn write_manifest(workspace: &Workspace, manifest: &str) -> Result<(), StageError> {
    std::fs::write(workspace.manifest_file(), manifest).map_err(|e| StageError::WriteManifest {
        path: workspace.manifest_file().to_path_buf(),
        source: e,
    })
}

/// End-of-run cleanup: remove the rendered manifest and clear the staging
/// area contents. The staging directory itself stays in place.
pub fn cleanup(workspace: &Workspace) -> Result<(), StageError> {
    let manifest = workspace.manifest_file();
    if manifest.exists() {
        std::fs::remove_file(manifest).map_err(|e| StageError::Cleanup {
            path: manifest.to_path_buf(),
            source: e,
        })?;
    }
    clear_dir(workspace.assets_dir())
}

fn copy_recursively(src: &Path, dest: &Path) -> Result<(), StageError> {
    if src.is_dir() {
        std::fs::create_dir_all(dest).map_err(|e| copy_error(src, dest, e))?;
        let entries = std::fs::read_dir(src).map_err(|e| copy_error(src, dest, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| copy_error(src, dest, e))?;
            copy_recursively(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        std::fs::copy(src, dest).map_err(|e| copy_error(src, dest, e))?;
    }
    Ok(())
}

fn copy_error(src: &Path, dest: &Path, source: std::io::Error) -> StageError {
    StageError::CopyAsset {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    }
}

fn clear_dir(dir: &Path) -> Result<(), StageError> {
    if !dir.exists() {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| StageError::Cleanup {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| StageError::Cleanup {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let removed = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.map_err(|e| StageError::Cleanup { path, source: e })?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("asset {path} not found for image '{image}'")]
    AssetMissing { image: String, path: PathBuf },

    #[error("asset path '{asset}' of image '{image}' has no final component")]
    InvalidAsset { image: String, asset: String },

    #[error("failed to copy {src} to {dest}")]
    CopyAsset {
        src: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write manifest at {path}")]
    WriteManifest {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to clean up {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockwright_core::BuildDescriptor;
    use tempfile::TempDir;

    fn workspace_with_image(assets_toml: &str) -> (TempDir, Workspace, BuildDescriptor) {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        ws.ensure_layout().unwrap();
        std::fs::create_dir_all(ws.images_dir().join("example/web")).unwrap();
        let descriptor = BuildDescriptor::from_toml(
            "example/web",
            &format!("from = \"ubuntu\"\n{assets_toml}"),
        )
        .unwrap();
        (tmp, ws, descriptor)
    }

    #[test]
    fn stages_files_and_directories() {
        let (_tmp, ws, descriptor) = workspace_with_image("assets = [\"conf\", \"run.sh\"]");
        let image_dir = ws.images_dir().join("example/web");
        std::fs::create_dir_all(image_dir.join("conf/nested")).unwrap();
        std::fs::write(image_dir.join("conf/app.conf"), "a").unwrap();
        std::fs::write(image_dir.join("conf/nested/deep.conf"), "b").unwrap();
        std::fs::write(image_dir.join("run.sh"), "#!/bin/sh\n").unwrap();

        stage_assets(&ws, &descriptor).unwrap();

        assert!(ws.assets_dir().join("conf/app.conf").is_file());
        assert!(ws.assets_dir().join("conf/nested/deep.conf").is_file());
        assert!(ws.assets_dir().join("run.sh").is_file());
    }

    #[test]
    fn missing_asset_is_an_error() {
        let (_tmp, ws, descriptor) = workspace_with_image("assets = [\"ghost\"]");
        let result = stage_assets(&ws, &descriptor);
        assert!(matches!(result, Err(StageError::AssetMissing { .. })));
    }

    #[test]
    fn nested_asset_lands_by_final_component() {
        let (_tmp, ws, descriptor) = workspace_with_image("assets = [\"bin/run.sh\"]");
        let image_dir = ws.images_dir().join("example/web");
        std::fs::create_dir_all(image_dir.join("bin")).unwrap();
        std::fs::write(image_dir.join("bin/run.sh"), "#!/bin/sh\n").unwrap();

        stage_assets(&ws, &descriptor).unwrap();

        assert!(ws.assets_dir().join("run.sh").is_file());
    }

    #[test]
    fn cleanup_removes_manifest_and_clears_staging() {
        let (_tmp, ws, _descriptor) = workspace_with_image("");
        write_manifest(&ws, "FROM ubuntu\n").unwrap();
        std::fs::write(ws.assets_dir().join("stale.conf"), "x").unwrap();
        std::fs::create_dir_all(ws.assets_dir().join("stale-dir")).unwrap();

        cleanup(&ws).unwrap();

        assert!(!ws.manifest_file().exists());
        assert!(ws.assets_dir().is_dir());
        assert_eq!(std::fs::read_dir(ws.assets_dir()).unwrap().count(), 0);
    }

    #[test]
    fn cleanup_without_manifest_is_fine() {
        let (_tmp, ws, _descriptor) = workspace_with_image("");
        cleanup(&ws).unwrap();
    }
}

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the ignore list file at the workspace root.
pub const IGNORE_FILE: &str = ".dwignore";

/// Filesystem layout of a dockwright workspace.
///
/// Every path the tool touches is derived here, once, from the project root.
/// Components receive a `&Workspace` instead of reaching for globals.
///
/// ```text
/// <root>/
///   images/            descriptor tree (one build.toml per image)
///   builds/            final image archives
///   .dwignore          image keys to exclude
///   .tmp/              transient build workspace
///     auth.json        credential store
///     project/         checked-out source repositories (persists across runs)
///     assets/          staged build-context assets (cleared each run)
///     cache/           reserved for layer caching
///     Dockerfile       the currently rendered manifest (removed at cleanup)
/// ```
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    images_dir: PathBuf,
    build_dir: PathBuf,
    auth_file: PathBuf,
    project_dir: PathBuf,
    assets_dir: PathBuf,
    cache_dir: PathBuf,
    manifest_file: PathBuf,
    ignore_file: PathBuf,
    builds_dir: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let build_dir = root.join(".tmp");
        Self {
            images_dir: root.join("images"),
            auth_file: build_dir.join("auth.json"),
            project_dir: build_dir.join("project"),
            assets_dir: build_dir.join("assets"),
            cache_dir: build_dir.join("cache"),
            manifest_file: build_dir.join("Dockerfile"),
            ignore_file: root.join(IGNORE_FILE),
            builds_dir: root.join("builds"),
            build_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the descriptor tree. Its existence gates the whole run.
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Transient build workspace; doubles as the builder's context directory.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn auth_file(&self) -> &Path {
        &self.auth_file
    }

    /// Checked-out project repositories. Persists across runs so checkouts
    /// are incremental.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Staged assets for the current image. Cleared at cleanup.
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Location of the rendered manifest inside the build context.
    pub fn manifest_file(&self) -> &Path {
        &self.manifest_file
    }

    pub fn ignore_file(&self) -> &Path {
        &self.ignore_file
    }

    /// Final output location for saved image archives.
    pub fn builds_dir(&self) -> &Path {
        &self.builds_dir
    }

    /// Create the transient directories a run needs.
    ///
    /// Does not touch `images_dir`: a missing images root is the caller's
    /// fatal condition.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            &self.cache_dir,
            &self.assets_dir,
            &self.project_dir,
            &self.builds_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| crate::Error::WorkspaceSetup {
                path: dir.clone(),
                source: e,
            })?;
            tracing::debug!(path = %dir.display(), "workspace directory ready");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_derive_from_root() {
        let ws = Workspace::new("/srv/stack");
        assert_eq!(ws.images_dir(), Path::new("/srv/stack/images"));
        assert_eq!(ws.build_dir(), Path::new("/srv/stack/.tmp"));
        assert_eq!(ws.auth_file(), Path::new("/srv/stack/.tmp/auth.json"));
        assert_eq!(ws.project_dir(), Path::new("/srv/stack/.tmp/project"));
        assert_eq!(ws.assets_dir(), Path::new("/srv/stack/.tmp/assets"));
        assert_eq!(ws.cache_dir(), Path::new("/srv/stack/.tmp/cache"));
        assert_eq!(ws.manifest_file(), Path::new("/srv/stack/.tmp/Dockerfile"));
        assert_eq!(ws.ignore_file(), Path::new("/srv/stack/.dwignore"));
        assert_eq!(ws.builds_dir(), Path::new("/srv/stack/builds"));
    }

    #[test]
    fn ensure_layout_creates_transient_dirs() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());

        ws.ensure_layout().unwrap();

        assert!(ws.cache_dir().is_dir());
        assert!(ws.assets_dir().is_dir());
        assert!(ws.project_dir().is_dir());
        assert!(ws.builds_dir().is_dir());
        // images root is deliberately left alone
        assert!(!ws.images_dir().exists());
    }

    #[test]
    fn ensure_layout_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());

        ws.ensure_layout().unwrap();
        ws.ensure_layout().unwrap();
    }
}

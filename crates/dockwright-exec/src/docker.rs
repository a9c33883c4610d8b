use std::path::Path;

use crate::executor::{CommandExecutor, ExecError, RealExecutor};

/// Archive file name for a saved image: slashes in the key become
/// underscores, with a `.tar` suffix.
pub fn archive_name(key: &str) -> String {
    format!("{}.tar", key.replace('/', "_"))
}

/// Builder and artifact-save collaborator.
///
/// The build context is passed as an explicit argument to every invocation;
/// the process working directory is never changed.
pub struct ImageBuilder<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl ImageBuilder<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for ImageBuilder<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> ImageBuilder<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Build the image tagged with its batch key from `context`.
    ///
    /// Layers are never cached between runs: a descendant image must pick up
    /// the parent built moments ago, not a stale layer.
    pub async fn build(&self, key: &str, context: &Path) -> Result<(), ExecError> {
        tracing::info!(image = %key, context = %context.display(), "building image");
        self.executor
            .exec_streaming(
                "docker",
                &[
                    "build".to_owned(),
                    "--force-rm".to_owned(),
                    "--rm".to_owned(),
                    "--no-cache=true".to_owned(),
                    "-t".to_owned(),
                    key.to_owned(),
                    context.to_string_lossy().into_owned(),
                ],
                None,
            )
            .await
    }

    /// Save the image to a portable archive at `archive`.
    pub async fn save(&self, key: &str, archive: &Path) -> Result<(), ExecError> {
        tracing::info!(image = %key, archive = %archive.display(), "saving image");
        self.executor
            .exec_streaming(
                "docker",
                &[
                    "save".to_owned(),
                    "-o".to_owned(),
                    archive.to_string_lossy().into_owned(),
                    key.to_owned(),
                ],
                None,
            )
            .await
    }
}

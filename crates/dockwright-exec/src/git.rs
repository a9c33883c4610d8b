use std::path::Path;
use std::time::Duration;

use crate::executor::{CommandExecutor, ExecError, RealExecutor};

/// Upper bound on a single checkout; network I/O must not hang a run forever.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Clone-or-update executor for the project repositories images depend on.
///
/// Checkouts land in the workspace project directory under the repository
/// name and persist across runs, so a second run only pulls.
pub struct SourceCheckout<E: CommandExecutor = RealExecutor> {
    executor: E,
    timeout: Duration,
}

impl SourceCheckout<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for SourceCheckout<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> SourceCheckout<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory name a repository URL checks out into: the last path
    /// segment, minus a `.git` suffix.
    pub fn project_name(url: &str) -> String {
        let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
        last.trim_end_matches(".git").to_owned()
    }

    /// Clone `url` into the project directory, or pull if it is already
    /// checked out there.
    pub async fn checkout(&self, url: &str, project_dir: &Path) -> Result<(), ExecError> {
        let name = Self::project_name(url);
        let target = project_dir.join(&name);

        if target.is_dir() {
            tracing::info!(project = %name, "updating project");
            self.bounded(self.executor.exec_streaming(
                "git",
                &["pull".to_owned()],
                Some(target.clone()),
            ))
            .await
        } else {
            tracing::info!(project = %name, "cloning project");
            self.bounded(self.executor.exec_streaming(
                "git",
                &[
                    "clone".to_owned(),
                    "--recursive".to_owned(),
                    url.to_owned(),
                    target.to_string_lossy().into_owned(),
                ],
                None,
            ))
            .await
        }
    }

    /// Probe the remote without touching the checkout; the dry-run variant.
    pub async fn list_remote(&self, url: &str) -> Result<(), ExecError> {
        let output = self
            .bounded(self.executor.exec(
                "git",
                &["ls-remote".to_owned(), url.to_owned()],
                None,
            ))
            .await?;
        tracing::info!(url = %url, refs = output.lines().count(), "remote reachable");
        Ok(())
    }

    async fn bounded<T>(
        &self,
        invocation: impl Future<Output = Result<T, ExecError>>,
    ) -> Result<T, ExecError> {
        match tokio::time::timeout(self.timeout, invocation).await {
            Ok(result) => result,
            Err(_) => Err(ExecError::TimedOut {
                program: "git".to_owned(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_strips_git_suffix() {
        assert_eq!(
            SourceCheckout::<RealExecutor>::project_name("https://github.com/acme/site.git"),
            "site"
        );
    }

    #[test]
    fn project_name_without_suffix() {
        assert_eq!(
            SourceCheckout::<RealExecutor>::project_name("https://github.com/acme/site"),
            "site"
        );
    }

    #[test]
    fn project_name_ignores_trailing_slash() {
        assert_eq!(
            SourceCheckout::<RealExecutor>::project_name("https://github.com/acme/site.git/"),
            "site"
        );
    }
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{program} not found — is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} {args:?} failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        status: String,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("{program} timed out after {seconds}s")]
    TimedOut { program: String, seconds: u64 },
}

/// Abstraction over subprocess execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
/// The working directory is passed per invocation; nothing ever mutates the
/// process-wide current directory.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command and capture stdout.
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<PathBuf>,
    ) -> Result<String, ExecError>;

    /// Run a command, streaming output to the terminal.
    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<PathBuf>,
    ) -> Result<(), ExecError>;
}

/// Real subprocess executor.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<PathBuf>,
    ) -> Result<String, ExecError> {
        use std::process::Stdio;

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| ExecError::NotFound {
            program: program.to_owned(),
            source: e,
        })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
                program: program.to_owned(),
                source: e,
            })
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }

    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<PathBuf>,
    ) -> Result<(), ExecError> {
        use std::process::Stdio;

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let status = command.status().await.map_err(|e| ExecError::NotFound {
            program: program.to_owned(),
            source: e,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                status: status.to_string(),
                stderr: String::new(),
            })
        }
    }
}

use std::fs::File;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::command::CommandResult;
use crate::error::{AppError, AppResult};
use crate::services::{Invocation, ProcessRunner};

/// Spawns real processes with `tokio::process`.
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(&self, invocation: &Invocation) -> AppResult<CommandResult> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        match &invocation.stdin_file {
            Some(path) => {
                let file = File::open(path)?;
                command.stdin(Stdio::from(file));
            }
            None => {
                command.stdin(Stdio::null());
            }
        }

        let output = command.output().await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                AppError::Configuration(format!(
                    "'{}' not found; check p4_executable or PATH",
                    invocation.program
                ))
            } else {
                AppError::Io(err)
            }
        })?;

        debug!(
            program = %invocation.program,
            args = %invocation.arg_line(),
            status = ?output.status.code(),
            "process finished"
        );

        Ok(CommandResult::from_streams(
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn captures_both_streams_and_ignores_exit_code() {
        let runner = SubprocessRunner::new();
        let result = runner
            .run(&Invocation::new("sh", ["-c", "echo out; exit 3"]))
            .await
            .unwrap();
        assert!(result.succeeded);
        assert_eq!(result.output, "out\n");

        let result = runner
            .run(&Invocation::new("sh", ["-c", "echo bad >&2"]))
            .await
            .unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.error, "bad\n");
    }

    #[tokio::test]
    async fn feeds_stdin_from_file_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("form.txt");
        let mut file = File::create(&input).unwrap();
        writeln!(file, "Description:").unwrap();

        let result = SubprocessRunner::new()
            .run(
                &Invocation::new("sh", ["-c", "cat; pwd"])
                    .in_dir(dir.path())
                    .with_stdin_file(&input),
            )
            .await
            .unwrap();
        assert!(result.output.starts_with("Description:\n"));
    }

    #[tokio::test]
    async fn missing_program_is_a_configuration_error() {
        let err = SubprocessRunner::new()
            .run(&Invocation::new("p4edit-no-such-binary", ["info"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}

use crate::error::{AppError, AppResult};

/// Captured output of one CLI invocation.
///
/// The CLI does not set exit codes reliably, so success is decided by the
/// error stream alone: any non-blank stderr is a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub succeeded: bool,
    pub output: String,
    pub error: String,
}

impl CommandResult {
    pub fn from_streams(output: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            succeeded: error.trim().is_empty(),
            output: output.into(),
            error,
        }
    }

    #[cfg(test)]
    pub fn success(output: impl Into<String>) -> Self {
        Self::from_streams(output, "")
    }

    #[cfg(test)]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::from_streams("", error)
    }

    /// Output of a mutating step; stderr becomes `CommandFailed`.
    pub fn into_output(self) -> AppResult<String> {
        if self.succeeded {
            Ok(self.output)
        } else {
            Err(AppError::CommandFailed(self.error.trim().to_string()))
        }
    }

    /// Output of an informational query; stderr becomes `QueryFailed`.
    pub fn into_query(self) -> AppResult<String> {
        if self.succeeded {
            Ok(self.output)
        } else {
            Err(AppError::QueryFailed(self.error.trim().to_string()))
        }
    }
}

use std::path::PathBuf;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Success,
    Failure,
    /// Fire-and-forget results such as launching an external diff tool.
    Informational,
}

/// What the editor should do with the current view once an operation
/// finished. The core never touches views itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    None,
    ReloadBuffer,
    CloseView,
    ReopenAs(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    pub status: ReportStatus,
    pub message: String,
    pub editor_action: EditorAction,
}

impl OperationReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Success,
            message: message.into(),
            editor_action: EditorAction::None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Failure,
            message: message.into(),
            editor_action: EditorAction::None,
        }
    }

    pub fn informational(message: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Informational,
            message: message.into(),
            editor_action: EditorAction::None,
        }
    }

    pub fn with_action(mut self, action: EditorAction) -> Self {
        self.editor_action = action;
        self
    }

    /// Flattens an operation result into the (status, message) surface.
    /// Editor actions only ride along with successes.
    pub fn from_result(result: AppResult<OperationReport>) -> Self {
        match result {
            Ok(report) => report,
            Err(err) => Self::failure(err.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ReportStatus::Failure
    }
}

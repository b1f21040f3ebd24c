use std::path::PathBuf;

use clap::Subcommand;

use crate::context::AppContext;
use crate::domain::classification::FileClassification;
use crate::domain::report::OperationReport;
use crate::error::AppResult;
use crate::logging::emit;
use crate::workflow::classify::classify_path;
use crate::workflow::operations;
use crate::workflow::triggers::{CheckoutTrigger, FileCommand, checkout_on, run_file_command};

#[derive(Subcommand, Debug, Clone)]
pub enum FileOperation {
    /// Open a read-only file under the client root for edit.
    Checkout { file: PathBuf },
    /// Mark a file for add.
    Add { file: PathBuf },
    /// Rename a file by integrating it to the new name and deleting the old one.
    Rename { from: PathBuf, to: PathBuf },
    /// Open a file for delete.
    Delete { file: PathBuf },
    /// Discard local changes to an opened file.
    Revert { file: PathBuf },
    /// Print the diff against the depot revision.
    Diff { file: PathBuf },
    /// Open the depot revision and the local file in the graphical diff tool.
    GraphicalDiff { file: PathBuf },
    /// Print whether a file is tracked, pending add or not managed.
    Classify { file: PathBuf },
}

pub async fn run(ctx: &AppContext, operation: FileOperation) -> AppResult<bool> {
    let report = match operation {
        FileOperation::Checkout { file } => {
            checkout_on(ctx, CheckoutTrigger::Explicit, &file, true)
                .await
                .unwrap_or_else(|| OperationReport::informational(""))
        }
        FileOperation::Add { file } => run_file_command(ctx, FileCommand::Add, &file).await,
        FileOperation::Rename { from, to } => {
            OperationReport::from_result(operations::rename(ctx, &from, &to).await)
        }
        FileOperation::Delete { file } => run_file_command(ctx, FileCommand::Delete, &file).await,
        FileOperation::Revert { file } => run_file_command(ctx, FileCommand::Revert, &file).await,
        FileOperation::Diff { file } => run_file_command(ctx, FileCommand::Diff, &file).await,
        FileOperation::GraphicalDiff { file } => {
            run_file_command(ctx, FileCommand::GraphicalDiff, &file).await
        }
        FileOperation::Classify { file } => match classify_path(ctx, &file).await? {
            FileClassification::QueryFailed(reason) => OperationReport::failure(reason),
            classification => OperationReport::success(classification.as_str()),
        },
    };

    emit(&ctx.config, &report);
    Ok(!report.is_failure())
}

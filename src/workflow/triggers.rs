//! Entry points bound to editor events and commands. Every checkout
//! trigger funnels into `operations::checkout`; the triggers only decide
//! whether to call it.

use std::path::Path;

use tracing::debug;

use crate::context::AppContext;
use crate::domain::changelist::ChangelistId;
use crate::domain::classification::FileClassification;
use crate::domain::report::OperationReport;
use crate::error::{AppError, AppResult};
use crate::workflow::classify::{classify, require_in_depot, split_file_path, try_classify};
use crate::workflow::operations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutTrigger {
    /// The buffer was modified.
    Modified,
    /// The buffer is about to be saved.
    Save,
    /// The user asked for it.
    Explicit,
}

/// `None` means the trigger decided not to act; nothing to report.
pub async fn checkout_on(
    ctx: &AppContext,
    trigger: CheckoutTrigger,
    path: &Path,
    dirty: bool,
) -> Option<OperationReport> {
    let config = &ctx.config;
    let enabled = match trigger {
        CheckoutTrigger::Modified => config.auto_checkout && config.auto_checkout_on_modified,
        CheckoutTrigger::Save => config.auto_checkout && config.auto_checkout_on_save,
        CheckoutTrigger::Explicit => true,
    };
    if !enabled {
        debug!(?trigger, "checkout trigger disabled");
        return None;
    }

    if trigger != CheckoutTrigger::Explicit {
        if !dirty {
            return None;
        }
        // Edits to a writable file need no checkout; stay quiet.
        if trigger == CheckoutTrigger::Modified
            && operations::is_writable(path).await.unwrap_or(false)
        {
            return None;
        }
    }

    Some(OperationReport::from_result(
        operations::checkout(ctx, path).await,
    ))
}

/// Classification taken before the save hits the disk; a new file is
/// `PendingAdd` only until it has been written. `None` when auto add is
/// switched off.
pub async fn auto_add_pre_save(
    ctx: &AppContext,
    path: &Path,
) -> AppResult<Option<FileClassification>> {
    if !ctx.config.auto_add {
        return Ok(None);
    }
    let (folder, filename) = split_file_path(path)?;
    Ok(Some(classify(ctx, &folder, &filename).await))
}

pub async fn auto_add_post_save(
    ctx: &AppContext,
    path: &Path,
    before_save: &FileClassification,
) -> Option<OperationReport> {
    if *before_save != FileClassification::PendingAdd {
        return None;
    }
    let result = match split_file_path(path) {
        Ok((folder, filename)) => operations::add(ctx, &folder, &filename).await,
        Err(err) => Err(err),
    };
    Some(OperationReport::from_result(result))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCommand {
    Add,
    Delete,
    Revert,
    Diff,
    GraphicalDiff,
}

/// Explicit per-file commands: accepted for tracked and pending-add files.
pub async fn run_file_command(
    ctx: &AppContext,
    command: FileCommand,
    path: &Path,
) -> OperationReport {
    OperationReport::from_result(file_command(ctx, command, path).await)
}

async fn file_command(
    ctx: &AppContext,
    command: FileCommand,
    path: &Path,
) -> AppResult<OperationReport> {
    let (folder, filename) = split_file_path(path)?;
    require_in_depot(ctx, &folder, &filename).await?;

    match command {
        FileCommand::Add => operations::add(ctx, &folder, &filename).await,
        FileCommand::Delete => operations::delete(ctx, &folder, &filename).await,
        FileCommand::Revert => operations::revert(ctx, &folder, &filename).await,
        FileCommand::Diff => operations::diff(ctx, &folder, &filename).await,
        FileCommand::GraphicalDiff => operations::graphical_diff(ctx, &folder, &filename).await,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    Existing(ChangelistId),
    New { description: String },
}

/// Moves the current file; only tracked files can change changelist.
pub async fn move_current_file(ctx: &AppContext, path: &Path, target: &MoveTarget) -> OperationReport {
    OperationReport::from_result(move_file(ctx, path, target).await)
}

async fn move_file(ctx: &AppContext, path: &Path, target: &MoveTarget) -> AppResult<OperationReport> {
    let (folder, filename) = split_file_path(path)?;
    if try_classify(ctx, &folder, &filename).await? != FileClassification::Tracked {
        return Err(AppError::NotTracked);
    }

    match target {
        MoveTarget::Existing(id) => operations::move_to_changelist(ctx, path, id).await,
        MoveTarget::New { description } => {
            operations::move_to_new_changelist(ctx, path, description).await
        }
    }
}

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::context::AppContext;
use crate::domain::classification::FileClassification;
use crate::error::{AppError, AppResult};
use crate::logging::{emit, warn_user};
use crate::workflow::triggers::{
    CheckoutTrigger, auto_add_post_save, auto_add_pre_save, checkout_on,
};

#[derive(Subcommand, Debug, Clone)]
pub enum HookEvent {
    /// The buffer of FILE was modified.
    Modified {
        file: PathBuf,
        /// The buffer has no unsaved changes.
        #[arg(long)]
        clean: bool,
    },
    /// FILE is about to be saved. Prints `classification: <name>` for the
    /// post-save hook.
    PreSave {
        file: PathBuf,
        #[arg(long)]
        clean: bool,
    },
    /// FILE was saved; BEFORE is the classification printed by pre-save.
    PostSave {
        file: PathBuf,
        #[arg(long)]
        before: String,
    },
}

pub async fn run(ctx: &AppContext, event: HookEvent) -> AppResult<bool> {
    match event {
        HookEvent::Modified { file, clean } => {
            Ok(checkout_if_triggered(ctx, CheckoutTrigger::Modified, &file, !clean).await)
        }
        HookEvent::PreSave { file, clean } => {
            let checked_out =
                checkout_if_triggered(ctx, CheckoutTrigger::Save, &file, !clean).await;

            match auto_add_pre_save(ctx, &file).await {
                Ok(Some(classification)) => {
                    println!("classification: {}", classification.as_str())
                }
                Ok(None) => warn_user(&ctx.config, "Auto Add disabled"),
                Err(err) => return Err(err),
            }
            Ok(checked_out)
        }
        HookEvent::PostSave { file, before } => {
            let before = FileClassification::from_name(&before).ok_or_else(|| {
                AppError::Configuration(format!("unknown classification '{before}'"))
            })?;
            match auto_add_post_save(ctx, &file, &before).await {
                Some(report) => {
                    emit(&ctx.config, &report);
                    Ok(!report.is_failure())
                }
                None => Ok(true),
            }
        }
    }
}

async fn checkout_if_triggered(
    ctx: &AppContext,
    trigger: CheckoutTrigger,
    file: &Path,
    dirty: bool,
) -> bool {
    match checkout_on(ctx, trigger, file, dirty).await {
        Some(report) => {
            emit(&ctx.config, &report);
            !report.is_failure()
        }
        None => true,
    }
}

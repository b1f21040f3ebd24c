use std::path::PathBuf;

use clap::Subcommand;

use crate::context::AppContext;
use crate::domain::changelist::ChangelistId;
use crate::domain::report::OperationReport;
use crate::error::{AppError, AppResult};
use crate::logging::{emit, warn_user};
use crate::workflow::listing::{PendingListing, spawn_listing};
use crate::workflow::operations;
use crate::workflow::triggers::{MoveTarget, move_current_file};

#[derive(Subcommand, Debug, Clone)]
pub enum ChangelistCommand {
    /// Create an empty numbered changelist.
    Create {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Append a line to a changelist's description.
    Append {
        changelist: String,
        #[arg(required = true, num_args = 1..)]
        line: Vec<String>,
    },
    /// Move an opened file to another changelist ("default", a number, or "new").
    Move {
        file: PathBuf,
        changelist: String,
        /// Description of the changelist to create when moving to "new".
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List your pending changelists and the files opened in them.
    List,
    /// List every opened file across your pending changelists.
    Opened,
    /// Print the entries of a changelist picker.
    Choices,
}

pub async fn run(ctx: &AppContext, command: ChangelistCommand) -> AppResult<bool> {
    let report = match command {
        ChangelistCommand::Create { description } => OperationReport::from_result(
            operations::create_changelist(ctx, &description.join(" ")).await,
        ),
        ChangelistCommand::Append { changelist, line } => {
            OperationReport::from_result(
                operations::append_to_changelist_description(
                    ctx,
                    &ChangelistId::parse(&changelist),
                    &line.join(" "),
                )
                .await,
            )
        }
        ChangelistCommand::Move {
            file,
            changelist,
            description,
        } => {
            let target = if changelist.eq_ignore_ascii_case("new") {
                let Some(description) = description else {
                    return Err(AppError::Configuration(
                        "moving to a new changelist needs --description".to_string(),
                    ));
                };
                MoveTarget::New { description }
            } else {
                MoveTarget::Existing(ChangelistId::parse(&changelist))
            };
            move_current_file(ctx, &file, &target).await
        }
        ChangelistCommand::List => {
            let listing = fetch_listing(ctx).await?;
            listing_report(ctx, listing, format_records)
        }
        ChangelistCommand::Opened => {
            let listing = fetch_listing(ctx).await?;
            listing_report(ctx, listing, format_opened_files)
        }
        ChangelistCommand::Choices => {
            let listing = fetch_listing(ctx).await?;
            listing_report(ctx, listing, |listing| listing.changelist_choices().join("\n"))
        }
    };

    emit(&ctx.config, &report);
    Ok(!report.is_failure())
}

/// The listing runs on its own task; awaiting the handle here is the
/// delivery step.
async fn fetch_listing(ctx: &AppContext) -> AppResult<PendingListing> {
    spawn_listing(ctx.clone())
        .await
        .map_err(|err| AppError::QueryFailed(format!("listing task failed: {err}")))
}

fn listing_report(
    ctx: &AppContext,
    listing: PendingListing,
    format: impl Fn(&PendingListing) -> String,
) -> OperationReport {
    match (&listing.failure, listing.records.is_empty()) {
        (Some(err), true) => OperationReport::failure(err.to_string()),
        (failure, _) => {
            if let Some(err) = failure {
                warn_user(&ctx.config, &format!("listing is incomplete: {err}"));
            }
            let text = format(&listing);
            if text.is_empty() {
                OperationReport::informational("There are no checked out files to list.")
            } else {
                OperationReport::success(text)
            }
        }
    }
}

fn format_records(listing: &PendingListing) -> String {
    let mut lines = Vec::new();
    for record in &listing.records {
        lines.push(format!("Changelist {} - {}", record.id, record.description));
        for file in &record.files {
            lines.push(format!("\t{}\t{}", file.display_name, file.local_path.display()));
        }
    }
    lines.join("\n")
}

fn format_opened_files(listing: &PendingListing) -> String {
    listing
        .opened_files()
        .iter()
        .map(|file| {
            format!(
                "{}\t{}\t{}\t{}",
                file.display_name,
                file.changelist_label,
                file.description_summary,
                file.local_path.display()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

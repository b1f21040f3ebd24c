use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::domain::changelist::{
    ChangelistId, ChangelistRecord, FileEntry, PendingChange, depot_relative_path,
};
use crate::domain::client::ClientInfo;
use crate::error::AppError;
use crate::workflow::classify::query_client_info;

const DEFAULT_DESCRIPTION: &str = "Default Changelist";

/// Pending changelists of the current user, default first, then in the
/// order the CLI returned them (newest first). `failure` is set when a
/// query failed; `records` then holds whatever was gathered before it.
#[derive(Debug)]
pub struct PendingListing {
    pub records: Vec<ChangelistRecord>,
    pub failure: Option<AppError>,
}

impl PendingListing {
    pub fn opened_files(&self) -> Vec<FileEntry> {
        self.records
            .iter()
            .flat_map(|record| record.files.iter().cloned())
            .collect()
    }

    /// Picker entries for moving a file: `New`, `Default`, then every
    /// numbered changelist, oldest first.
    pub fn changelist_choices(&self) -> Vec<String> {
        let mut choices = vec!["New".to_string(), "Default".to_string()];
        choices.extend(self.records.iter().rev().filter_map(|record| match &record.id {
            ChangelistId::Default => None,
            ChangelistId::Numbered(number) => {
                Some(format!("Changelist {number} - {}", record.description))
            }
        }));
        choices
    }
}

pub async fn list_pending_changelists(ctx: &AppContext) -> PendingListing {
    let mut records = Vec::new();

    let info = match query_client_info(ctx).await {
        Ok(info) => info,
        Err(err) => {
            return PendingListing {
                records,
                failure: Some(err),
            };
        }
    };

    records.push(
        build_record(
            ctx,
            &info,
            ChangelistId::Default,
            DEFAULT_DESCRIPTION.to_string(),
        )
        .await,
    );

    let changes = ctx
        .runner
        .run(&ctx.p4(["changes", "-s", "pending", "-u", info.user_name.as_str()]))
        .await
        .and_then(|result| result.into_query());

    let output = match changes {
        Ok(output) => output,
        Err(err) => {
            return PendingListing {
                records,
                failure: Some(err),
            };
        }
    };

    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let Some(change) = PendingChange::parse_line(line) else {
            warn!(line, "skipping unrecognised changes line");
            continue;
        };
        let record = build_record(
            ctx,
            &info,
            ChangelistId::Numbered(change.number),
            change.description,
        )
        .await;
        records.push(record);
    }

    PendingListing {
        records,
        failure: None,
    }
}

/// Runs the listing on its own task. The caller awaits the handle from
/// whatever loop owns its interface and delivers the result from there.
pub fn spawn_listing(ctx: AppContext) -> JoinHandle<PendingListing> {
    tokio::spawn(async move { list_pending_changelists(&ctx).await })
}

/// A failed `p4 opened` leaves the changelist listed with no files.
async fn build_record(
    ctx: &AppContext,
    info: &ClientInfo,
    id: ChangelistId,
    description: String,
) -> ChangelistRecord {
    let opened = ctx
        .runner
        .run(&ctx.p4(["opened", "-c", id.as_str()]))
        .await
        .and_then(|result| result.into_query());

    let files = match opened {
        Ok(output) => output
            .lines()
            .filter_map(|line| file_entry(info, &id, &description, line))
            .collect(),
        Err(err) => {
            debug!(changelist = %id, error = %err, "no opened files listed");
            Vec::new()
        }
    };

    ChangelistRecord {
        id,
        description,
        files,
    }
}

fn file_entry(
    info: &ClientInfo,
    id: &ChangelistId,
    description: &str,
    line: &str,
) -> Option<FileEntry> {
    let relative = depot_relative_path(line)?;
    let display_name = relative
        .rsplit('/')
        .next()
        .unwrap_or(relative.as_str())
        .to_string();

    Some(FileEntry {
        display_name,
        changelist_label: format!("Changelist: {id}"),
        description_summary: description.to_string(),
        local_path: info.resolve(&relative),
    })
}

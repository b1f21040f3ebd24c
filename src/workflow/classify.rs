use std::path::{Path, PathBuf};

use tracing::debug;

use crate::context::AppContext;
use crate::domain::classification::FileClassification;
use crate::domain::client::ClientInfo;
use crate::error::{AppError, AppResult};
use crate::parser::{CLIENT_ROOT_LABEL, USER_NAME_LABEL, extract_field};

/// Runs `p4 info` and reads the user and client root out of it.
pub async fn query_client_info(ctx: &AppContext) -> AppResult<ClientInfo> {
    let output = ctx.runner.run(&ctx.p4(["info"])).await?.into_query()?;

    let user_name = extract_field(&output, USER_NAME_LABEL)
        .ok_or_else(|| AppError::unexpected("p4 info", "User name"))?;
    let client_root = extract_field(&output, CLIENT_ROOT_LABEL)
        .ok_or_else(|| AppError::unexpected("p4 info", "Client root"))?;

    Ok(ClientInfo {
        user_name: user_name.to_string(),
        client_root: client_root.to_string(),
    })
}

/// Classifies `folder/filename` against a freshly queried client root.
/// Nothing is cached between calls.
pub async fn classify(ctx: &AppContext, folder: &Path, filename: &str) -> FileClassification {
    match try_classify(ctx, folder, filename).await {
        Ok(classification) => classification,
        Err(AppError::QueryFailed(raw)) => FileClassification::QueryFailed(raw),
        Err(err) => FileClassification::QueryFailed(err.to_string()),
    }
}

/// Like `classify`, but a failed or unparseable `p4 info` stays an error
/// of its own kind. Never returns `QueryFailed` as a classification.
pub async fn try_classify(
    ctx: &AppContext,
    folder: &Path,
    filename: &str,
) -> AppResult<FileClassification> {
    let info = query_client_info(ctx).await?;

    let in_root = info.contains_folder(folder);
    let exists = is_file(&folder.join(filename)).await;
    let classification = FileClassification::from_checks(in_root, exists);

    debug!(
        folder = %folder.display(),
        filename,
        root = %info.client_root,
        classification = classification.as_str(),
        "classified path"
    );
    Ok(classification)
}

pub async fn classify_path(ctx: &AppContext, path: &Path) -> AppResult<FileClassification> {
    let (folder, filename) = split_file_path(path)?;
    Ok(classify(ctx, &folder, &filename).await)
}

/// Fails with `NotTracked` unless the file is tracked or pending add;
/// query errors pass through unchanged.
pub async fn require_in_depot(ctx: &AppContext, folder: &Path, filename: &str) -> AppResult<()> {
    if try_classify(ctx, folder, filename).await?.is_in_depot() {
        Ok(())
    } else {
        Err(AppError::NotTracked)
    }
}

/// Splits into an absolute folder and a bare filename. Relative paths are
/// resolved against the current directory so they can be compared with
/// the client root.
pub fn split_file_path(path: &Path) -> AppResult<(PathBuf, String)> {
    let path = std::path::absolute(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            AppError::Configuration(format!("'{}' does not name a file", path.display()))
        })?;
    let folder = path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            AppError::Configuration(format!("'{}' has no parent folder", path.display()))
        })?;
    Ok((folder, filename))
}

pub(crate) async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

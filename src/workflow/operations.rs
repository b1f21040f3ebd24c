use std::path::Path;

use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::changelist::{ChangelistId, created_changelist_number};
use crate::domain::classification::FileClassification;
use crate::domain::report::{EditorAction, OperationReport};
use crate::error::{AppError, AppResult};
use crate::infra::scratch::ScratchFile;
use crate::services::Invocation;
use crate::workflow::classify::{is_file, split_file_path, try_classify};
use crate::workflow::form::{append_description_line, new_changelist_form};

const FORM_PREFIX: &str = "p4edit-change-";
const FORM_SUFFIX: &str = ".txt";

/// Runs `p4 <command> <filename>` from the file's folder.
async fn command_on_file(
    ctx: &AppContext,
    command: &str,
    folder: &Path,
    filename: &str,
) -> AppResult<String> {
    let invocation = ctx.p4([command, filename]).in_dir(folder);
    let output = ctx.runner.run(&invocation).await?.into_output()?;
    Ok(output.trim().to_string())
}

/// Opens a tracked, read-only file for edit.
pub async fn checkout(ctx: &AppContext, path: &Path) -> AppResult<OperationReport> {
    let (folder, filename) = split_file_path(path)?;

    if try_classify(ctx, &folder, &filename).await? != FileClassification::Tracked {
        return Err(AppError::NotTracked);
    }

    if is_writable(path).await? {
        return Err(AppError::AlreadyWritable);
    }

    let output = command_on_file(ctx, "edit", &folder, &filename).await?;
    Ok(OperationReport::success(output))
}

/// Marks a file for add. Callers decide whether the file is pending add.
pub async fn add(ctx: &AppContext, folder: &Path, filename: &str) -> AppResult<OperationReport> {
    let output = command_on_file(ctx, "add", folder, filename).await?;
    Ok(OperationReport::success(output))
}

/// Integrates `old` into `new` deleting the source, then opens both for
/// delete. A failed integrate stops the sequence; a failed delete leaves
/// the integrate in place.
pub async fn rename(ctx: &AppContext, old: &Path, new: &Path) -> AppResult<OperationReport> {
    let old_arg = old.to_string_lossy().into_owned();
    let new_arg = new.to_string_lossy().into_owned();

    let integrate = ctx.p4([
        "integrate",
        "-d",
        "-t",
        "-Di",
        "-f",
        old_arg.as_str(),
        new_arg.as_str(),
    ]);
    let integrated = ctx.runner.run(&integrate).await?.into_output()?;
    debug!(output = integrated.trim(), "integrate step finished");

    let delete = ctx.p4(["delete", old_arg.as_str(), new_arg.as_str()]);
    let output = ctx.runner.run(&delete).await?.into_output()?;

    Ok(OperationReport::success(output.trim())
        .with_action(EditorAction::ReopenAs(new.to_path_buf())))
}

/// Opens a file for delete and checks that it is gone from disk.
pub async fn delete(ctx: &AppContext, folder: &Path, filename: &str) -> AppResult<OperationReport> {
    let output = command_on_file(ctx, "delete", folder, filename).await?;

    if is_file(&folder.join(filename)).await {
        return Err(AppError::PostconditionFailed(format!(
            "{output} (the file is still on disk)"
        )));
    }

    Ok(OperationReport::success(output).with_action(EditorAction::CloseView))
}

pub async fn revert(ctx: &AppContext, folder: &Path, filename: &str) -> AppResult<OperationReport> {
    let output = command_on_file(ctx, "revert", folder, filename).await?;
    Ok(OperationReport::success(output).with_action(EditorAction::ReloadBuffer))
}

pub async fn diff(ctx: &AppContext, folder: &Path, filename: &str) -> AppResult<OperationReport> {
    let output = command_on_file(ctx, "diff", folder, filename).await?;
    Ok(OperationReport::success(output))
}

/// Prints the depot revision to a temporary file and hands both files to
/// the configured diff tool.
pub async fn graphical_diff(
    ctx: &AppContext,
    folder: &Path,
    filename: &str,
) -> AppResult<OperationReport> {
    let content = command_on_file(ctx, "print", folder, filename).await?;

    // First line is the `//depot/path#rev - action` header.
    let depot_lines: Vec<&str> = content.lines().skip(1).collect();
    let depot_copy = ScratchFile::with_lines(
        "depot-",
        &format!("-{filename}"),
        &depot_lines,
        &ctx.config.end_line_separator,
    )?;

    let local_path = folder.join(filename);
    let depot_path = depot_copy.path().to_string_lossy().into_owned();
    let depot_name = depot_copy.file_name();
    let local = local_path.to_string_lossy().into_owned();

    let tokens: Vec<String> = split_command_line(&ctx.config.graphical_diff_command)
        .into_iter()
        .map(|token| {
            token
                .replace("%depofile_path", &depot_path)
                .replace("%depofile_name", &depot_name)
                .replace("%file_path", &local)
                .replace("%file_name", filename)
        })
        .collect();

    let Some((program, args)) = tokens.split_first() else {
        return Err(AppError::Configuration(
            "graphical_diff_command is empty".to_string(),
        ));
    };

    let invocation = Invocation::new(program.clone(), args.iter().cloned()).in_dir(folder);
    let command = invocation.to_string();
    let result = ctx.runner.run(&invocation).await?;
    if !result.succeeded {
        debug!(error = result.error.trim(), "diff tool reported an error");
    }

    Ok(OperationReport::informational(format!(
        "Executing command {command}"
    )))
}

/// Creates a numbered changelist holding no files. The returned message is
/// the CLI's confirmation, `Change <n> created.`.
pub async fn create_changelist(ctx: &AppContext, description: &str) -> AppResult<OperationReport> {
    let template = ctx
        .runner
        .run(&ctx.p4(["change", "-o"]))
        .await?
        .into_output()?;

    let form = new_changelist_form(&template, description)?;
    let confirmation = submit_form(ctx, &form).await?;
    Ok(OperationReport::success(confirmation))
}

pub async fn append_to_changelist_description(
    ctx: &AppContext,
    changelist: &ChangelistId,
    line: &str,
) -> AppResult<OperationReport> {
    let current = ctx
        .runner
        .run(&ctx.p4(["change", "-o", changelist.as_str()]))
        .await?
        .into_output()?;

    let form = append_description_line(&current, line)?;
    let confirmation = submit_form(ctx, &form).await?;
    Ok(OperationReport::success(confirmation))
}

/// Reopens a file into another changelist. Runs from the file's folder
/// because the CLI resolves the bare filename against it.
pub async fn move_to_changelist(
    ctx: &AppContext,
    path: &Path,
    changelist: &ChangelistId,
) -> AppResult<OperationReport> {
    let (folder, filename) = split_file_path(path)?;
    let invocation = ctx
        .p4(["reopen", "-c", changelist.as_str(), filename.as_str()])
        .in_dir(&folder);
    let output = ctx.runner.run(&invocation).await?.into_output()?;
    Ok(OperationReport::success(output.trim()))
}

pub async fn move_to_new_changelist(
    ctx: &AppContext,
    path: &Path,
    description: &str,
) -> AppResult<OperationReport> {
    let created = create_changelist(ctx, description).await?;
    let number = created_changelist_number(&created.message)
        .ok_or_else(|| AppError::unexpected("p4 change -i", "changelist number"))?;
    info!(changelist = %number, "created changelist");

    move_to_changelist(ctx, path, &ChangelistId::Numbered(number)).await
}

/// Writes the form to its own temporary file and feeds it to
/// `p4 change -i`. The file is removed on every path out of here.
async fn submit_form(ctx: &AppContext, lines: &[String]) -> AppResult<String> {
    let scratch = ScratchFile::with_lines(
        FORM_PREFIX,
        FORM_SUFFIX,
        lines,
        &ctx.config.end_line_separator,
    )?;
    let invocation = ctx.p4(["change", "-i"]).with_stdin_file(scratch.path());
    let output = ctx.runner.run(&invocation).await?.into_output()?;
    Ok(output.trim().to_string())
}

pub(crate) async fn is_writable(path: &Path) -> AppResult<bool> {
    let metadata = tokio::fs::metadata(path).await?;
    Ok(!metadata.permissions().readonly())
}

/// Whitespace split that keeps double-quoted runs together.
fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                has_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::domain::report::ReportStatus;
    use crate::testing::{ScriptedRunner, context_with, info_output};

    fn workspace_with(file: &str, read_only: bool) -> (tempfile::TempDir, PathBuf) {
        let ws = tempfile::tempdir().unwrap();
        let path = ws.path().join(file);
        fs::write(&path, "contents").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(read_only);
        fs::set_permissions(&path, permissions).unwrap();
        (ws, path)
    }

    const BLANK_TEMPLATE: &str = "# A Perforce Change Specification.\n#  Files:       What opened files from the default changelist are to be added\n\nChange:\tnew\n\nClient:\talice-ws\n\nUser:\talice\n\nStatus:\tnew\n\nDescription:\n\t<enter description here>\n\nFiles:\n\t//depot/main/a.txt\t# edit\n";

    const EXISTING_FORM: &str = "Change:\t4021\n\nClient:\talice-ws\n\nUser:\talice\n\nStatus:\tpending\n\nDescription:\n\tFix shader cache\n\nFiles:\n\t//depot/main/a.txt\t# edit\n";

    #[tokio::test]
    async fn checks_out_read_only_tracked_file() {
        let (ws, path) = workspace_with("main.rs", true);
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 info", &info_output("alice", &ws.path().to_string_lossy()))
            .ok("p4 edit", "//depot/main/main.rs#3 - opened for edit\n");
        let ctx = context_with(runner.clone());

        let report = checkout(&ctx, &path).await.unwrap();
        assert_eq!(report.message, "//depot/main/main.rs#3 - opened for edit");

        let calls = runner.calls();
        assert_eq!(calls[1].command, "p4 edit main.rs");
        assert_eq!(calls[1].working_dir.as_deref(), Some(ws.path()));
    }

    #[tokio::test]
    async fn checkout_refuses_writable_file() {
        let (ws, path) = workspace_with("main.rs", false);
        let runner = ScriptedRunner::new();
        runner.ok("p4 info", &info_output("alice", &ws.path().to_string_lossy()));
        let ctx = context_with(runner.clone());

        let err = checkout(&ctx, &path).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyWritable));
        assert_eq!(runner.commands(), vec!["p4 info"]);
    }

    #[tokio::test]
    async fn checkout_refuses_file_outside_root() {
        let (_ws, path) = workspace_with("main.rs", true);
        let runner = ScriptedRunner::new();
        runner.ok("p4 info", &info_output("alice", "/somewhere/else"));
        let ctx = context_with(runner);

        let err = checkout(&ctx, &path).await.unwrap_err();
        assert!(matches!(err, AppError::NotTracked));
    }

    #[tokio::test]
    async fn checkout_surfaces_query_failure() {
        let (_ws, path) = workspace_with("main.rs", true);
        let runner = ScriptedRunner::new();
        runner.fail("p4 info", "Perforce password (P4PASSWD) invalid or unset.");
        let ctx = context_with(runner);

        let err = checkout(&ctx, &path).await.unwrap_err();
        assert!(matches!(err, AppError::QueryFailed(_)));
    }

    #[tokio::test]
    async fn checkout_keeps_format_errors_distinct_from_query_failures() {
        let (_ws, path) = workspace_with("main.rs", true);
        let runner = ScriptedRunner::new();
        runner.ok("p4 info", "Client root: /ws\n");
        let ctx = context_with(runner.clone());

        let err = checkout(&ctx, &path).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::FormatUnexpected { command: "p4 info", expected: "User name" }
        ));
        assert_eq!(runner.commands(), vec!["p4 info"]);
    }

    #[tokio::test]
    async fn rename_halts_when_integrate_fails() {
        let runner = ScriptedRunner::new();
        runner.fail("p4 integrate", "/ws/missing.rs - no such file(s).\n");
        let ctx = context_with(runner.clone());

        let err = rename(&ctx, Path::new("/ws/missing.rs"), Path::new("/ws/found.rs"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "/ws/missing.rs - no such file(s).");
        assert_eq!(runner.commands().len(), 1);
        assert!(!runner.commands().iter().any(|c| c.starts_with("p4 delete")));
    }

    #[tokio::test]
    async fn rename_integrates_then_deletes_both_paths() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 integrate", "//depot/main/new.rs#1 - branch/sync from //depot/main/old.rs#2\n")
            .ok("p4 delete", "//depot/main/old.rs#2 - opened for delete\n");
        let ctx = context_with(runner.clone());

        let report = rename(&ctx, Path::new("/ws/old.rs"), Path::new("/ws/new.rs"))
            .await
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec![
                "p4 integrate -d -t -Di -f /ws/old.rs /ws/new.rs",
                "p4 delete /ws/old.rs /ws/new.rs",
            ]
        );
        assert_eq!(report.editor_action, EditorAction::ReopenAs(PathBuf::from("/ws/new.rs")));
    }

    #[tokio::test]
    async fn rename_fails_when_delete_step_errors() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 integrate", "ok\n")
            .fail("p4 delete", "//depot/main/old.rs - file(s) not opened on this client.\n");
        let ctx = context_with(runner);

        let err = rename(&ctx, Path::new("/ws/old.rs"), Path::new("/ws/new.rs"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CommandFailed(_)));
    }

    #[tokio::test]
    async fn delete_downgrades_when_file_survives() {
        let (ws, _path) = workspace_with("keep.txt", true);
        let runner = ScriptedRunner::new();
        runner.ok("p4 delete", "//depot/main/keep.txt#1 - opened for delete\n");
        let ctx = context_with(runner);

        let err = delete(&ctx, ws.path(), "keep.txt").await.unwrap_err();
        assert!(matches!(err, AppError::PostconditionFailed(_)));
    }

    #[tokio::test]
    async fn delete_succeeds_when_file_is_gone() {
        let ws = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.ok("p4 delete", "//depot/main/gone.txt#1 - opened for delete\n");
        let ctx = context_with(runner);

        let report = delete(&ctx, ws.path(), "gone.txt").await.unwrap();
        assert_eq!(report.editor_action, EditorAction::CloseView);
    }

    #[tokio::test]
    async fn revert_asks_editor_to_reload() {
        let runner = ScriptedRunner::new();
        runner.ok("p4 revert", "//depot/main/a.txt#3 - was edit, reverted\n");
        let ctx = context_with(runner);

        let report = revert(&ctx, Path::new("/ws"), "a.txt").await.unwrap();
        assert_eq!(report.editor_action, EditorAction::ReloadBuffer);
        assert_eq!(report.message, "//depot/main/a.txt#3 - was edit, reverted");
    }

    #[tokio::test]
    async fn creates_changelist_without_default_files() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 change -o", BLANK_TEMPLATE)
            .ok("p4 change -i", "Change 4022 created.\n");
        let ctx = context_with(runner.clone());

        let report = create_changelist(&ctx, "Refactor loader").await.unwrap();
        assert_eq!(report.message, "Change 4022 created.");

        let submitted = runner.calls()[1].stdin.clone().unwrap();
        assert!(submitted.contains("Description:\n\tRefactor loader"));
        assert!(!submitted.contains("//depot/main/a.txt"));
        assert!(!submitted.contains("<enter description here>"));
    }

    #[tokio::test]
    async fn form_file_is_removed_when_submit_fails() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 change -o", BLANK_TEMPLATE)
            .fail("p4 change -i", "Error in change specification.\n");
        let ctx = context_with(runner.clone());

        let err = create_changelist(&ctx, "x").await.unwrap_err();
        assert!(matches!(err, AppError::CommandFailed(_)));

        let form_path = runner.calls()[1].stdin_file.clone().unwrap();
        assert!(form_path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(FORM_PREFIX)));
        assert!(!form_path.exists());
    }

    #[tokio::test]
    async fn appends_line_and_resubmits_with_configured_separator() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 change -o 4021", EXISTING_FORM)
            .ok("p4 change -i", "Change 4021 updated.\n");
        let mut ctx = context_with(runner.clone());
        ctx.config.end_line_separator = "\r\n".to_string();

        let report = append_to_changelist_description(
            &ctx,
            &ChangelistId::Numbered("4021".to_string()),
            "Also fixes the loader",
        )
        .await
        .unwrap();
        assert_eq!(report.message, "Change 4021 updated.");

        let submitted = runner.calls()[1].stdin.clone().unwrap();
        assert!(submitted.contains(
            "\tFix shader cache\r\n\tAlso fixes the loader\r\n\r\nFiles:"
        ));
    }

    #[tokio::test]
    async fn moves_file_from_its_folder() {
        let runner = ScriptedRunner::new();
        runner.ok("p4 reopen", "//depot/main/a.txt#3 - reopened; change 4021\n");
        let ctx = context_with(runner.clone());

        move_to_changelist(
            &ctx,
            Path::new("/ws/main/a.txt"),
            &ChangelistId::Numbered("4021".to_string()),
        )
        .await
        .unwrap();

        let call = &runner.calls()[0];
        assert_eq!(call.command, "p4 reopen -c 4021 a.txt");
        assert_eq!(call.working_dir.as_deref(), Some(Path::new("/ws/main")));
    }

    #[tokio::test]
    async fn moves_file_into_freshly_created_changelist() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 change -o", BLANK_TEMPLATE)
            .ok("p4 change -i", "Change 4100 created.\n")
            .ok("p4 reopen", "//depot/main/a.txt#3 - reopened; change 4100\n");
        let ctx = context_with(runner.clone());

        let report = move_to_new_changelist(&ctx, Path::new("/ws/main/a.txt"), "Loader work")
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Success);
        assert_eq!(runner.commands()[2], "p4 reopen -c 4100 a.txt");
    }

    #[tokio::test]
    async fn graphical_diff_substitutes_placeholders_and_cleans_up() {
        let runner = ScriptedRunner::new();
        runner
            .ok("p4 print", "//depot/main/a.txt#3 - edit change 4021 (text)\nline one\nline two\n")
            .ok("meld", "");
        let mut ctx = context_with(runner.clone());
        ctx.config.graphical_diff_command =
            "meld \"%depofile_path\" %file_path --label=%depofile_name:%file_name".to_string();

        let report = graphical_diff(&ctx, Path::new("/ws/main"), "a.txt").await.unwrap();
        assert_eq!(report.status, ReportStatus::Informational);

        let command = runner.calls()[1].command.clone();
        assert!(command.starts_with("meld "));
        assert!(command.contains(" /ws/main/a.txt --label=depot-"));
        assert!(command.ends_with("-a.txt:a.txt"));
        assert!(!command.contains('%'));

        let depot_copy = command.split(' ').nth(1).unwrap().to_string();
        assert!(!Path::new(&depot_copy).exists());
    }

    #[test]
    fn splits_quoted_command_line() {
        assert_eq!(
            split_command_line("\"C:\\Program Files\\p4diff.exe\" -l %depofile_name  %file_path"),
            vec!["C:\\Program Files\\p4diff.exe", "-l", "%depofile_name", "%file_path"]
        );
        assert!(split_command_line("   ").is_empty());
    }
}

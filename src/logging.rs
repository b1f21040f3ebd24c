use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::domain::report::{EditorAction, OperationReport, ReportStatus};

/// Logs go to stderr so stdout stays free for results the editor reads.
pub fn init() {
    let filter = EnvFilter::try_from_env("P4EDIT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn warn_user(config: &AppConfig, message: &str) {
    if !config.warnings_enabled {
        return;
    }
    if config.log_warnings_to_status {
        eprintln!("Perforce [warning]: {message}");
    } else {
        warn!("{message}");
    }
}

pub fn log_report(config: &AppConfig, report: &OperationReport) {
    match report.status {
        ReportStatus::Success | ReportStatus::Informational => info!("{}", report.message),
        ReportStatus::Failure => warn_user(config, &report.message),
    }
}

/// Logs the report and prints it for the editor: the message, then one
/// `editor-action:` line when the view needs attention.
pub fn emit(config: &AppConfig, report: &OperationReport) {
    log_report(config, report);
    if !report.message.is_empty() {
        println!("{}", report.message);
    }
    if let Some(action) = action_line(&report.editor_action) {
        println!("{action}");
    }
}

fn action_line(action: &EditorAction) -> Option<String> {
    match action {
        EditorAction::None => None,
        EditorAction::ReloadBuffer => Some("editor-action: reload".to_string()),
        EditorAction::CloseView => Some("editor-action: close".to_string()),
        EditorAction::ReopenAs(path) => Some(format!("editor-action: open {}", path.display())),
    }
}

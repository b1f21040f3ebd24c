use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{StoredConfig, config_file_path, parse_flag};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration.
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring p4edit.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Yes/no answers accept yes, no, true, false, 1 or 0.");
    println!();

    apply_prompt("p4 executable", &mut cfg.p4_executable)?;
    apply_flag_prompt("Show warnings", &mut cfg.warnings_enabled)?;
    apply_flag_prompt(
        "Send warnings to the status line",
        &mut cfg.log_warnings_to_status,
    )?;
    apply_prompt(
        "Line separator for changelist forms (\\n or \\r\\n)",
        &mut cfg.end_line_separator,
    )?;
    apply_flag_prompt("Check out files automatically", &mut cfg.auto_checkout)?;
    apply_flag_prompt(
        "  ...when a buffer is modified",
        &mut cfg.auto_checkout_on_modified,
    )?;
    apply_flag_prompt("  ...when a buffer is saved", &mut cfg.auto_checkout_on_save)?;
    apply_flag_prompt("Add new files on first save", &mut cfg.auto_add)?;
    apply_prompt(
        "Graphical diff command (%depofile_path, %depofile_name, %file_path, %file_name)",
        &mut cfg.graphical_diff_command,
    )?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("p4 executable: {}", display_value(&cfg.p4_executable));
    println!("Warnings enabled: {}", display_flag(cfg.warnings_enabled));
    println!(
        "Warnings to status line: {}",
        display_flag(cfg.log_warnings_to_status)
    );
    println!(
        "Line separator: {}",
        display_value(&cfg.end_line_separator)
    );
    println!("Auto checkout: {}", display_flag(cfg.auto_checkout));
    println!(
        "Auto checkout on modify: {}",
        display_flag(cfg.auto_checkout_on_modified)
    );
    println!(
        "Auto checkout on save: {}",
        display_flag(cfg.auto_checkout_on_save)
    );
    println!("Auto add: {}", display_flag(cfg.auto_add));
    println!(
        "Graphical diff command: {}",
        display_value(&cfg.graphical_diff_command)
    );

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>) -> AppResult<()> {
    match prompt(field, target.as_deref())? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn apply_flag_prompt(field: &str, target: &mut Option<bool>) -> AppResult<()> {
    let current = target.map(|flag| if flag { "yes" } else { "no" });
    match prompt(field, current)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => match parse_flag(&value) {
            Some(flag) => *target = Some(flag),
            None => println!("  '{value}' is not a yes/no answer; keeping the current value."),
        },
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match current {
        Some(value) => write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?,
        None => write!(stdout, "{field} (Enter for default): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<default>".to_string())
}

fn display_flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "<default>",
    }
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

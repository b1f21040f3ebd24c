mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod parser;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::changelist::{self, ChangelistCommand};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::file::{self, FileOperation};
use crate::cmd::hook::{self, HookEvent};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::subprocess::SubprocessRunner;

#[derive(Parser)]
#[command(name = "p4edit", author, version, about = "Perforce helper for text editors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    File(FileOperation),
    /// Manage pending changelists.
    Changelist(ChangelistArgs),
    /// Entry points for editor save/modify events.
    Hook(HookArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ChangelistArgs {
    #[command(subcommand)]
    command: ChangelistCommand,
}

#[derive(Args)]
struct HookArgs {
    #[command(subcommand)]
    event: HookEvent,
}

#[tokio::main]
async fn main() {
    logging::init();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

async fn run() -> AppResult<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(true)
        }
        Commands::File(operation) => file::run(&build_context()?, operation).await,
        Commands::Changelist(args) => changelist::run(&build_context()?, args.command).await,
        Commands::Hook(args) => hook::run(&build_context()?, args.event).await,
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    Ok(AppContext::new(config, Arc::new(SubprocessRunner::new())))
}

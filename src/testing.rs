//! Scripted stand-in for the CLI used by unit tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::command::CommandResult;
use crate::error::AppResult;
use crate::services::{Invocation, ProcessRunner};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub working_dir: Option<PathBuf>,
    pub stdin_file: Option<PathBuf>,
    pub stdin: Option<String>,
}

/// Answers each invocation with the first rule whose pattern prefixes
/// `program args...`. Unmatched commands fail loudly through stderr.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<(String, CommandResult)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, pattern: &str, result: CommandResult) -> &Self {
        self.rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), result));
        self
    }

    pub fn ok(&self, pattern: &str, output: &str) -> &Self {
        self.respond(pattern, CommandResult::success(output))
    }

    pub fn fail(&self, pattern: &str, error: &str) -> &Self {
        self.respond(pattern, CommandResult::failure(error))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.command).collect()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> AppResult<CommandResult> {
        let command = format!("{} {}", invocation.program, invocation.arg_line());
        let stdin = invocation
            .stdin_file
            .as_ref()
            .map(|path| std::fs::read_to_string(path).unwrap());
        self.calls.lock().unwrap().push(RecordedCall {
            command: command.clone(),
            working_dir: invocation.working_dir.clone(),
            stdin_file: invocation.stdin_file.clone(),
            stdin,
        });

        let rules = self.rules.lock().unwrap();
        let result = rules
            .iter()
            .find(|(pattern, _)| command.starts_with(pattern.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| CommandResult::failure(format!("unexpected command: {command}")));
        Ok(result)
    }
}

pub fn context_with(runner: Arc<ScriptedRunner>) -> AppContext {
    AppContext::new(AppConfig::default(), runner)
}

pub fn info_output(user: &str, root: &str) -> String {
    format!(
        "User name: {user}\nClient name: {user}-ws\nClient host: build01\nClient root: {root}\nCurrent directory: {root}\nServer address: perforce:1666\n"
    )
}

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{Invocation, ProcessRunner};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub runner: Arc<dyn ProcessRunner>,
}

impl AppContext {
    pub fn new(config: AppConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// A `p4` invocation using the configured executable.
    pub fn p4<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(self.config.p4_executable.clone(), args)
    }
}

pub mod changelist;
pub mod config;
pub mod file;
pub mod hook;

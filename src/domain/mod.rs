pub mod changelist;
pub mod classification;
pub mod client;
pub mod command;
pub mod report;

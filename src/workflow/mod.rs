pub mod classify;
pub mod form;
pub mod listing;
pub mod operations;
pub mod triggers;

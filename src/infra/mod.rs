pub mod scratch;
pub mod subprocess;

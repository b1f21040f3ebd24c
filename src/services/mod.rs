pub mod process;

pub use process::{Invocation, ProcessRunner};

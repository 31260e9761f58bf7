//! CLI command implementations.

mod check;
mod serve;

pub use check::run_check;
pub use serve::run_serve;

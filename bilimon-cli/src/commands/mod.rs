//! Command implementations for the bilimon CLI

pub mod check_config;
pub mod extract;
pub mod serve;

pub use check_config::run_check_config;
pub use extract::run_extract;
pub use serve::run_serve;

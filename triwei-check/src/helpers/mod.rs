//! Helper modules for triwei-check command implementations
//!
//! Shared argument handling, site loading and output so every command
//! behaves the same way.

pub mod config;
pub mod global_args;
pub mod output;

pub use config::load_site;
pub use global_args::GlobalArgs;
pub use output::OutputManager;

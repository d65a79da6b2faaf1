#![allow(clippy::result_large_err)]

pub use build_env::{
    BuildRequest, Category, ExtraPaths, OptimizationLevel, PathHooks, SANITIZED_VARS, SYSTEM_PATHS,
};
pub use callback::*;
pub use superenv::*;

mod build_env;
mod callback;
mod fs;
mod lint_config;
mod raw;
mod superenv;

pub mod arch;
pub mod cccfg;
pub mod compiler;
pub mod config;
pub mod dependency;
pub mod env;
pub mod error;
mod installation_variables;
pub mod path;

pub(crate) static TOOL_NAME: &str = env!("CARGO_PKG_NAME");

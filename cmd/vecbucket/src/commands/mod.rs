//! CLI commands module.

mod config;
mod index;
mod util;
mod vector;

pub use config::ConfigCommand;
pub use index::IndexCommand;
pub use vector::VectorCommand;

pub(crate) use util::*;

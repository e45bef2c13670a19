pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod tags;
pub mod ui;
pub mod versions;

pub use error::{ChangetoolError, Result};

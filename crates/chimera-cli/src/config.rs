//! Command configuration: a TOML file merged with CLI flags and defaults.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

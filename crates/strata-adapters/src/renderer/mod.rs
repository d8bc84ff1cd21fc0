//! Structured file components.
//!
//! These live outside the core because they bring in format crates; the core
//! only knows the [`strata_core::domain::FileSource`] contract.

mod json_file;
mod toml_file;

pub use json_file::JsonFile;
pub use toml_file::TomlFile;

//! Configuration sources.

pub mod env;
pub mod file;

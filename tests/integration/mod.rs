//! Integration tests for pulse

mod cli_binary;
mod config_integration;
mod concurrent_signals;

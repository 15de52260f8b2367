//! Property-based tests for throttling guarantees

mod throttle_window;

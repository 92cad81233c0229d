//! BETWATCH — bet detection client
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod backend;
pub mod host;
pub mod screen;
pub mod engine;

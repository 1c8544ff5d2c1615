//! Shared utilities for stockdash
//!
//! Logging setup shared by the dashboard binary and its tests.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with_default};

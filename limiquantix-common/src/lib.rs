//! # limiquantix Common
//!
//! Shared utilities for the limiquantix tools.
//!
//! ## Logging
//!
//! ```rust,no_run
//! use limiquantix_common::{init_logging, LogFormat};
//!
//! // Human-readable output on stderr, overridable with RUST_LOG
//! init_logging("info").unwrap();
//!
//! // Or pick the format at runtime
//! let format: LogFormat = "json".parse().unwrap();
//! # let _ = format;
//! ```

pub mod logging;

pub use logging::{init, init_logging, init_logging_json, LogFormat};

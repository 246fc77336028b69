//! Logging and tracing configuration for app-extractor
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary.
//!
//! # Log Levels
//!
//! - `warn`  - Skipped nested packages, ZIPs without a payload
//! - `info`  - One line per finished extraction (default in release)
//! - `debug` - Detected kind, manifest entry, chosen icon (default in debug builds)
//! - `trace` - Every icon candidate and its rank
//!
//! # Environment Variable Control
//!
//! ```bash
//! RUST_LOG=debug app-extractor App.ipa
//! RUST_LOG=app_extractor::icon=trace app-extractor Calculator.appxbundle
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn default_filter() -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new("app_extractor=debug")
    } else {
        EnvFilter::new("app_extractor=info")
    }
}

/// Initialize the logging/tracing system
///
/// Logs go to stderr so JSON on stdout stays clean. Calling twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Initialize logging with verbose output (file:line, pretty format)
pub fn init_verbose() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("app_extractor=trace"));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .pretty(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}

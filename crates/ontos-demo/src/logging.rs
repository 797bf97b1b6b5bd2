#![forbid(unsafe_code)]

//! Tracing setup for the binary.
//!
//! The walkthrough owns the alternate screen, so log output only goes to a
//! file, and only when one is configured.

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install a `fmt` subscriber appending to `log_file`.
///
/// Does nothing without a file. Returns whether a subscriber was installed.
///
/// # Errors
///
/// Fails when the file cannot be opened or a global subscriber is already set.
pub fn init(log_file: Option<&Path>) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(io::Error::other)?;
    install_panic_hook();
    tracing::info!(path = %path.display(), "logging to file");
    Ok(true)
}

/// Route panic messages to `tracing::error!` before the previous hook runs.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let message = ontos_runtime::session::panic_message(info.payload());
        tracing::error!(%location, %message, "panic");
        previous(info);
    }));
}

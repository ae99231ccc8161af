//! Logger module
//!
//! Provides logging utilities for the preview server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Upstream (CMS and live site) diagnostics
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use crate::preview::PreviewRegistration;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(level >= Level::Info, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(message: &str) {
    if !enabled(Level::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_debug(message: &str) {
    if !enabled(Level::Debug) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Preview server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref cms) = config.preview.cms_base_url {
        write_info(&format!("CMS: {cms}"));
    }
    match config.preview.live_resource_base_url {
        Some(ref live) => write_info(&format!(
            "Live site: {live} ({:?})",
            config.preview.resource_strategy
        )),
        None => write_info("Live site: not configured, non-preview paths answer 405"),
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_registration(registration: &PreviewRegistration) {
    write_info(&format!(
        "[Preview] Registered function '{}' at {}",
        registration.function_name, registration.page_path
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_upstream_retry(url: &str, err: &impl std::fmt::Display, delay: Duration) {
    write_error(
        Level::Warn,
        &format!("[Upstream] Retrying {url} in {}ms: {err}", delay.as_millis()),
    );
}

pub fn log_upstream_error(outcome: &str, err: &impl std::fmt::Display) {
    write_error(Level::Error, &format!("[Upstream] {outcome} failed: {err}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown() {
    write_info("\n[Shutdown] Signal received, no longer accepting connections");
}

pub fn log_prefetch_done(mapped: usize, total: usize) {
    write_info(&format!("[Prefetch] Filled {mapped} of {total} items"));
}

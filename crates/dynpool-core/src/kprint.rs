//! Kernel-style print macros for dynpool
//!
//! Thread-safe leveled output to stderr, similar to Linux kernel's printk.
//! Every line is written under the stderr lock so lines from concurrent
//! workers never interleave.
//!
//! # Environment Variables
//!
//! - `DYNPOOL_LOG_LEVEL=<level>` - 0=off, 1=error, 2=warn (default), 3=info, 4=debug, 5=trace
//! - `DYNPOOL_FLUSH_EPRINT=1` - Flush stderr after each line
//! - `DYNPOOL_LOG_TID=1` - Prefix leveled lines with the OS thread id
//!
//! # Usage
//!
//! ```ignore
//! use dynpool_core::{kdebug, kwarn};
//!
//! kdebug!("worker {} spawned", slot);
//! kwarn!("task panicked: {}", msg);
//! ```

use crate::env::{env_get_bool, env_get_opt};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log levels (matches common conventions)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Parse a level name or digit, as accepted by `DYNPOOL_LOG_LEVEL`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "1" => Some(LogLevel::Error),
            "warn" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static TID_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize logging from environment variables
///
/// Called automatically on first log or setter call, so programmatic
/// setters always override the environment.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    FLUSH_ENABLED.store(env_get_bool("DYNPOOL_FLUSH_EPRINT", false), Ordering::Relaxed);
    TID_ENABLED.store(env_get_bool("DYNPOOL_LOG_TID", false), Ordering::Relaxed);

    if let Some(level) = env_get_opt::<String>("DYNPOOL_LOG_LEVEL").and_then(|v| LogLevel::parse(&v)) {
        LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    }
}

#[inline]
fn ensure_init() {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
}

/// Get current log level
#[inline]
pub fn log_level() -> LogLevel {
    ensure_init();
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set log level programmatically
pub fn set_log_level(level: LogLevel) {
    ensure_init();
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Set flush mode programmatically
pub fn set_flush_enabled(enabled: bool) {
    ensure_init();
    FLUSH_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Enable or disable the thread id prefix
pub fn set_tid_enabled(enabled: bool) {
    ensure_init();
    TID_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Check if a log level is enabled
#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level as u8 <= log_level() as u8
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// OS thread id of the caller.
        pub fn current_tid() -> u64 {
            // Safety: gettid takes no arguments and cannot fail.
            unsafe { libc::syscall(libc::SYS_gettid) as u64 }
        }
    } else {
        /// Process-unique id of the calling thread.
        pub fn current_tid() -> u64 {
            use std::sync::atomic::AtomicU64;
            static NEXT: AtomicU64 = AtomicU64::new(1);
            thread_local! {
                static TID: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
            }
            TID.with(|t| *t)
        }
    }
}

#[inline]
fn finish(handle: &mut std::io::StderrLock<'_>) {
    if FLUSH_ENABLED.load(Ordering::Relaxed) {
        let _ = handle.flush();
    }
}

/// Internal: Write and optionally flush
#[doc(hidden)]
pub fn _kprint_impl(args: std::fmt::Arguments<'_>) {
    ensure_init();
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = handle.write_fmt(args);
    finish(&mut handle);
}

/// Internal: Write with newline and optionally flush
#[doc(hidden)]
pub fn _kprintln_impl(args: std::fmt::Arguments<'_>) {
    ensure_init();
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    finish(&mut handle);
}

/// Internal: Leveled print
#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    if TID_ENABLED.load(Ordering::Relaxed) {
        let _ = write!(handle, "{} [tid {}] ", level.prefix(), current_tid());
    } else {
        let _ = write!(handle, "{} ", level.prefix());
    }
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    finish(&mut handle);
}

// ============================================================================
// Public Macros
// ============================================================================

/// Print to stderr (no newline)
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {{
        $crate::kprint::_kprint_impl(format_args!($($arg)*));
    }};
}

/// Print to stderr with newline
#[macro_export]
macro_rules! kprintln {
    () => {{
        $crate::kprint::_kprintln_impl(format_args!(""));
    }};
    ($($arg:tt)*) => {{
        $crate::kprint::_kprintln_impl(format_args!($($arg)*));
    }};
}

/// Error level log (always shown unless logging is off)
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Error,
            format_args!($($arg)*)
        );
    }};
}

/// Warning level log
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Warn,
            format_args!($($arg)*)
        );
    }};
}

/// Info level log
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Info,
            format_args!($($arg)*)
        );
    }};
}

/// Debug level log
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Debug,
            format_args!($($arg)*)
        );
    }};
}

/// Trace level log (most verbose)
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {{
        $crate::kprint::_klog_impl(
            $crate::kprint::LogLevel::Trace,
            format_args!($($arg)*)
        );
    }};
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert_eq!(LogLevel::from_u8(99), LogLevel::Trace);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("2"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" off "), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_tid_stable_per_thread() {
        let here = current_tid();
        assert_eq!(here, current_tid());
        let there = std::thread::spawn(current_tid).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn test_macros_compile() {
        kerror!("error {}", "msg");
        kwarn!("warn");
        kinfo!("info");
        kdebug!("debug {}", 1);
        ktrace!("trace");
        kprint!("");
    }
}

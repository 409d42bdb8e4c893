//! Environment variable utilities
//!
//! Typed lookups with defaults, used by `PoolConfig::from_env()` and the
//! logging setup in `kprint`.
//!
//! ```ignore
//! use dynpool_core::env::{env_get, env_get_bool};
//!
//! let max: usize = env_get("DYNPOOL_MAX_WORKERS", 8);
//! let flush = env_get_bool("DYNPOOL_FLUSH_EPRINT", false);
//! ```

use std::str::FromStr;

/// Parse `key` as `T`, falling back to `default` when unset or malformed.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env_get_opt(key).unwrap_or(default)
}

/// Parse `key` as `T`, or `None` when unset or malformed.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Read `key` as a flag.
///
/// "1", "true", "yes" and "on" (any case) are true, "0", "false", "no" and
/// "off" are false. Anything else, including unset, returns `default`.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => parse_flag(&val).unwrap_or(default),
        Err(_) => default,
    }
}

/// Read `key` as a string, or `default` when unset.
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Whether `key` is set, whatever its value.
#[inline]
pub fn env_is_set(key: &str) -> bool {
    std::env::var_os(key).is_some()
}

pub(crate) fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_returns_default() {
        let val: usize = env_get("__DYNPOOL_TEST_UNSET__", 7);
        assert_eq!(val, 7);
        assert!(env_get_opt::<usize>("__DYNPOOL_TEST_UNSET__").is_none());
        assert!(env_get_bool("__DYNPOOL_TEST_UNSET__", true));
    }

    #[test]
    fn test_parse_with_whitespace() {
        std::env::set_var("__DYNPOOL_TEST_NUM__", " 12 ");
        let val: usize = env_get("__DYNPOOL_TEST_NUM__", 0);
        assert_eq!(val, 12);
        std::env::remove_var("__DYNPOOL_TEST_NUM__");
    }

    #[test]
    fn test_malformed_falls_back() {
        std::env::set_var("__DYNPOOL_TEST_BAD__", "twelve");
        let val: usize = env_get("__DYNPOOL_TEST_BAD__", 3);
        assert_eq!(val, 3);
        std::env::remove_var("__DYNPOOL_TEST_BAD__");
    }

    #[test]
    fn test_str_and_presence() {
        assert_eq!(env_get_str("__DYNPOOL_TEST_UNSET__", "dflt"), "dflt");
        assert!(!env_is_set("__DYNPOOL_TEST_UNSET__"));

        std::env::set_var("__DYNPOOL_TEST_STR__", "pool-a");
        assert_eq!(env_get_str("__DYNPOOL_TEST_STR__", "dflt"), "pool-a");
        assert!(env_is_set("__DYNPOOL_TEST_STR__"));

        // Set but empty still counts as set
        std::env::set_var("__DYNPOOL_TEST_STR__", "");
        assert!(env_is_set("__DYNPOOL_TEST_STR__"));
        std::env::remove_var("__DYNPOOL_TEST_STR__");
    }

    #[test]
    fn test_flag_values() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag("yes"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("Off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}

//! Environment variable access

use std::env;
use std::str::FromStr;
use tracing::debug;

use crate::error::ConfigError;

/// Source of raw configuration values keyed by variable name
pub trait Lookup {
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Read a variable from the process environment
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Get a non-blank value, treating empty strings as unset
pub fn get_nonblank(lookup: &impl Lookup, var_name: &str) -> Option<String> {
    lookup
        .get(var_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get a value with a default, reporting whether the default was used
pub fn get_or_default(lookup: &impl Lookup, var_name: &str, default: &str) -> (String, bool) {
    match get_nonblank(lookup, var_name) {
        Some(value) => {
            debug!(var = var_name, "Using environment variable");
            (value, false)
        }
        None => {
            debug!(var = var_name, default, "Environment variable not set, using default");
            (default.to_string(), true)
        }
    }
}

/// Parse a value, returning `None` when the variable is unset
pub fn parse_optional<T>(lookup: &impl Lookup, var_name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_nonblank(lookup, var_name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                var: var_name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

//! Path and formatting helpers shared by the engine and the command crate.

use crate::errors::{CoreError, Result};
use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Separator used by every remote namespace.
pub const SEPARATOR: char = '/';

/// Base path used when none is configured.
pub const DEFAULT_BASE_PATH: &str = "/store/user/";

/// Modification time format used in listings.
pub const MOD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Joins a base path and a path relative to it without doubling separators.
pub fn join(base: &str, relative: &str) -> String {
    if base.is_empty() {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}{SEPARATOR}{}",
        base.trim_end_matches(SEPARATOR),
        relative.trim_start_matches(SEPARATOR)
    )
}

/// A non-empty base path has to begin and end with the separator.
pub fn validate_base(base: &str) -> Result<()> {
    if base.is_empty() || (base.starts_with(SEPARATOR) && base.ends_with(SEPARATOR)) {
        Ok(())
    } else {
        Err(CoreError::invalid_path(format!(
            "base path {base:?} has to begin and end with \"{SEPARATOR}\""
        )))
    }
}

/// Checks that a fully qualified remote path can be handed to a store.
pub fn validate_remote_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CoreError::invalid_path("empty remote path"));
    }
    if path.contains("://") {
        return Err(CoreError::invalid_path(format!(
            "{path:?} carries a transport prefix; pass the path only"
        )));
    }
    if !path.starts_with(SEPARATOR) {
        return Err(CoreError::invalid_path(format!(
            "{path:?} is not an absolute remote path"
        )));
    }
    Ok(())
}

/// Returns `path` with exactly one trailing separator.
pub fn as_directory(path: &str) -> String {
    format!("{}{SEPARATOR}", path.trim_end_matches(SEPARATOR))
}

/// Fully qualified path of a listed child. Directories keep a trailing separator.
pub fn child_path(parent: &str, name: &str, is_directory: bool) -> String {
    let mut path = as_directory(parent);
    path.push_str(name.trim_matches(SEPARATOR));
    if is_directory {
        path.push(SEPARATOR);
    }
    path
}

/// Last path component, ignoring trailing separators.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    trimmed
        .rsplit_once(SEPARATOR)
        .map_or(trimmed, |(_, name)| name)
}

/// Name of the local file a directory's file list is written to.
pub fn file_list_name(directory: &str) -> String {
    format!("list{}.txt", directory.replace(SEPARATOR, "_"))
}

/// Formats a timestamp the way listings print modification times.
pub fn format_mod_time(time: SystemTime) -> String {
    let dt = DateTime::<Utc>::from(time);
    dt.format(MOD_TIME_FORMAT).to_string()
}

/// Human readable size rendering with decimal units.
pub fn print_size(bytes: u64) -> String {
    const SUFFIXES: [&str; 8] = ["", "K", "M", "G", "T", "P", "E", "Z"];
    let mut value = bytes as f64;
    let mut idx = 0usize;

    while value >= 1000.0 && idx < SUFFIXES.len() - 1 {
        value /= 1000.0;
        idx += 1;
    }

    format!("{:>6.1} {}B", value, SUFFIXES[idx])
}

/// Size in binary gibibytes.
pub fn gib(bytes: u64) -> f64 {
    bytes as f64 / (1u64 << 30) as f64
}

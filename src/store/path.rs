//! Resource path handling
//!
//! Splits logical resource paths into segments, enforces the depth limit and
//! maps them onto a physical location under the store root.

use std::path::{Path, PathBuf};

use crate::error::ServeError;

/// Suffix appended to extensionless resources so they never alias a directory
pub const EXTENSIONLESS_MARKER: &str = ".__res";

/// Non-empty `/`-separated segments of a resource path
pub fn segments(resource: &str) -> Vec<&str> {
    resource.split('/').filter(|s| !s.is_empty()).collect()
}

/// Fail with 400 when the resource is deeper than `max_depth` (0 = unlimited)
pub fn check_depth(resource: &str, max_depth: usize) -> Result<(), ServeError> {
    if max_depth == 0 {
        return Ok(());
    }
    let depth = segments(resource).len();
    if depth > max_depth {
        return Err(ServeError::bad_request(format!(
            "resource depth {depth} exceeds limit {max_depth}"
        )));
    }
    Ok(())
}

/// Validated segments: at least one, no `.` / `..` components and no
/// segment ending in [`EXTENSIONLESS_MARKER`]
pub fn normalize(resource: &str) -> Result<Vec<&str>, ServeError> {
    let parts = segments(resource);
    if parts.is_empty() {
        return Err(ServeError::bad_request("resource names no file"));
    }
    if parts.iter().any(|s| *s == "." || *s == ".." || s.contains('\\')) {
        return Err(ServeError::bad_request("resource escapes store root"));
    }
    // Reserved for extensionless files; `/a` already lives at `a.__res`
    if parts.iter().any(|s| s.ends_with(EXTENSIONLESS_MARKER)) {
        return Err(ServeError::bad_request("resource uses a reserved name"));
    }
    Ok(parts)
}

/// Physical file location of `resource` under `root`
pub fn resolve(root: &Path, resource: &str) -> Result<PathBuf, ServeError> {
    let parts = normalize(resource)?;
    let mut path = root.to_path_buf();
    let Some((last, dirs)) = parts.split_last() else {
        return Err(ServeError::bad_request("resource names no file"));
    };
    path.extend(dirs);

    if Path::new(last).extension().is_some() {
        path.push(last);
    } else {
        path.push(format!("{last}{EXTENSIONLESS_MARKER}"));
    }
    Ok(path)
}

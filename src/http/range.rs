//! HTTP Range request parsing module
//!
//! Turns a single `bytes=start-end` range into store transfer options.
//! Satisfiability is not judged here: the store checks the bounds against the
//! resource size it reads, so this parser never needs to know the size.

use crate::store::TransferOptions;

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, `end` inclusive
/// - `bytes=start-` - From start to end of resource
///
/// Suffix ranges (`bytes=-n`), multi-range, other units and malformed values
/// are ignored and yield `None`, which means "send the whole resource".
///
/// The inclusive HTTP `end` is converted to the exclusive bound used by
/// [`TransferOptions`].
pub fn parse_range_header(range_header: Option<&str>) -> Option<TransferOptions> {
    let header = range_header?.trim();
    let header = header.strip_prefix("bytes=")?;

    // Only support single range (not multi-range)
    if header.contains(',') {
        return None;
    }

    let (start_str, end_str) = header.split_once('-')?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range needs the size up front
    if start_str.is_empty() {
        return None;
    }

    let start = start_str.parse::<u64>().ok()?;
    let end = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse::<u64>().ok()?.checked_add(1)?)
    };

    Some(TransferOptions::range(Some(start), end))
}

//! Download handler
//!
//! Opens the resource for reading and streams it back, honoring a single
//! byte range when one was requested.

use crate::error::ServeError;
use crate::http::{build_download_response, parse_range_header, TransferBody};
use crate::server::TransferEvent;
use crate::store::{Mode, ResourceStore};
use hyper::Response;

/// Serve `GET /download`
///
/// Nothing is committed until the store has opened the resource, so every
/// failure here still becomes a complete error response.
pub async fn serve_download(
    store: &dyn ResourceStore,
    event: &TransferEvent,
    range_header: Option<&str>,
) -> Result<Response<TransferBody>, ServeError> {
    let mode: Mode = event.mode.parse()?;
    let options = parse_range_header(range_header).unwrap_or_default();

    let (reader, metadata) = store.open_for_read(&event.resource, mode, options).await?;
    let (start, end) = options.span(metadata.size)?;

    Ok(build_download_response(
        &metadata,
        start,
        end,
        options.is_ranged(),
        TransferBody::from_reader(reader),
    ))
}

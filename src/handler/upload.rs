//! Upload handler
//!
//! Pipes the request body into a store write stream. The body is not polled
//! before the store has opened the resource, so a client waiting on
//! `Expect: 100-continue` only gets the interim response once the write can
//! actually proceed.

use futures_util::TryStreamExt;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::Response;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

use crate::error::{BoxError, ServeError};
use crate::http::{build_upload_response, TransferBody};
use crate::server::TransferEvent;
use crate::store::{Mode, ResourceStore};

/// Serve `PUT|POST /upload`
///
/// A failure while piping is reported like any other I/O failure (404); bytes
/// already handed to the store stay written.
pub async fn serve_upload<B>(
    store: &dyn ResourceStore,
    event: &TransferEvent,
    body: B,
) -> Result<Response<TransferBody>, ServeError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let mode: Mode = event.mode.parse()?;
    let mut writer = store.open_for_write(&event.resource, mode).await?;

    let chunks = body
        .into_data_stream()
        .map_err(|e| std::io::Error::other(e.into()));
    let reader = StreamReader::new(chunks);
    tokio::pin!(reader);

    tokio::io::copy(&mut reader, &mut writer).await?;
    writer.shutdown().await?;

    Ok(build_upload_response())
}

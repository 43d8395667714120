//! Response body type
//!
//! Every response leaves the server as a [`TransferBody`]. Besides carrying
//! the bytes, it reports when the transmission is over (end of stream, a
//! stream error, or hyper dropping the body) through a shared flag that the
//! response guard reads.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Body, Frame, SizeHint};
use tokio_util::io::ReaderStream;

use crate::store::ReadStream;

/// Streaming response body with completion tracking
pub struct TransferBody {
    inner: UnsyncBoxBody<Bytes, io::Error>,
    finished: Option<Arc<AtomicBool>>,
}

impl TransferBody {
    fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes, Error = io::Error> + Send + 'static,
    {
        Self {
            inner: body.boxed_unsync(),
            finished: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new().map_err(|never| match never {}))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(Full::new(data.into()).map_err(|never| match never {}))
    }

    /// Stream a store reader to the client, chunk by chunk
    pub fn from_reader(reader: ReadStream) -> Self {
        let frames = ReaderStream::new(reader).map_ok(Frame::data);
        Self::new(StreamBody::new(frames))
    }

    /// Flag `finished` once this body has been fully transmitted or abandoned
    pub(crate) fn watch(&mut self, finished: Arc<AtomicBool>) {
        self.finished = Some(finished);
    }

    fn mark_finished(&self) {
        if let Some(flag) = &self.finished {
            flag.store(true, Ordering::Release);
        }
    }
}

impl Body for TransferBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_frame(cx);
        if matches!(poll, Poll::Ready(None | Some(Err(_)))) {
            this.mark_finished();
        }
        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for TransferBody {
    fn drop(&mut self) {
        self.mark_finished();
    }
}

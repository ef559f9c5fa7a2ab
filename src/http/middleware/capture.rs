//! Response body capture.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use http_body::{Body, Frame, SizeHint};

type OnComplete = Box<dyn FnOnce(&[u8]) + Send>;

/// Body decorator that forwards every frame unchanged and mirrors data frames
/// into a buffer.
///
/// `on_complete` runs exactly once with the captured bytes: at end of stream,
/// on a body error, or when the body is dropped early (client disconnect, or a
/// server that stops polling once `is_end_stream` is true).
pub struct CaptureBody<B> {
    inner: B,
    captured: Vec<u8>,
    on_complete: Option<OnComplete>,
}

impl<B> CaptureBody<B> {
    pub fn new<F>(inner: B, on_complete: F) -> Self
    where
        F: FnOnce(&[u8]) + Send + 'static,
    {
        Self {
            inner,
            captured: Vec::new(),
            on_complete: Some(Box::new(on_complete)),
        }
    }

    fn finish(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            let captured = std::mem::take(&mut self.captured);
            on_complete(&captured);
        }
    }
}

impl<B> Body for CaptureBody<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.captured.extend_from_slice(data);
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => this.finish(),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for CaptureBody<B> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl<B> fmt::Debug for CaptureBody<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBody")
            .field("captured", &self.captured.len())
            .field("pending", &self.on_complete.is_some())
            .finish()
    }
}

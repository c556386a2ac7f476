use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Byte stream that reports the running total after every chunk
    pub struct ProgressStream<S, F> {
        #[pin]
        inner: S,
        transferred: u64,
        on_progress: F,
    }
}

impl<S, F> ProgressStream<S, F> {
    pub fn new(inner: S, on_progress: F) -> Self {
        Self {
            inner,
            transferred: 0,
            on_progress,
        }
    }
}

impl<S, E, F> Stream for ProgressStream<S, F>
where
    S: Stream<Item = Result<Bytes, E>>,
    F: FnMut(u64),
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if !chunk.is_empty() {
                    *this.transferred += chunk.len() as u64;
                    (this.on_progress)(*this.transferred);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}

/// Splits a buffer into cheap, shared slices of at most `chunk_size` bytes
pub fn chunked(data: Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}

/// Integer percentage of `done` over `total`; an empty transfer is complete
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_reports_running_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let chunks = chunked(Bytes::from(vec![7u8; 10]), 4);
        let stream = futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
        let collected: Vec<_> = ProgressStream::new(stream, move |n| sink.lock().unwrap().push(n))
            .collect()
            .await;

        assert_eq!(collected.len(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![4, 8, 10]);
    }

    #[test]
    fn test_chunked_sizes() {
        let chunks = chunked(Bytes::from_static(b"abcdefg"), 3);
        let sizes: Vec<_> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(chunked(Bytes::new(), 3).is_empty());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 200), 0);
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(200, 200), 100);
        assert_eq!(percent(0, 0), 100);
    }
}

use std::io::{self, BufRead};

use futures::stream::{self, Stream};
use tokio::task;

/// A blocking input stream (usually stdin) whose reads run on tokio's
/// blocking pool, so the runtime thread never waits on the terminal or pipe.
///
/// The stream is moved into the worker for each read and handed back with
/// the result; reads are strictly sequential.
pub struct InputReader<R> {
    inner: Option<R>,
}

impl<R> InputReader<R>
where
    R: BufRead + Send + 'static,
{
    pub fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }

    /// Read everything that is left. Consumes the reader.
    pub async fn read_all(mut self) -> io::Result<Vec<u8>> {
        self.offload(|inner| {
            let mut data = Vec::new();
            inner.read_to_end(&mut data)?;
            Ok(data)
        })
        .await
    }

    /// Next line including its terminator, or an empty string at end of input.
    pub async fn read_line(&mut self) -> io::Result<String> {
        self.offload(|inner| {
            let mut line = String::new();
            inner.read_line(&mut line)?;
            Ok(line)
        })
        .await
    }

    /// Lazily yields lines until the end-of-input sentinel.
    ///
    /// The stream owns the reader, so it can be walked exactly once. After a
    /// read error is yielded the stream ends.
    pub fn lines(self) -> impl Stream<Item = io::Result<String>> {
        stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.read_line().await {
                Ok(line) if line.is_empty() => None,
                Ok(line) => Some((Ok(line), Some(reader))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    async fn offload<T, F>(&mut self, read: F) -> io::Result<T>
    where
        F: FnOnce(&mut R) -> io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        // Only gone if an earlier worker panicked mid-read.
        let mut inner = self
            .inner
            .take()
            .ok_or_else(|| io::Error::other("input stream lost after a failed read"))?;

        let (inner, result) = task::spawn_blocking(move || {
            let result = read(&mut inner);
            (inner, result)
        })
        .await
        .map_err(io::Error::other)?;

        self.inner = Some(inner);
        result
    }
}

use crate::{DavError, DavTransport};
use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll, ready},
};
use tokio::{
    io::{AsyncWrite, DuplexStream},
    task::JoinHandle,
};

/// The writing end of an upload. Bytes written here are streamed into a PUT request that runs on
/// its own task, with at most the buffer capacity in flight.
///
/// Shutting the stream down ends the request body and waits for the server's answer; a failed
/// upload makes the shutdown fail. Dropping the stream without shutting it down abandons the
/// upload.
#[derive(Debug)]
pub struct UploadStream {
    writer: DuplexStream,
    put: Option<JoinHandle<Result<(), DavError>>>,
    failure: Option<String>,
}

impl UploadStream {
    /// Starts the PUT of `path` right away; it reads whatever gets written to the returned stream.
    pub fn start(transport: Arc<dyn DavTransport>, path: String, buffer: usize) -> Self {
        let (writer, reader) = tokio::io::duplex(buffer.max(1));
        let put = tokio::spawn(async move {
            let result = transport.put(&path, Box::new(reader)).await;
            match &result {
                Ok(()) => tracing::debug!(path = %path, "upload complete"),
                Err(err) => tracing::warn!(path = %path, error = %err, "upload failed"),
            }
            result
        });
        UploadStream {
            writer,
            put: Some(put),
            failure: None,
        }
    }

    // Waits for the PUT and remembers how it went.
    fn poll_put(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if let Some(task) = self.put.as_mut() {
            let outcome = match ready!(Pin::new(task).poll(cx)) {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(io::Error::other(err)),
                Err(join) => Err(io::Error::other(join)),
            };
            self.put = None;
            if let Err(err) = &outcome {
                self.failure = Some(err.to_string());
            }
            return Poll::Ready(outcome);
        }
        Poll::Ready(match &self.failure {
            Some(failure) => Err(io::Error::other(failure.clone())),
            None => Ok(()),
        })
    }
}

impl AsyncWrite for UploadStream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if let Some(failure) = &this.failure {
            return Poll::Ready(Err(io::Error::other(failure.clone())));
        }
        match Pin::new(&mut this.writer).poll_write(cx, buf) {
            // The PUT stopped reading, so it is over: report why
            Poll::Ready(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => match this.poll_put(cx) {
                Poll::Ready(Err(put_err)) => Poll::Ready(Err(put_err)),
                _ => {
                    this.failure = Some(err.to_string());
                    Poll::Ready(Err(err))
                }
            },
            other => other,
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(Pin::new(&mut this.writer).poll_shutdown(cx))?;
        this.poll_put(cx)
    }
}

impl Drop for UploadStream {
    fn drop(&mut self) {
        if let Some(task) = &self.put {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryTransport;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn bytes_arrive_after_shutdown() {
        let dav = Arc::new(MemoryTransport::new());
        let mut upload = UploadStream::start(dav.clone(), "/big.bin".to_string(), 16);
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        upload.write_all(&data).await.unwrap();
        upload.shutdown().await.unwrap();

        assert_eq!(dav.contents("/big.bin"), Some(data));
    }

    #[tokio::test]
    async fn failed_put_fails_shutdown() {
        let dav = Arc::new(MemoryTransport::new().failing_uploads());
        let mut upload = UploadStream::start(dav.clone(), "/a.txt".to_string(), 1024);

        // Fits in the buffer, so the write itself succeeds
        upload.write_all(b"hello").await.unwrap();
        let err = upload.shutdown().await.unwrap_err();

        assert!(err.to_string().contains("507"), "{}", err);
        assert_eq!(dav.contents("/a.txt"), None);
    }

    #[tokio::test]
    async fn writes_fail_once_put_failed() {
        let dav = Arc::new(MemoryTransport::new().failing_uploads());
        let mut upload = UploadStream::start(dav, "/a.txt".to_string(), 8);

        let mut result = Ok(());
        for _ in 0..100 {
            result = upload.write_all(&[0u8; 64]).await;
            if result.is_err() {
                break;
            }
        }
        assert!(result.is_err());
        assert!(upload.write_all(b"more").await.is_err());
        assert!(upload.shutdown().await.is_err());
    }

    #[tokio::test]
    async fn missing_parent_fails_shutdown() {
        let dav = Arc::new(MemoryTransport::new());
        let mut upload = UploadStream::start(dav.clone(), "/nowhere/a.txt".to_string(), 64);
        upload.write_all(b"x").await.unwrap();
        assert!(upload.shutdown().await.is_err());
        assert!(!dav.is_directory("/nowhere"));
    }

    #[tokio::test]
    async fn dropping_abandons_the_upload() {
        let dav = Arc::new(MemoryTransport::new());
        let mut upload = UploadStream::start(dav.clone(), "/partial.txt".to_string(), 64);
        upload.write_all(b"half").await.unwrap();
        drop(upload);

        tokio::task::yield_now().await;
        assert_eq!(dav.contents("/partial.txt"), None);
    }
}

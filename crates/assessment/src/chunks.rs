use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

/// Size of each chunk relayed to the assessment endpoint
pub const CHUNK_SIZE: usize = 1024;

/// Sequential, non-restartable reader of fixed-size chunks
///
/// Every chunk except the last holds exactly [`CHUNK_SIZE`] bytes. A zero-length
/// read from the source ends the sequence; once ended it stays ended.
pub struct ChunkReader<R> {
    source: R,
    exhausted: bool,
}

impl<R: AsyncRead + Unpin> ChunkReader<R> {
    pub const fn new(source: R) -> Self {
        Self {
            source,
            exhausted: false,
        }
    }

    /// Read the next chunk, or `None` once the source is exhausted
    pub async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut filled = 0;

        while filled < CHUNK_SIZE {
            let read = self.source.read(&mut buf[filled..]).await?;

            if read == 0 {
                self.exhausted = true;
                break;
            }

            filled += read;
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}

/// Feed every chunk of `reader` into `sink`, in order
///
/// Stops early when the receiving side is gone. A read failure is forwarded so
/// the outbound body aborts instead of ending as if the audio were complete.
pub(crate) async fn pump<R: AsyncRead + Unpin>(
    mut reader: ChunkReader<R>,
    sink: mpsc::Sender<io::Result<Bytes>>,
) -> io::Result<usize> {
    let mut sent = 0;

    loop {
        match reader.next_chunk().await {
            Ok(Some(chunk)) => {
                if sink.send(Ok(chunk)).await.is_err() {
                    tracing::debug!(chunks = sent, "assessment body closed before audio was exhausted");
                    return Ok(sent);
                }
                sent += 1;
            }
            Ok(None) => return Ok(sent),
            Err(e) => {
                let forwarded = io::Error::new(e.kind(), e.to_string());
                let _ = sink.send(Err(forwarded)).await;
                return Err(e);
            }
        }
    }
}

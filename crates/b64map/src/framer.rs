//! Document framing and decoding.
//!
//! The framer turns a byte-oriented input stream into a sequence of
//! decoded documents, one per line, without buffering the whole input.
//! It runs as a spawned producer task and hands documents to its
//! consumer over a single-slot channel, so at most one decoded document
//! is buffered between the framer and the driver at any time.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::codec;
use crate::config::LineEnding;
use crate::error::{PipelineError, Result};

/// One unit of data: the decoded bytes of one input line.
pub type Document = Vec<u8>;

/// Splits a byte stream into line-delimited documents and decodes them.
pub struct Framer {
    line_ending: LineEnding,
}

impl Framer {
    /// Create a framer with the given line-terminator convention.
    pub fn new(line_ending: LineEnding) -> Self {
        Self { line_ending }
    }

    /// Spawn the producer task over `reader` and return the consuming end.
    ///
    /// The stream yields each decoded document in input order, then ends.
    /// A read or decode failure is yielded in-band as the final item;
    /// nothing after the failing line is produced. A single traversal
    /// exhausts the source stream.
    pub fn spawn<R>(self, reader: R) -> DocumentStream
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move { self.produce(reader, tx).await });
        DocumentStream { rx }
    }

    async fn produce<R>(self, reader: R, tx: mpsc::Sender<Result<Document>>)
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line: Vec<u8> = Vec::with_capacity(1024);
        let mut lineno: u64 = 0;

        loop {
            line.clear();
            // read_until reassembles a line across however many partial
            // reads the source needs; n == 0 means end of stream.
            let n = match reader.read_until(b'\n', &mut line).await {
                Ok(n) => n,
                Err(e) => {
                    let _ = tx.send(Err(PipelineError::Read(e))).await;
                    return;
                }
            };
            if n == 0 {
                debug!("framer: input exhausted after {} lines", lineno);
                return;
            }
            lineno += 1;

            if line.last() == Some(&b'\n') {
                line.pop();
                if self.line_ending == LineEnding::Auto && line.last() == Some(&b'\r') {
                    line.pop();
                }
            }
            // A final line without a terminator is still a complete document.

            let doc = match codec::decode_line(&line, lineno) {
                Ok(doc) => doc,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };

            if tx.send(Ok(doc)).await.is_err() {
                // Consumer dropped the stream; stop reading.
                return;
            }
        }
    }
}

/// Consuming end of the framer handoff channel.
pub struct DocumentStream {
    rx: mpsc::Receiver<Result<Document>>,
}

impl DocumentStream {
    /// The next decoded document, a fatal framing error, or `None` once
    /// the input stream is exhausted.
    pub async fn next(&mut self) -> Option<Result<Document>> {
        self.rx.recv().await
    }
}

//! Sequential pipeline driver.
//!
//! Pulls documents from the framer one at a time, drives the filter to
//! completion for each, and emits one encoded line per document. There
//! is no parallelism across documents and no pipelining beyond the
//! framer's single-slot handoff; a per-document failure aborts the run.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::codec;
use crate::config::RunConfig;
use crate::error::{PipelineError, Result};
use crate::filter::FilterCommand;
use crate::framer::Framer;

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Documents processed.
    pub documents: u64,

    /// Total wall time in seconds.
    pub duration_seconds: f64,

    /// Average throughput (documents/second).
    pub documents_per_second: u64,
}

impl RunSummary {
    fn new(documents: u64, elapsed: Duration) -> Self {
        let duration_seconds = elapsed.as_secs_f64();
        let documents_per_second = if duration_seconds > 0.0 {
            (documents as f64 / duration_seconds) as u64
        } else {
            0
        };
        Self {
            documents,
            duration_seconds,
            documents_per_second,
        }
    }

    /// Serialize the summary as a single JSON line.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The record-transformation pipeline.
pub struct Pipeline {
    config: RunConfig,
    filter: FilterCommand,
}

impl Pipeline {
    /// Create a pipeline for the given configuration and filter.
    pub fn new(config: RunConfig, filter: FilterCommand) -> Self {
        Self { config, filter }
    }

    /// Drain `input`, transforming every document, writing encoded lines
    /// to `output`.
    ///
    /// Returns the run summary on success. The first framing, filter, or
    /// output failure aborts the run; no output line is produced for the
    /// failing document or anything after it.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<RunSummary>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let start = Instant::now();
        let mut documents: u64 = 0;

        let mut stream = Framer::new(self.config.line_ending).spawn(input);

        while let Some(item) = stream.next().await {
            let doc = item?;
            let transformed = self.filter.apply(&doc).await?;

            let line = codec::encode_line(&transformed);
            output.write_all(&line).await.map_err(PipelineError::Write)?;
            output.flush().await.map_err(PipelineError::Write)?;

            documents += 1;
            if self.config.progress_every > 0 && documents % self.config.progress_every == 0 {
                info!("written {} documents in {:?}", documents, start.elapsed());
            }
        }

        let summary = RunSummary::new(documents, start.elapsed());
        info!(
            "processed {} documents in {:.2}s ({} docs/s)",
            summary.documents, summary.duration_seconds, summary.documents_per_second
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::config::LineEnding;

    fn identity_pipeline() -> Pipeline {
        Pipeline::new(RunConfig::default(), FilterCommand::new("cat", vec![]))
    }

    #[tokio::test]
    async fn test_roundtrip_identity() {
        let mut out = Vec::new();
        let summary = identity_pipeline()
            .run(&b"SGVsbG8=\nV29ybGQ="[..], &mut out)
            .await
            .unwrap();

        // Every output line is terminated, even though the final input
        // line was not.
        assert_eq!(out, b"SGVsbG8=\nV29ybGQ=\n");
        assert_eq!(summary.documents, 2);
    }

    #[tokio::test]
    async fn test_line_count_preserved() {
        let input: Vec<u8> = std::iter::repeat(&b"c29tZSByZWNvcmQ=\n"[..])
            .take(5)
            .flatten()
            .copied()
            .collect();
        let mut out = Vec::new();
        let summary = identity_pipeline()
            .run(std::io::Cursor::new(input), &mut out)
            .await
            .unwrap();

        assert_eq!(summary.documents, 5);
        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 5);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let mut out = Vec::new();
        let summary = identity_pipeline().run(&b""[..], &mut out).await.unwrap();
        assert_eq!(summary.documents, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_line_aborts_before_later_lines() {
        let mut out = Vec::new();
        let err = identity_pipeline()
            .run(&b"SGVsbG8=\n!!corrupt!!\nV29ybGQ=\n"[..], &mut out)
            .await
            .unwrap_err();

        match err {
            PipelineError::Decode { line, .. } => assert_eq!(line, 2),
            other => panic!("expected decode error, got {other:?}"),
        }
        // The document before the corruption was emitted; nothing after.
        assert_eq!(out, b"SGVsbG8=\n");
    }

    #[tokio::test]
    async fn test_failing_filter_aborts_without_output() {
        let pipeline = Pipeline::new(RunConfig::default(), FilterCommand::new("false", vec![]));
        let mut out = Vec::new();
        let err = pipeline
            .run(&b"SGVsbG8=\nV29ybGQ=\n"[..], &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::FilterExit { .. }));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_transforming_filter() {
        let pipeline = Pipeline::new(
            RunConfig::default(),
            FilterCommand::new("tr", vec!["a-z".into(), "A-Z".into()]),
        );
        let mut out = Vec::new();
        // "hello" -> "HELLO"
        let summary = pipeline.run(&b"aGVsbG8=\n"[..], &mut out).await.unwrap();

        assert_eq!(out, b"SEVMTE8=\n");
        assert_eq!(summary.documents, 1);
    }

    #[tokio::test]
    async fn test_crlf_input_with_auto_line_ending() {
        let pipeline = Pipeline::new(
            RunConfig::default().with_line_ending(LineEnding::Auto),
            FilterCommand::new("cat", vec![]),
        );
        let mut out = Vec::new();
        let summary = pipeline
            .run(&b"SGVsbG8=\r\nV29ybGQ=\r\n"[..], &mut out)
            .await
            .unwrap();

        // Output is always LF-terminated regardless of input convention.
        assert_eq!(out, b"SGVsbG8=\nV29ybGQ=\n");
        assert_eq!(summary.documents, 2);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = RunSummary::new(2, Duration::from_secs(1));
        let json = summary.to_json().unwrap();
        assert!(json.contains("\"documents\":2"));
        assert!(json.contains("\"documents_per_second\":2"));
    }
}

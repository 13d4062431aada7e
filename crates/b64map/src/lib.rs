//! # b64map
//!
//! Streaming base64 record-transformation pipeline library.
//!
//! Reads base64-encoded records (one document per line) from an input
//! stream, pipes each decoded document through a freshly spawned
//! external filter program, and re-encodes the filter's output as a
//! line-delimited base64 stream:
//!
//! - **Framing** that reassembles lines across partial reads without
//!   buffering the whole input
//! - **One process per document** for isolation between records
//! - **Strict backpressure** via a single-slot producer/consumer handoff
//! - **Fail-fast** error handling: the first corrupt line or filter
//!   failure aborts the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use b64map::{FilterCommand, Pipeline, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> b64map::Result<()> {
//!     let pipeline = Pipeline::new(
//!         RunConfig::default(),
//!         FilterCommand::new("gzip", vec!["-c".into()]),
//!     );
//!     let summary = pipeline.run(tokio::io::stdin(), tokio::io::stdout()).await?;
//!     eprintln!("processed {} documents", summary.documents);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod framer;
pub mod pipeline;

// Re-exports for convenient access
pub use config::{LineEnding, RunConfig};
pub use error::{PipelineError, Result};
pub use filter::FilterCommand;
pub use framer::{Document, DocumentStream, Framer};
pub use pipeline::{Pipeline, RunSummary};

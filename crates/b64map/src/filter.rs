//! Per-document subprocess orchestration.
//!
//! Each document is piped through a freshly spawned instance of the
//! external filter program: the document is written to the child's
//! stdin, stdin is closed to signal end-of-input, stdout and stderr are
//! drained to exhaustion, and only then is the exit status awaited.
//! Draining before waiting avoids the pipe-buffer deadlock for filters
//! that consume all input before producing output; a filter that needs
//! its stdout drained while it is still reading stdin can still stall
//! the run, which is an accepted limitation for the target use case.

use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// The external filter program and its arguments, fixed for the run.
///
/// Every [`apply`](FilterCommand::apply) call spawns a fresh process
/// instance, so no state leaks between documents.
#[derive(Debug, Clone)]
pub struct FilterCommand {
    program: String,
    args: Vec<String>,
}

impl FilterCommand {
    /// Create a filter command.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The filter program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the filter over one document and return its captured stdout.
    ///
    /// The child's stderr is forwarded verbatim to this process's own
    /// standard error; it is never part of the result. A non-success
    /// exit status is an error.
    pub async fn apply(&self, doc: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PipelineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::Internal("filter stdin unavailable".into()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::Internal("filter stdout unavailable".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PipelineError::Internal("filter stderr unavailable".into()))?;

        // Write the whole document, tolerating partial writes. A short
        // write is a warning, not a hard error; the drain or wait below
        // surfaces the hard failure if there is one.
        let mut written = 0;
        while written < doc.len() {
            match stdin.write(&doc[written..]).await {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(source) => {
                    return Err(PipelineError::Stdin {
                        program: self.program.clone(),
                        source,
                    })
                }
            }
        }
        if written < doc.len() {
            warn!(
                "did not write the expected number of bytes to filter '{}': {} != {}",
                self.program,
                written,
                doc.len()
            );
        }

        stdin
            .shutdown()
            .await
            .map_err(|source| PipelineError::StdinClose {
                program: self.program.clone(),
                source,
            })?;
        // Dropping the handle closes the pipe, signaling end-of-input.
        drop(stdin);

        // Drain both output pipes to exhaustion before waiting for exit.
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();
        let (out_res, err_res) = tokio::join!(
            stdout.read_to_end(&mut out_buf),
            stderr.read_to_end(&mut err_buf),
        );
        out_res.map_err(|source| PipelineError::Stdout {
            program: self.program.clone(),
            source,
        })?;
        err_res.map_err(|source| PipelineError::Stderr {
            program: self.program.clone(),
            source,
        })?;

        // Diagnostic bytes pass through verbatim; a forwarding failure
        // must not fail the document.
        if !err_buf.is_empty() {
            let mut our_stderr = tokio::io::stderr();
            if let Err(e) = our_stderr.write_all(&err_buf).await {
                warn!("error forwarding filter standard error: {}", e);
            } else {
                let _ = our_stderr.flush().await;
            }
        }

        let status = child.wait().await.map_err(|source| PipelineError::Wait {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(PipelineError::FilterExit {
                program: self.program.clone(),
                status,
            });
        }

        debug!(
            "filter '{}': {} bytes in, {} bytes out",
            self.program,
            doc.len(),
            out_buf.len()
        );
        Ok(out_buf)
    }
}

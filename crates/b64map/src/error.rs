//! Error types for the record-transformation pipeline.

use std::process::ExitStatus;
use thiserror::Error;

/// Exit code for corrupt or unreadable input (decode/read failures).
pub const EXIT_INPUT_ERROR: u8 = 3;
/// Exit code for filter process failures (spawn, pipe, wait, bad exit).
pub const EXIT_FILTER_ERROR: u8 = 4;
/// Exit code for output stream failures.
pub const EXIT_OUTPUT_ERROR: u8 = 7;
/// Exit code for internal failures (producer task died unexpectedly).
pub const EXIT_INTERNAL_ERROR: u8 = 70;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the input stream failed.
    #[error("error reading input: {0}")]
    Read(#[source] std::io::Error),

    /// An input line is not valid base64. Indicates stream corruption,
    /// fatal to the whole run.
    #[error("error decoding input line {line}: {source}")]
    Decode {
        /// 1-based input line number.
        line: u64,
        #[source]
        source: base64::DecodeError,
    },

    /// The filter process could not be spawned.
    #[error("error starting filter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the document to the filter's stdin failed.
    #[error("error writing to filter '{program}': {source}")]
    Stdin {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Closing the filter's stdin failed.
    #[error("error closing input pipe of filter '{program}': {source}")]
    StdinClose {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Draining the filter's stdout failed.
    #[error("error reading output of filter '{program}': {source}")]
    Stdout {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Draining the filter's stderr failed.
    #[error("error reading standard error of filter '{program}': {source}")]
    Stderr {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the filter to exit failed.
    #[error("error waiting for filter '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The filter exited with a non-success status.
    #[error("filter '{program}' failed: {status}")]
    FilterExit { program: String, status: ExitStatus },

    /// Writing an encoded line to the output stream failed.
    #[error("error writing output: {0}")]
    Write(#[source] std::io::Error),

    /// JSON serialization error (run summary).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The framer task stopped without closing its channel cleanly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Read(_) | PipelineError::Decode { .. } => EXIT_INPUT_ERROR,
            PipelineError::Spawn { .. }
            | PipelineError::Stdin { .. }
            | PipelineError::StdinClose { .. }
            | PipelineError::Stdout { .. }
            | PipelineError::Stderr { .. }
            | PipelineError::Wait { .. }
            | PipelineError::FilterExit { .. } => EXIT_FILTER_ERROR,
            PipelineError::Write(_) => EXIT_OUTPUT_ERROR,
            PipelineError::Json(_) | PipelineError::Internal(_) => EXIT_INTERNAL_ERROR,
        }
    }

    /// Format error with full details including the source chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_class() {
        let decode = PipelineError::Decode {
            line: 3,
            source: base64::DecodeError::InvalidLength(1),
        };
        assert_eq!(decode.exit_code(), EXIT_INPUT_ERROR);

        let spawn = PipelineError::Spawn {
            program: "cat".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(spawn.exit_code(), EXIT_FILTER_ERROR);

        let write = PipelineError::Write(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(write.exit_code(), EXIT_OUTPUT_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let err = PipelineError::Stdin {
            program: "gzip".into(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed early"),
        };
        let detailed = err.format_detailed();
        assert!(detailed.contains("error writing to filter 'gzip'"));
        assert!(detailed.contains("Caused by:"));
        assert!(detailed.contains("pipe closed early"));
    }

    #[test]
    fn test_decode_error_names_line() {
        let err = PipelineError::Decode {
            line: 42,
            source: base64::DecodeError::InvalidPadding,
        };
        assert!(err.to_string().contains("line 42"));
    }
}

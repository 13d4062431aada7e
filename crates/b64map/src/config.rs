//! Run configuration threaded explicitly into the framer and driver.

/// Line-terminator convention for the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Lines end at LF; a CR immediately before the LF is stripped, so
    /// both Unix and DOS input are accepted.
    #[default]
    Auto,

    /// Lines end at LF only. A CR is document content (and, being
    /// outside the base64 alphabet, normally surfaces as corruption).
    Lf,
}

/// Pipeline behavior configuration.
///
/// Replaces the ambient debug/progress globals of earlier designs: the
/// one value is built once from the command line and passed into the
/// framer and driver constructors.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Log a progress line every this many documents. 0 disables.
    pub progress_every: u64,

    /// Line-terminator convention for input framing.
    pub line_ending: LineEnding,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            progress_every: 100,
            line_ending: LineEnding::Auto,
        }
    }
}

impl RunConfig {
    /// Set the progress interval.
    pub fn with_progress_every(mut self, every: u64) -> Self {
        self.progress_every = every;
        self
    }

    /// Set the line-terminator convention.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}

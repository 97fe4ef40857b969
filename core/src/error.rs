//! Error

use std::error::Error as StdError;
use std::fmt;

/// Result type used throughout the renderer.
pub type Result<T> = std::result::Result<T, Error>;

/// Renderer errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid renderer parameters or options.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A failure while the renderer is running, outside any kernel.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A switch received an id it has no case for.
    #[error("unreachable dispatch in switch '{switch}': id {id} is outside [0, {cases})")]
    UnreachableDispatch {
        /// Name of the switch.
        switch: String,
        /// The id that was dispatched on.
        id: u32,
        /// Number of cases in the switch.
        cases: usize,
    },

    /// A switch was given two cases for the same id.
    #[error("switch '{switch}' has more than one case for id {id}")]
    DuplicateCase {
        /// Name of the switch.
        switch: String,
        /// The duplicated id.
        id: u32,
    },

    /// A switch is missing a case for an id in its range.
    #[error("switch '{switch}' has no case for id {id}")]
    MissingCase {
        /// Name of the switch.
        switch: String,
        /// The missing id.
        id: u32,
    },

    /// A kernel lane failed and aborted the launch.
    #[error("kernel '{kernel}' failed")]
    KernelLaunch {
        /// Name of the kernel.
        kernel: String,
        /// The lane error.
        #[source]
        source: Box<Error>,
    },

    /// An error with additional context.
    #[error("{message}")]
    Context {
        /// Description of what was being done.
        message: String,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },

    /// A stage asked for more path slots than the state pool holds.
    #[error("resource exhausted: {requested} slots requested, capacity is {capacity}")]
    ResourceExhausted {
        /// Number of slots requested.
        requested: usize,
        /// Pool capacity.
        capacity: usize,
    },

    /// Image output failed.
    #[error("image error: {0}")]
    Image(String),

    /// Scene construction failed.
    #[error("scene error: {0}")]
    Scene(String),
}

impl Error {
    /// Wraps the error with a context message.
    ///
    /// * `message` - Description of what was being done.
    pub fn context<S: Into<String>>(self, message: S) -> Self {
        Self::Context {
            message: message.into(),
            source: Box::new(self),
        }
    }
}

/// Extension for adding context to results.
pub trait ResultExt<T> {
    /// Wraps an error with a context message built on demand.
    ///
    /// * `f` - Builds the message.
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| e.context(f()))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Image(e.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e.to_string())
    }
}

impl From<exr::error::Error> for Error {
    fn from(e: exr::error::Error) -> Self {
        Self::Image(e.to_string())
    }
}

/// Formats an error and all of its sources as `a: b: c`.
pub struct ErrorChain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(e) = source {
            write!(f, ": {}", e)?;
            source = e.source();
        }
        Ok(())
    }
}

use crate::scale::Scale;

/// All errors that can occur while building Vole graph nodes.
///
/// The first five variants are validation failures: they are detected before
/// any node reaches the engine and always indicate bad shapes or parameters
/// supplied by the caller. The remaining variants describe problems at the
/// engine boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Channel counts that must agree do not (input vs filter, diff vs filter).
    #[error("{context}: expected {expected}, got {got}")]
    ChannelMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// Image counts that must agree across operands do not.
    #[error("{context}: expected {expected}, got {got}")]
    BatchMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// Two operands that must have identical shapes do not.
    #[error("{context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: &'static str,
        expected: Scale,
        got: Scale,
    },

    /// An operand has the wrong number of dimensions.
    #[error("{context}: expected rank {expected}, got {got}")]
    RankMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// A numeric parameter makes the output shape undefined (zero stride,
    /// window larger than the padded input).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A descriptor was submitted with the wrong number of inputs.
    #[error("{op} takes {expected} inputs, got {got}")]
    Arity {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    /// Failure reported by the engine.
    #[error("engine error: {0}")]
    Engine(String),

    /// A profiling node completed with a result of the wrong kind.
    #[error("{op} completed with unexpected result {got}")]
    UnexpectedCompletion { op: &'static str, got: &'static str },
}

impl Error {
    /// Create an engine error from any string message.
    pub fn engine(s: impl Into<String>) -> Self {
        Error::Engine(s.into())
    }

    /// Whether this error is a caller-side validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ChannelMismatch { .. }
                | Error::BatchMismatch { .. }
                | Error::ShapeMismatch { .. }
                | Error::RankMismatch { .. }
                | Error::InvalidParameter(_)
        )
    }
}

/// Convenience Result type used throughout Vole.
pub type Result<T> = std::result::Result<T, Error>;

/// Early return with an [`Error::InvalidParameter`] built from a format string.
#[macro_export]
macro_rules! bail_param {
    ($($arg:tt)*) => {
        return Err($crate::Error::InvalidParameter(format!($($arg)*)))
    };
}

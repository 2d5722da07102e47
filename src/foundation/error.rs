use crate::foundation::core::FrameIndex;

/// Result alias used throughout the crate.
pub type VisarResult<T> = Result<T, VisarError>;

/// Error type for every fallible operation in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum VisarError {
    /// A configuration or call parameter was rejected before any computation began.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A sample fell outside the domain of a physical transform.
    #[error("domain error{} at ({row}, {col}): {reason}", fmt_frame(.frame))]
    Domain {
        /// Frame the sample belongs to, when known.
        frame: Option<FrameIndex>,
        /// Row of the offending sample.
        row: usize,
        /// Column of the offending sample.
        col: usize,
        /// What went wrong.
        reason: String,
    },

    /// A render worker failed; the whole batch was discarded.
    #[error("worker failure on frame {frame}: {source}")]
    WorkerFailure {
        /// Frame the failing worker owned.
        frame: FrameIndex,
        /// Underlying failure.
        source: Box<VisarError>,
    },

    /// Encoder or sink failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Configuration (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_frame(frame: &Option<FrameIndex>) -> String {
    match frame {
        Some(f) => format!(" in frame {}", f.0),
        None => String::new(),
    }
}

impl VisarError {
    /// Build an [`VisarError::InvalidParameter`].
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`VisarError::Domain`] for the sample at `(row, col)` with no frame attached yet.
    pub fn domain(row: usize, col: usize, reason: impl Into<String>) -> Self {
        Self::Domain {
            frame: None,
            row,
            col,
            reason: reason.into(),
        }
    }

    /// Build an [`VisarError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`VisarError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Attach a frame index to a domain error. Other variants pass through unchanged.
    pub fn with_frame(self, idx: FrameIndex) -> Self {
        match self {
            Self::Domain {
                row, col, reason, ..
            } => Self::Domain {
                frame: Some(idx),
                row,
                col,
                reason,
            },
            other => other,
        }
    }

    /// Frame index carried by this error, if any.
    pub fn frame(&self) -> Option<FrameIndex> {
        match self {
            Self::Domain { frame, .. } => *frame,
            Self::WorkerFailure { frame, .. } => Some(*frame),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

//! Error types for control-path engine operations.
//!
//! Nothing on the audio path returns these: rendering degrades to silence
//! and bad source indices resolve to "no modulation".

use thiserror::Error;

/// Errors from table loading and parameter access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// A wavetable source buffer had no samples
    #[error("wavetable buffer {index} is empty")]
    EmptyBuffer {
        /// Position of the empty buffer in the load request.
        index: usize,
    },

    /// A load request carried no buffers at all
    #[error("no wavetable buffers supplied")]
    NoBuffers,

    /// A parameter path that does not name any parameter
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// A waveform shape name that is not recognised
    #[error("unknown wavetable shape: {0}")]
    UnknownShape(String),

    /// A table target name that is not recognised
    #[error("unknown table target: {0}")]
    UnknownTarget(String),

    /// A non-finite parameter value
    #[error("invalid value {value} for parameter '{path}'")]
    InvalidValue {
        /// Parameter path the value was meant for.
        path: String,
        /// The rejected value.
        value: f32,
    },
}

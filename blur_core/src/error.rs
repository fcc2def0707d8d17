use thiserror::Error;

/// Failures surfaced by the blur pipeline.
///
/// No variant is retried internally, and no partially written buffer ever
/// escapes alongside an error.
#[derive(Error, Debug)]
pub enum BlurError {
    /// A working buffer or scratch allocation failed, or its byte size
    /// overflowed. Carries the requested length.
    #[error("allocation of {0} bytes failed")]
    Allocation(usize),

    /// Source pixel data is missing or shorter than its descriptor declares.
    #[error("source pixel data is unavailable")]
    SourceUnavailable,

    /// A pixel layout the pipeline cannot express.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),
}

use thiserror::Error;

/// Application-level errors produced by the blur tool.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input image file does not exist.
    #[error("Input file does not exist: {0}")]
    MissingInput(String),

    /// Params file does not exist.
    #[error("Params file does not exist: {0}")]
    MissingParams(String),

    /// I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error occurred while decoding or encoding an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Params file is not valid TOML.
    #[error("Params error: {0}")]
    Config(#[from] toml::de::Error),

    /// Blend color string is not a recognized hex color.
    #[error("Invalid blend color: {0}")]
    InvalidBlendColor(String),

    /// Blend mode string is not a recognized composite mode.
    #[error("Invalid blend mode: {0}")]
    InvalidBlendMode(String),

    /// The blur pipeline failed.
    #[error("Blur error: {0}")]
    Blur(#[from] blur_core::BlurError),
}

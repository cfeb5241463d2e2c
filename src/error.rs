use std::path::PathBuf;

/// Every failure a chart session can surface to the user.
#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    /// The source image could not be read or decoded.
    #[error("Failed to open image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A tone index outside the current tone range was selected.
    #[error("Tone index must be between 0 and {max}, got {index}.", max = .tones.saturating_sub(1))]
    InvalidTone { index: usize, tones: u8 },

    /// The export destination could not be written.
    #[error("Failed to save {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered chart could not be encoded.
    #[error("Failed to encode chart image. {0}")]
    Encode(#[from] image::ImageError),

    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a chart config.
    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A color string was not `#RRGGBB`.
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    /// A command-line value could not be interpreted.
    #[error("{0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;

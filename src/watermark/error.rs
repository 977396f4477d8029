use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid watermark configuration: {0}")]
    InvalidConfig(String),

    #[error("No usable font: {0}")]
    FontUnavailable(String),

    #[error("Composition task failed: {0}")]
    TaskFailed(String),
}

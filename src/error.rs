/// Errors produced by a detection cycle.
///
/// A detection cycle is all-or-nothing: the first error aborts it and is handed back to the
/// caller unchanged. Nothing here is fatal to the process, the next image starts from scratch.
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    /// A pixel buffer or model output does not match the dimensions it claims to have.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The inference engine failed to produce an output.
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    #[error("Inference failed: {0}")]
    Ort(#[from] ort::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DetectionError {
    /// True for both flavours of inference failure.
    pub fn is_inference_failure(&self) -> bool {
        matches!(
            self,
            DetectionError::InferenceFailure(_) | DetectionError::Ort(_)
        )
    }
}

use thiserror::Error;

/// Why an inbound text frame was refused before reaching the pipeline.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid JSON received: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of landmarks, got {0}")]
    NotAnArray(&'static str),

    #[error("landmark {index} is malformed: {source}")]
    Landmark {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while turning an accepted landmark set into a label.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("model backend failed: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("model returned no class scores")]
    EmptyOutput,

    #[error("inference worker did not complete: {0}")]
    Worker(String),
}

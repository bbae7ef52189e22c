use thiserror::Error;

/// Errors raised while turning a chart request into a figure.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
    #[error("Unknown trace kind '{0}' (expected scatter, bar or histogram)")]
    UnknownTraceKind(String),
    #[error("A renderer has already been initialized")]
    RendererAlreadyInitialized,
    #[error("Invalid chart request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error("Failed to render figure: {0:#}")]
    Render(anyhow::Error),
}

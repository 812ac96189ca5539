//! Error taxonomy for the signer surface.
//!
//! Setup errors abort `initialize` and reach the caller. Collaborator failures
//! (render, mutation, host) surface unchanged; nothing is retried.

/// Stable machine-readable code for an error, for the host UI.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("surface not initialized")]
    UninitializedSurface,
    #[error("surface already initialized")]
    AlreadyInitialized,
    #[error("{0} is not a supported file type")]
    UnsupportedSourceType(String),
    #[error("missing geometry: {0}")]
    MissingGeometry(&'static str),
    #[error("container not found: {0}")]
    MissingContainer(String),
    #[error("document has no pages")]
    EmptyDocument,
    #[error("page {page} out of range 1..={total}")]
    PageOutOfRange { page: usize, total: usize },
    #[error("native document has {native} pages, canvas has {rendered}")]
    PageCountMismatch { native: usize, rendered: usize },
    #[error("page render failed: {0}")]
    Render(String),
    #[error("document mutation failed: {0}")]
    Mutation(String),
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    #[error("host surface error: {0}")]
    Host(String),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("config parse failed: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl ErrorCode for SignerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UninitializedSurface => "E_UNINITIALIZED",
            Self::AlreadyInitialized => "E_ALREADY_INITIALIZED",
            Self::UnsupportedSourceType(_) => "E_UNSUPPORTED_SOURCE",
            Self::MissingGeometry(_) => "E_MISSING_GEOMETRY",
            Self::MissingContainer(_) => "E_MISSING_CONTAINER",
            Self::EmptyDocument => "E_EMPTY_DOCUMENT",
            Self::PageOutOfRange { .. } => "E_PAGE_OUT_OF_RANGE",
            Self::PageCountMismatch { .. } => "E_PAGE_COUNT_MISMATCH",
            Self::Render(_) => "E_RENDER",
            Self::Mutation(_) => "E_MUTATION",
            Self::Rasterize(_) => "E_RASTERIZE",
            Self::Host(_) => "E_HOST",
            Self::Image(_) => "E_IMAGE",
            Self::Config(_) => "E_CONFIG_PARSE",
            Self::InvalidConfig(_) => "E_CONFIG_INVALID",
        }
    }
}

impl SignerError {
    /// Setup-time errors that leave the surface unusable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingContainer(_) | Self::MissingGeometry(_) | Self::UnsupportedSourceType(_) | Self::EmptyDocument
        )
    }
}

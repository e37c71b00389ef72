pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] planviz_core::Error),

    /// A drawing element referenced by id or handle is not part of the drawing.
    #[error("drawing element not found: {id}")]
    MissingElement { id: String },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing(id: impl Into<String>) -> Self {
        Self::MissingElement { id: id.into() }
    }
}

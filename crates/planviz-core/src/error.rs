pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DOT parse error at {line}:{column}: {message}")]
    DotParse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Invalid page metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn dot(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::DotParse {
            line,
            column,
            message: message.into(),
        }
    }
}

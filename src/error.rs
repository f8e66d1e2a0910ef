use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decode records: {0}")]
    Json(#[from] serde_json::Error),
}

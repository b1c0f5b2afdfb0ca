use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read credentials file {path}: {source}")]
    CredentialsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed credentials: expected 4 fields separated by \", \", found {0}")]
    MalformedCredentials(usize),

    #[error("no such account: @{0}")]
    NotFound(String),

    #[error("twitter api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Http(#[from] hyper::Error),

    #[error("request build failed: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("oauth error: {0}")]
    OAuth(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl Error {
    /// Upstream failures that are not the caller's fault.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

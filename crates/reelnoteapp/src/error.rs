use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelnoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid media type: {0}")]
    InvalidMediaKind(String),

    #[error("poster not available")]
    NoPoster,

    #[error("empty content")]
    EmptyContent,

    #[error("no content generated")]
    NoContentGenerated,

    #[error("empty TMDB details")]
    EmptyDetails,

    #[error("no TMDB ID found, cannot generate content")]
    MissingExternalId,

    #[error("no TMDB type found, cannot generate content")]
    MissingExternalType,

    #[error("processing stopped by user")]
    StopRequested,

    #[error("operation cancelled")]
    Cancelled,

    #[error("tmdb: unexpected status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Input(String),
}

impl From<confique::Error> for ReelnoteError {
    fn from(err: confique::Error) -> Self {
        ReelnoteError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReelnoteError>;

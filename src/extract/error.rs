use thiserror::Error;

/// Errors from a single extraction call
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extractor API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("No structured output in extractor response")]
    MissingOutput,

    #[error("Malformed extractor output: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebdriverError>;

#[derive(Debug, Error)]
pub enum WebdriverError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("WebDriver error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for WebdriverError {
    fn from(err: reqwest::Error) -> Self {
        WebdriverError::Network(err.to_string())
    }
}

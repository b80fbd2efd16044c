use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Alert error: {0}")]
    Alert(String),

    #[error("Navigation error: {0}")]
    Navigation(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;

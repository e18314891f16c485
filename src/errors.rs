#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("StorageError: {0}")]
    Storage(#[from] std::io::Error),
    #[error("SerdeError: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("RequestError: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HttpError: {0}")]
    Http(reqwest::StatusCode),
    #[error("ConfigError: {0}")]
    Config(#[from] config::ConfigError),
}

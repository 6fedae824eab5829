use thiserror::Error;

#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("A training run is already in progress")]
    TrainingInProgress,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

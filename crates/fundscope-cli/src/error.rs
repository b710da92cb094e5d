use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] fundscope_core::ValidationError),

    #[error(transparent)]
    Config(#[from] fundscope_core::ConfigError),

    #[error(transparent)]
    Fetch(#[from] fundscope_core::FetchError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] fundscope_store::StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(fundscope_core::ConfigError::Store(_)) => 10,
            Self::Config(_) => 2,
            Self::Fetch(_) => 3,
            Self::Serialization(_) => 4,
            Self::Store(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] barfeed_core::ValidationError),

    #[error("config error: {0}")]
    Config(String),

    #[error("{failed} of {attempted} symbols failed")]
    PartialFailure { failed: usize, attempted: usize },

    #[error(transparent)]
    Store(#[from] barfeed_store::StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Config(_) => 2,
            Self::PartialFailure { .. } => 3,
            Self::Store(_) | Self::Io(_) => 10,
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] routrain_core::Error),
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("No route through waypoints {0:?}")]
    NoRoute(Vec<routrain_core::NodeId>),
}

impl AppError {
    /// Process exit code: 2 for broken invariants, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Core(e) if e.is_invariant_violation() => 2,
            _ => 1,
        }
    }
}

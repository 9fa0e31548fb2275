#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum TowerError {
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("{0}")]
    ValidationFailure(String),
    #[error("team store rejected {name}: {reason}")]
    DuplicateOrFull { name: String, reason: String },
}

impl TowerError {
    pub fn network(err: impl ToString) -> Self {
        TowerError::NetworkFailure(err.to_string())
    }
}

use thiserror::Error;

/// Core error type shared across menuguard crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A table the validator cannot run without is absent from the snapshot.
    #[error("missing table(s): {}", .0.join(", "))]
    MissingTables(Vec<String>),
    /// The snapshot violates structural invariants.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Convenience alias for results returned by menuguard crates.
pub type Result<T> = std::result::Result<T, Error>;

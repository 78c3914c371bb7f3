//! Error types for the domain model.

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Split sheet title is blank
    #[error("Split title must not be empty")]
    EmptyTitle,

    /// Split sheet lists nobody
    #[error("Split must have at least one participant")]
    NoParticipants,

    /// Participant with a blank name
    #[error("Participant name must not be empty")]
    UnnamedParticipant,

    /// Share that is not a number in 0-100
    #[error("Participant {name} has invalid share {percentage}")]
    InvalidShare { name: String, percentage: f64 },

    /// Shares do not add up to a whole
    #[error("Participant percentages must sum to 100, got {total}")]
    PercentageSum { total: f64 },

    /// Payout with a negative or non-finite amount
    #[error("Payout {id} has an invalid amount")]
    NegativeAmount { id: String },
}

/// Key that names no security setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown security setting: {0}")]
pub struct UnknownSetting(pub String);

/// Error types for model operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Sealed blob could not be produced or read back
    #[error("Seal error: {0}")]
    Seal(String),
}

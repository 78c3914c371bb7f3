//! Error types for the session crate.

use rap_model::{ModelError, UnknownSetting, ValidationError};

/// Error types for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Operation needs an enrolled profile
    #[error("Session not onboarded")]
    NotOnboarded,

    /// Onboarding already completed for this session
    #[error("Session already onboarded")]
    AlreadyOnboarded,

    /// Onboarding flow cannot move on yet
    #[error("Onboarding step incomplete: {0}")]
    OnboardingIncomplete(String),

    /// No split with this identifier
    #[error("Unknown split: {0}")]
    UnknownSplit(String),

    /// Invalid caller input
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown security setting key
    #[error(transparent)]
    UnknownSetting(#[from] UnknownSetting),

    /// Model error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Advisor error
    #[error("Advisor error: {0}")]
    Advisor(#[from] rap_advisor::AdvisorError),

    /// No advisor configured for this session
    #[error("No advisor configured")]
    AdvisorUnavailable,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

//! RAP Advisor - AI collaborators for contract audits and advisor chat
//!
//! Provides the boundary between the session and generative-AI services:
//! - Trait-based LLM backends (OpenAI-compatible HTTP, mock for tests)
//! - Contract auditing that returns a [`rap_model::ContractAnalysis`]
//! - Advisor chat transcripts that degrade to a fixed fallback on failure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            AdvisorService               │
//! │   (contract audits + advisor replies)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │Conversation │
//! │ (OpenAI/    │       │ (transcript │
//! │  Mock)      │       │  + fallback)│
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod chat;
pub mod config;
pub mod service;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use chat::{Conversation, Turn, TurnRole};
pub use config::AdvisorConfig;
pub use service::{AdvisorError, AdvisorService};

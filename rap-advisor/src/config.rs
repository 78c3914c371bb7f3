//! Configuration for the advisor service.

use serde::{Deserialize, Serialize};

/// Persona given to the advisor model.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are the RAP (Real Artist Protection) AI Advisor. \
You are an artist rights advocate. Your goal is to protect artists from exploitation, \
interpret complex legal jargon, and provide strategic career advice. Be assertive, \
transparent, and strictly artist-first. Every response should emphasize that RAP is built \
to prevent industry disputes and data manipulation.";

/// Reply substituted when the advisor cannot be reached.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Neural connection interrupted. Re-securing communication line...";

/// Opening turn of every advisor conversation.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to the RAP War Room. I've completed a forensic \
audit of your metadata lineage and I'm ready to review contracts, splits and payouts. \
How would you like to proceed?";

/// Configuration for the AdvisorService.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Model name requested from the backend
    pub model: String,
    /// System prompt for advisor chat
    pub system_instruction: String,
    /// Maximum tokens per reply
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Deadline for one backend call (ms)
    pub request_timeout_ms: u64,
    /// Reply shown when a chat turn fails
    pub fallback_message: String,
    /// First AI turn of a new conversation
    pub welcome_message: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            request_timeout_ms: 30_000,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AdvisorConfig = serde_json::from_str(r#"{"model": "gpt-4o-mini"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.fallback_message, DEFAULT_FALLBACK_MESSAGE);
        assert_eq!(config.request_timeout_ms, 30_000);
    }
}

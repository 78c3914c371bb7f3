//! Domain model for Real Artist Protection (RAP).
//!
//! This crate holds the plain records every view reads and the session store
//! mutates, plus the mock security utilities that stand in for identity,
//! proof and threat-detection primitives:
//!
//! - **Identity**: [`UserProfile`] with a client-generated wallet and DID
//! - **Rights**: [`SplitSheet`] ownership splits with a mock proof token
//! - **Revenue**: [`PayoutTransaction`] reconciled payout events
//! - **Audits**: [`ContractAnalysis`] results from the contract auditor
//! - **Security**: [`SecurityMetrics`] telemetry and [`SecuritySettings`] toggles
//!
//! None of the utilities in [`security`] provide real cryptographic
//! guarantees. Randomness is always drawn from an injected [`RandomSource`]
//! so tests can script it.
//!
//! # Example
//!
//! ```ignore
//! use rap_model::{security, ThreadRandom, UserProfile};
//!
//! let rng = ThreadRandom;
//! let profile = UserProfile::enroll("Neon Ghost", "Jane Doe", None, &rng);
//! let proof = security::generate_zk_proof(&profile.wallet_address, &rng);
//! ```

pub mod demo;
pub mod error;
pub mod random;
pub mod security;
pub mod types;

// Re-export main types
pub use error::{ModelError, UnknownSetting, ValidationError};
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};
pub use types::*;

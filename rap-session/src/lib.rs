//! RAP Session - the client-side application state machine
//!
//! Holds every mutable record of one artist session and funnels all change
//! through named operations:
//!
//! - **Store**: profile, reputation, splits, payouts, audits, settings, metrics
//! - **Threat monitor**: timed intrusion polling with a `REACTIVE` dwell window
//! - **Onboarding**: the step flow that ends in an enrolled profile
//! - **Advisor**: contract audits and chat through `rap-advisor`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                             │
//! │                                                             │
//! │  ┌──────────────┐   ┌───────────────┐   ┌───────────────┐  │
//! │  │ SessionState │◄──│ ThreatMonitor │   │ AdvisorService│  │
//! │  │  (store)     │   │  (timer task) │   │ + Conversation│  │
//! │  └──────────────┘   └───────────────┘   └───────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod monitor;
pub mod onboarding;
pub mod session;
pub mod store;
pub mod types;

// Re-export main types
pub use config::SessionConfig;
pub use monitor::{MonitorHandle, PollOutcome, ThreatMonitor};
pub use onboarding::{OnboardingFlow, OnboardingStep};
pub use session::Session;
pub use store::{PayoutLedger, SessionSnapshot, SessionState};
pub use types::*;

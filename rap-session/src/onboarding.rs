//! Onboarding flow.
//!
//! Four steps ending in profile enrollment. The biometric scan is a timed
//! progress bar; camera access is cosmetic and never gates progression.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Result, SessionError};

/// Scan progress added per tick.
pub const SCAN_STEP: u8 = 2;

/// Scan progress at completion.
pub const SCAN_COMPLETE: u8 = 100;

/// One onboarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    IdentityInitialization,
    BiometricScan,
    ZeroTrustSync,
    Welcome,
}

impl OnboardingStep {
    /// 1-based position in the flow.
    pub fn number(&self) -> u8 {
        match self {
            Self::IdentityInitialization => 1,
            Self::BiometricScan => 2,
            Self::ZeroTrustSync => 3,
            Self::Welcome => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::IdentityInitialization => "Identity Initialization",
            Self::BiometricScan => "Cryptographic Biometrics",
            Self::ZeroTrustSync => "Zero-Trust Protocol",
            Self::Welcome => "Welcome to the Future",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::IdentityInitialization => {
                "Secure your creative sovereignty with RAP: Real Artist Protection."
            }
            Self::BiometricScan => {
                "Mapping your unique artist fingerprint for zero-trust verification powered by ROCC$TAR AI."
            }
            Self::ZeroTrustSync => {
                "Synchronizing with the global RAP rights ledger and security nodes."
            }
            Self::Welcome => {
                "Your protection layer is fully operational. You are now RAP-verified."
            }
        }
    }
}

/// Progress through onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingFlow {
    step: OnboardingStep,
    scan_progress: u8,
    /// Outcome of the camera request, if made
    media_device: Option<bool>,
}

impl Default for OnboardingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::IdentityInitialization,
            scan_progress: 0,
            media_device: None,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn scan_progress(&self) -> u8 {
        self.scan_progress
    }

    pub fn media_device(&self) -> Option<bool> {
        self.media_device
    }

    /// Ready to enroll the profile.
    pub fn is_complete(&self) -> bool {
        self.step == OnboardingStep::Welcome
    }

    /// Move past a step that waits on the user.
    ///
    /// The scan step advances only through [`scan_tick`](Self::scan_tick).
    pub fn advance(&mut self) -> Result<OnboardingStep> {
        self.step = match self.step {
            OnboardingStep::IdentityInitialization => OnboardingStep::BiometricScan,
            OnboardingStep::BiometricScan => {
                return Err(SessionError::OnboardingIncomplete(format!(
                    "biometric scan at {}%",
                    self.scan_progress
                )));
            }
            OnboardingStep::ZeroTrustSync => OnboardingStep::Welcome,
            OnboardingStep::Welcome => {
                return Err(SessionError::OnboardingIncomplete(
                    "flow finished, complete onboarding to enroll".to_string(),
                ));
            }
        };
        debug!(step = ?self.step, "Onboarding advanced");
        Ok(self.step)
    }

    /// Advance the biometric scan. Reaching 100% moves to the sync step.
    /// Ticks outside the scan step are ignored.
    pub fn scan_tick(&mut self) -> u8 {
        if self.step != OnboardingStep::BiometricScan {
            return self.scan_progress;
        }

        self.scan_progress = self.scan_progress.saturating_add(SCAN_STEP).min(SCAN_COMPLETE);
        if self.scan_progress >= SCAN_COMPLETE {
            self.step = OnboardingStep::ZeroTrustSync;
            debug!("Biometric scan complete");
        }
        self.scan_progress
    }

    /// Record whether the camera was granted. Progression does not depend on it.
    pub fn record_media_device(&mut self, granted: bool) {
        if !granted {
            debug!("Camera unavailable, continuing with simulated scan");
        }
        self.media_device = Some(granted);
    }
}

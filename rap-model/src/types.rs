//! Core records for the RAP session.
//!
//! These are plain data: the session store owns every instance and is the
//! only writer. Field names serialize in camelCase to match the view layer.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{UnknownSetting, ValidationError};
use crate::random::RandomSource;
use crate::security;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Tolerance when checking that split percentages add up to 100.
const PERCENTAGE_EPSILON: f64 = 0.01;

/// Views the application can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum AppView {
    Dashboard,
    Contracts,
    Splits,
    Payouts,
    Security,
    Advisor,
    /// Entry view until the profile is enrolled
    #[default]
    Onboarding,
}

/// Identity record created once onboarding completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Artist display name
    pub name: String,
    /// Legal name used on agreements
    pub legal_name: String,
    /// Optional avatar reference (URL or asset key)
    pub avatar: Option<String>,
    /// Client-generated wallet address
    pub wallet_address: String,
    /// Mock decentralized identifier derived from the wallet
    pub did: String,
    /// When the identity was verified
    pub verified_at: DateTime<Utc>,
}

impl UserProfile {
    /// Enroll a new identity: generate a wallet, derive its DID, stamp now.
    pub fn enroll(
        name: impl Into<String>,
        legal_name: impl Into<String>,
        avatar: Option<String>,
        rng: &dyn RandomSource,
    ) -> Self {
        let wallet_address = security::generate_wallet_address(rng);
        let did = security::generate_did(&wallet_address, rng);
        Self {
            name: name.into(),
            legal_name: legal_name.into(),
            avatar,
            wallet_address,
            did,
            verified_at: Utc::now(),
        }
    }
}

/// Gamified standing of the artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Reputation {
    /// Score, only ever increases
    pub score: u32,
    /// Rank label, set independently of the score
    pub rank: String,
    /// Compliance percentage
    pub compliance_rate: u32,
    /// Number of deals closed this session
    pub total_deals: u32,
}

impl Reputation {
    /// Create a reputation at the given starting point with no deals.
    pub fn starting(score: u32, rank: impl Into<String>, compliance_rate: u32) -> Self {
        Self {
            score,
            rank: rank.into(),
            compliance_rate,
            total_deals: 0,
        }
    }
}

impl Default for Reputation {
    fn default() -> Self {
        Self::starting(0, "Unranked", 100)
    }
}

/// Lifecycle of a split sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SplitStatus {
    Pending,
    Verified,
    Disputed,
}

/// One party to a split sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    /// Share of the work, 0-100
    pub percentage: f64,
    /// Whether the participant signed off
    pub confirmed: bool,
    /// Whether the participant's identity was checked
    pub identity_verified: bool,
}

impl Participant {
    /// Create an unconfirmed participant.
    pub fn new(name: impl Into<String>, percentage: f64) -> Self {
        Self {
            name: name.into(),
            percentage,
            confirmed: false,
            identity_verified: false,
        }
    }

    /// Mark as confirmed and identity-verified.
    pub fn verified(mut self) -> Self {
        self.confirmed = true;
        self.identity_verified = true;
        self
    }
}

/// Caller input for creating a split sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SplitDraft {
    pub title: String,
    pub participants: Vec<Participant>,
}

impl SplitDraft {
    /// Start a draft with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            participants: Vec::new(),
        }
    }

    /// Add a participant.
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Sum of all participant percentages.
    pub fn total_percentage(&self) -> f64 {
        self.participants.iter().map(|p| p.percentage).sum()
    }

    /// Check title, names and that shares sum to 100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.participants.is_empty() {
            return Err(ValidationError::NoParticipants);
        }
        if self.participants.iter().any(|p| p.name.trim().is_empty()) {
            return Err(ValidationError::UnnamedParticipant);
        }
        if let Some(p) = self
            .participants
            .iter()
            .find(|p| !(0.0..=100.0).contains(&p.percentage))
        {
            return Err(ValidationError::InvalidShare {
                name: p.name.clone(),
                percentage: p.percentage,
            });
        }

        let total = self.total_percentage();
        if (total - 100.0).abs() > PERCENTAGE_EPSILON {
            return Err(ValidationError::PercentageSum { total });
        }

        Ok(())
    }
}

/// Ownership / royalty split agreement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SplitSheet {
    /// Random token identifying the sheet
    pub id: String,
    pub title: String,
    pub status: SplitStatus,
    /// Participants in entry order
    pub participants: Vec<Participant>,
    pub creation_date: DateTime<Utc>,
    /// Mock proof token
    pub hash: String,
}

impl SplitSheet {
    /// Build a verified sheet from a draft.
    pub fn from_draft(draft: SplitDraft, id: String, hash: String) -> Self {
        Self {
            id,
            title: draft.title,
            status: SplitStatus::Verified,
            participants: draft.participants,
            creation_date: Utc::now(),
            hash,
        }
    }
}

/// Partial update for a split sheet. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SplitPatch {
    pub title: Option<String>,
    pub status: Option<SplitStatus>,
    pub participants: Option<Vec<Participant>>,
    pub hash: Option<String>,
}

impl SplitPatch {
    /// Set the status.
    pub fn status(status: SplitStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merge the present fields into `sheet`.
    pub fn apply(self, sheet: &mut SplitSheet) {
        if let Some(title) = self.title {
            sheet.title = title;
        }
        if let Some(status) = self.status {
            sheet.status = status;
        }
        if let Some(participants) = self.participants {
            sheet.participants = participants;
        }
        if let Some(hash) = self.hash {
            sheet.hash = hash;
        }
    }
}

/// Reconciliation state of a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Cleared,
    Processing,
    Flagged,
}

/// One reconciled revenue event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PayoutTransaction {
    pub id: String,
    /// Platform or publisher the money came from
    pub source: String,
    /// Non-negative amount
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub verified: bool,
    pub status: PayoutStatus,
}

impl PayoutTransaction {
    /// Reject negative amounts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::NegativeAmount {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Severity of a flagged contract clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

/// A clause the auditor flagged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct RiskFlag {
    pub severity: Severity,
    /// Offending clause text
    pub clause: String,
    pub description: String,
    /// Suggested correction
    pub suggestion: String,
}

/// Result of one contract audit.
///
/// Accepted as the auditor returns it: missing fields default and
/// out-of-range scores are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct ContractAnalysis {
    /// 0-10, higher is riskier
    pub risk_score: f64,
    pub summary: String,
    pub equity_estimated: String,
    pub flags: Vec<RiskFlag>,
}

impl ContractAnalysis {
    /// Whether the score falls strictly below `threshold`.
    pub fn is_low_risk(&self, threshold: f64) -> bool {
        self.risk_score < threshold
    }

    /// Flags at the given severity.
    pub fn flags_at(&self, severity: Severity) -> impl Iterator<Item = &RiskFlag> {
        self.flags.iter().filter(move |f| f.severity == severity)
    }
}

/// Neural defense indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseStatus {
    #[default]
    Optimal,
    Reactive,
    /// Declared for the view layer, never produced by the monitor
    ThreatDetected,
}

impl DefenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimal => "OPTIMAL",
            Self::Reactive => "REACTIVE",
            Self::ThreatDetected => "THREAT_DETECTED",
        }
    }
}

/// Process-wide security telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SecurityMetrics {
    /// Cumulative simulated intrusion attempts
    pub intrusion_attempts: u64,
    pub encryption_strength: String,
    pub neural_defense_status: DefenseStatus,
    /// Proof tokens issued for new splits
    pub zk_proof_count: u64,
    /// Integrity percentage, constant
    pub enclave_integrity: f64,
}

impl Default for SecurityMetrics {
    fn default() -> Self {
        Self {
            intrusion_attempts: 0,
            encryption_strength: "AES-256-GCM".to_string(),
            neural_defense_status: DefenseStatus::Optimal,
            zk_proof_count: 0,
            enclave_integrity: 99.99,
        }
    }
}

/// Named security toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub enum SecuritySetting {
    DeepfakeAudio,
    VocalFingerprint,
    PredatoryBlocking,
    IdentityVault,
    EmotionalAlert,
    CoreActive,
    ZkpVerification,
}

impl SecuritySetting {
    /// Every setting, in display order.
    pub const ALL: [SecuritySetting; 7] = [
        Self::DeepfakeAudio,
        Self::VocalFingerprint,
        Self::PredatoryBlocking,
        Self::IdentityVault,
        Self::EmotionalAlert,
        Self::CoreActive,
        Self::ZkpVerification,
    ];

    /// Key used by the view layer.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DeepfakeAudio => "deepfakeAudio",
            Self::VocalFingerprint => "vocalFingerprint",
            Self::PredatoryBlocking => "predatoryBlocking",
            Self::IdentityVault => "identityVault",
            Self::EmotionalAlert => "emotionalAlert",
            Self::CoreActive => "coreActive",
            Self::ZkpVerification => "zkpVerification",
        }
    }
}

impl fmt::Display for SecuritySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SecuritySetting {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.key() == s)
            .ok_or_else(|| UnknownSetting(s.to_string()))
    }
}

/// Independent boolean toggles. No toggle affects any other record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub deepfake_audio: bool,
    pub vocal_fingerprint: bool,
    pub predatory_blocking: bool,
    pub identity_vault: bool,
    pub emotional_alert: bool,
    pub core_active: bool,
    pub zkp_verification: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            deepfake_audio: true,
            vocal_fingerprint: true,
            predatory_blocking: true,
            identity_vault: true,
            emotional_alert: true,
            core_active: true,
            zkp_verification: true,
        }
    }
}

impl SecuritySettings {
    fn slot(&mut self, setting: SecuritySetting) -> &mut bool {
        match setting {
            SecuritySetting::DeepfakeAudio => &mut self.deepfake_audio,
            SecuritySetting::VocalFingerprint => &mut self.vocal_fingerprint,
            SecuritySetting::PredatoryBlocking => &mut self.predatory_blocking,
            SecuritySetting::IdentityVault => &mut self.identity_vault,
            SecuritySetting::EmotionalAlert => &mut self.emotional_alert,
            SecuritySetting::CoreActive => &mut self.core_active,
            SecuritySetting::ZkpVerification => &mut self.zkp_verification,
        }
    }

    /// Current value of a setting.
    pub fn get(&self, setting: SecuritySetting) -> bool {
        match setting {
            SecuritySetting::DeepfakeAudio => self.deepfake_audio,
            SecuritySetting::VocalFingerprint => self.vocal_fingerprint,
            SecuritySetting::PredatoryBlocking => self.predatory_blocking,
            SecuritySetting::IdentityVault => self.identity_vault,
            SecuritySetting::EmotionalAlert => self.emotional_alert,
            SecuritySetting::CoreActive => self.core_active,
            SecuritySetting::ZkpVerification => self.zkp_verification,
        }
    }

    /// Flip one setting and return its new value.
    pub fn toggle(&mut self, setting: SecuritySetting) -> bool {
        let slot = self.slot(setting);
        *slot = !*slot;
        *slot
    }
}

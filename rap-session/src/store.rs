//! Session state store.
//!
//! The single authoritative holder of session records. Every mutation is a
//! synchronous `&mut self` method that completes before returning; derived
//! reputation and metrics are updated in the same call.

use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

use rap_model::random::RandomSource;
use rap_model::{
    demo, security, AppView, ContractAnalysis, PayoutStatus, PayoutTransaction, Reputation,
    SecurityMetrics, SecuritySetting, SecuritySettings, SplitDraft, SplitPatch, SplitSheet,
    UserProfile,
};

use crate::config::ReputationConfig;
use crate::types::{Result, SessionError};

/// All mutable records of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Reputation constants
    config: ReputationConfig,
    profile: Option<UserProfile>,
    reputation: Reputation,
    /// Newest first
    splits: VecDeque<SplitSheet>,
    /// Newest first
    payouts: VecDeque<PayoutTransaction>,
    /// Newest first
    audits: VecDeque<ContractAnalysis>,
    settings: SecuritySettings,
    metrics: SecurityMetrics,
    current_view: AppView,
}

impl SessionState {
    /// Create an empty, not yet onboarded session.
    pub fn new(config: ReputationConfig) -> Self {
        Self {
            config,
            profile: None,
            reputation: Reputation::default(),
            splits: VecDeque::new(),
            payouts: VecDeque::new(),
            audits: VecDeque::new(),
            settings: SecuritySettings::default(),
            metrics: SecurityMetrics::default(),
            current_view: AppView::Onboarding,
        }
    }

    /// Load the demo split sheets and payout ledger behind any existing records.
    pub fn seed_demo(&mut self) {
        self.splits.extend(demo::demo_splits());
        self.payouts.extend(demo::demo_payouts());
        debug!(
            splits = self.splits.len(),
            payouts = self.payouts.len(),
            "Seeded demo data"
        );
    }

    pub fn is_onboarded(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn reputation(&self) -> &Reputation {
        &self.reputation
    }

    /// Split sheets, newest first.
    pub fn splits(&self) -> impl Iterator<Item = &SplitSheet> {
        self.splits.iter()
    }

    /// Look up a split sheet.
    pub fn split(&self, id: &str) -> Option<&SplitSheet> {
        self.splits.iter().find(|s| s.id == id)
    }

    /// Payouts, newest first.
    pub fn payouts(&self) -> impl Iterator<Item = &PayoutTransaction> {
        self.payouts.iter()
    }

    /// Contract audits, newest first.
    pub fn audits(&self) -> impl Iterator<Item = &ContractAnalysis> {
        self.audits.iter()
    }

    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    pub fn metrics(&self) -> &SecurityMetrics {
        &self.metrics
    }

    /// Mutable metrics for the threat monitor.
    pub(crate) fn metrics_mut(&mut self) -> &mut SecurityMetrics {
        &mut self.metrics
    }

    pub fn current_view(&self) -> AppView {
        self.current_view
    }

    /// Store the enrolled profile and reset reputation to its starting point.
    ///
    /// Splits created before onboarding stay in place with their proof
    /// tokens still counted, so `total_deals` then trails `zk_proof_count`.
    pub fn complete_onboarding(&mut self, profile: UserProfile) -> Result<()> {
        if self.is_onboarded() {
            return Err(SessionError::AlreadyOnboarded);
        }

        info!(name = %profile.name, did = %profile.did, "Onboarding complete");

        self.profile = Some(profile);
        self.reputation = Reputation::starting(
            self.config.starting_score,
            self.config.starting_rank.clone(),
            self.config.compliance_rate,
        );
        self.current_view = AppView::Dashboard;
        Ok(())
    }

    /// Create a verified split sheet at the front of the collection.
    ///
    /// Each split counts as a deal, earns the split bonus and issues one
    /// proof token.
    pub fn create_split(&mut self, draft: SplitDraft, rng: &dyn RandomSource) -> Result<&SplitSheet> {
        draft.validate()?;

        let id = security::random_token(rng);
        let hash = security::generate_zk_proof(&id, rng);
        let sheet = SplitSheet::from_draft(draft, id, hash);

        info!(
            split_id = %sheet.id,
            title = %sheet.title,
            participants = sheet.participants.len(),
            "Split sheet created"
        );

        self.splits.push_front(sheet);
        self.reputation.total_deals += 1;
        self.reputation.score += self.config.split_bonus;
        self.metrics.zk_proof_count += 1;

        Ok(&self.splits[0])
    }

    /// Merge `patch` into the split with `id`. Returns whether it was found;
    /// an unknown id leaves the collection untouched.
    pub fn update_split(&mut self, id: &str, patch: SplitPatch) -> bool {
        match self.splits.iter_mut().find(|s| s.id == id) {
            Some(sheet) => {
                patch.apply(sheet);
                debug!(split_id = %id, "Split sheet updated");
                true
            }
            None => {
                debug!(split_id = %id, "Update for unknown split ignored");
                false
            }
        }
    }

    /// Regenerate the proof token of one split in place.
    pub fn rotate_split_proof(&mut self, id: &str, rng: &dyn RandomSource) -> Result<&str> {
        let sheet = self
            .splits
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SessionError::UnknownSplit(id.to_string()))?;

        sheet.hash = security::generate_zk_proof(&sheet.id, rng);
        debug!(split_id = %id, "Split proof rotated");

        Ok(sheet.hash.as_str())
    }

    /// Prepend a batch of payouts, keeping the batch order.
    pub fn record_payout_batch(&mut self, batch: Vec<PayoutTransaction>) -> Result<usize> {
        for tx in &batch {
            tx.validate()?;
        }

        let count = batch.len();
        for tx in batch.into_iter().rev() {
            self.payouts.push_front(tx);
        }

        info!(count, total = self.payouts.len(), "Payout batch recorded");
        Ok(count)
    }

    /// Prepend an audit; low-risk audits earn the audit bonus.
    /// Returns the bonus awarded.
    pub fn record_contract_audit(&mut self, analysis: ContractAnalysis) -> u32 {
        let bonus = if analysis.is_low_risk(self.config.low_risk_threshold) {
            self.config.audit_bonus
        } else {
            0
        };

        info!(risk_score = analysis.risk_score, bonus, "Contract audit recorded");

        self.audits.push_front(analysis);
        self.reputation.score += bonus;
        bonus
    }

    /// Flip one security setting and return its new value.
    pub fn toggle_security_setting(&mut self, setting: SecuritySetting) -> bool {
        let enabled = self.settings.toggle(setting);
        info!(setting = %setting, enabled, "Security setting toggled");
        enabled
    }

    /// Flip a setting named by its view-layer key.
    pub fn toggle_security_setting_key(&mut self, key: &str) -> Result<bool> {
        let setting: SecuritySetting = key.parse()?;
        Ok(self.toggle_security_setting(setting))
    }

    /// Switch views. Only onboarding is reachable before a profile exists.
    pub fn navigate(&mut self, view: AppView) -> Result<()> {
        if view != AppView::Onboarding && !self.is_onboarded() {
            return Err(SessionError::NotOnboarded);
        }
        self.current_view = view;
        Ok(())
    }

    /// Totals over the payout ledger.
    pub fn payout_ledger(&self) -> PayoutLedger {
        self.payouts.iter().fold(PayoutLedger::default(), |mut ledger, tx| {
            match tx.status {
                PayoutStatus::Cleared => {
                    ledger.cleared += 1;
                    ledger.cleared_amount += tx.amount;
                }
                PayoutStatus::Processing => ledger.processing += 1,
                PayoutStatus::Flagged => ledger.flagged += 1,
            }
            ledger
        })
    }

    /// Owned copy of everything the view layer renders.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            profile: self.profile.clone(),
            reputation: self.reputation.clone(),
            splits: self.splits.iter().cloned().collect(),
            payouts: self.payouts.iter().cloned().collect(),
            audits: self.audits.iter().cloned().collect(),
            settings: self.settings.clone(),
            metrics: self.metrics.clone(),
            current_view: self.current_view,
            ledger: self.payout_ledger(),
        }
    }
}

/// Summary of the payout ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutLedger {
    pub cleared: usize,
    pub processing: usize,
    pub flagged: usize,
    /// Sum of cleared amounts
    pub cleared_amount: f64,
}

/// Read-only copy of the session for the view layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub profile: Option<UserProfile>,
    pub reputation: Reputation,
    pub splits: Vec<SplitSheet>,
    pub payouts: Vec<PayoutTransaction>,
    pub audits: Vec<ContractAnalysis>,
    pub settings: SecuritySettings,
    pub metrics: SecurityMetrics,
    pub current_view: AppView,
    pub ledger: PayoutLedger,
}

impl SessionSnapshot {
    /// JSON text for the view layer.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

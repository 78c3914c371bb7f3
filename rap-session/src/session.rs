//! Session - the controller that owns one artist session.
//!
//! All mutation goes through the named async methods here, which take the
//! store's write lock for the duration of one synchronous store operation.
//! The threat monitor is armed on onboarding and disarmed by
//! [`Session::end_session`].

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{info, warn};

use rap_advisor::{AdvisorService, Conversation, LlmBackend, Turn};
use rap_model::random::{RandomSource, ThreadRandom};
use rap_model::security;
use rap_model::{
    AppView, ContractAnalysis, PayoutStatus, PayoutTransaction, SecuritySetting, SplitDraft,
    SplitPatch, SplitSheet, UserProfile,
};

use crate::config::SessionConfig;
use crate::monitor::MonitorHandle;
use crate::onboarding::OnboardingFlow;
use crate::store::{SessionSnapshot, SessionState};
use crate::types::{Result, SessionError};

/// Largest simulated payout, in cents.
const MAX_PAYOUT_CENTS: u32 = 5_000_000;

/// One artist session.
pub struct Session {
    config: SessionConfig,
    state: Arc<RwLock<SessionState>>,
    rng: Arc<dyn RandomSource>,
    advisor: Option<Arc<AdvisorService>>,
    conversation: Mutex<Conversation>,
    monitor: Mutex<Option<MonitorHandle>>,
}

impl Session {
    /// Create a session that is not yet onboarded.
    pub fn new(config: SessionConfig) -> Self {
        let state = Self::fresh_state(&config);
        let conversation = Conversation::new(config.advisor.welcome_message.clone());

        Self {
            config,
            state: Arc::new(RwLock::new(state)),
            rng: Arc::new(ThreadRandom),
            advisor: None,
            conversation: Mutex::new(conversation),
            monitor: Mutex::new(None),
        }
    }

    /// Replace the randomness source.
    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Attach advisor backends, in order of preference.
    pub fn with_advisor(mut self, backends: Vec<Arc<dyn LlmBackend>>) -> Self {
        let service = AdvisorService::new(backends).with_config(self.config.advisor.clone());
        self.advisor = Some(Arc::new(service));
        self
    }

    /// Attach a Gemini advisor running the configured model.
    pub fn with_gemini(mut self, api_key: impl Into<String>) -> Result<Self> {
        let service = AdvisorService::gemini(self.config.advisor.clone(), api_key)?;
        self.advisor = Some(Arc::new(service));
        Ok(self)
    }

    fn fresh_state(config: &SessionConfig) -> SessionState {
        let mut state = SessionState::new(config.reputation.clone());
        if config.seed_demo_data {
            state.seed_demo();
        }
        state
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read access to the store.
    pub async fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().await
    }

    /// Owned copy of the current state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    /// Snapshot sealed with the mock vault encoding.
    pub async fn sealed_snapshot(&self) -> Result<String> {
        let snapshot = self.snapshot().await;
        Ok(security::seal(&snapshot)?)
    }

    /// Whether the threat monitor is running.
    pub async fn is_monitor_armed(&self) -> bool {
        self.monitor
            .lock()
            .await
            .as_ref()
            .is_some_and(MonitorHandle::is_running)
    }

    // ========================================================================
    // Onboarding
    // ========================================================================

    /// Store the profile, reset reputation and arm the threat monitor.
    pub async fn complete_onboarding(&self, profile: UserProfile) -> Result<()> {
        self.state.write().await.complete_onboarding(profile)?;

        let mut monitor = self.monitor.lock().await;
        if monitor.is_none() {
            *monitor = Some(MonitorHandle::spawn(
                Arc::clone(&self.state),
                Arc::clone(&self.rng),
                self.config.monitor.clone(),
            ));
        }
        Ok(())
    }

    /// Enroll a fresh identity once the onboarding flow has finished.
    pub async fn enroll(
        &self,
        flow: &OnboardingFlow,
        name: &str,
        legal_name: &str,
        avatar: Option<String>,
    ) -> Result<UserProfile> {
        if !flow.is_complete() {
            return Err(SessionError::OnboardingIncomplete(format!(
                "at step {} of 4",
                flow.step().number()
            )));
        }

        let profile = UserProfile::enroll(name, legal_name, avatar, self.rng.as_ref());
        self.complete_onboarding(profile.clone()).await?;
        Ok(profile)
    }

    /// Disarm the monitor and discard all session records.
    ///
    /// The session can be onboarded again afterwards.
    pub async fn end_session(&self) {
        if let Some(handle) = self.monitor.lock().await.take() {
            handle.disarm().await;
        }

        *self.state.write().await = Self::fresh_state(&self.config);
        *self.conversation.lock().await =
            Conversation::new(self.config.advisor.welcome_message.clone());

        info!(session_id = %self.config.session_id, "Session ended");
    }

    // ========================================================================
    // Store operations
    // ========================================================================

    pub async fn create_split(&self, draft: SplitDraft) -> Result<SplitSheet> {
        let mut state = self.state.write().await;
        let sheet = state.create_split(draft, self.rng.as_ref())?.clone();
        Ok(sheet)
    }

    /// Returns whether the split exists.
    pub async fn update_split(&self, id: &str, patch: SplitPatch) -> bool {
        self.state.write().await.update_split(id, patch)
    }

    /// Returns the new proof token.
    pub async fn rotate_split_proof(&self, id: &str) -> Result<String> {
        let mut state = self.state.write().await;
        let hash = state.rotate_split_proof(id, self.rng.as_ref())?.to_string();
        Ok(hash)
    }

    pub async fn record_payout_batch(&self, batch: Vec<PayoutTransaction>) -> Result<usize> {
        self.state.write().await.record_payout_batch(batch)
    }

    /// Reconcile one cleared payout per source and record them as a batch.
    pub async fn sync_payouts(&self, sources: &[&str]) -> Result<Vec<PayoutTransaction>> {
        let now = chrono::Utc::now();
        let batch: Vec<PayoutTransaction> = sources
            .iter()
            .map(|source| PayoutTransaction {
                id: format!("TX-{:04}", self.rng.below(10_000)),
                source: source.to_string(),
                amount: f64::from(self.rng.below(MAX_PAYOUT_CENTS)) / 100.0,
                timestamp: now,
                verified: true,
                status: PayoutStatus::Cleared,
            })
            .collect();

        self.record_payout_batch(batch.clone()).await?;
        Ok(batch)
    }

    /// Returns the score bonus awarded.
    pub async fn record_contract_audit(&self, analysis: ContractAnalysis) -> u32 {
        self.state.write().await.record_contract_audit(analysis)
    }

    pub async fn toggle_security_setting(&self, setting: SecuritySetting) -> bool {
        self.state.write().await.toggle_security_setting(setting)
    }

    pub async fn toggle_security_setting_key(&self, key: &str) -> Result<bool> {
        self.state.write().await.toggle_security_setting_key(key)
    }

    pub async fn navigate(&self, view: AppView) -> Result<()> {
        self.state.write().await.navigate(view)
    }

    // ========================================================================
    // Advisor
    // ========================================================================

    fn advisor(&self) -> Result<&AdvisorService> {
        self.advisor.as_deref().ok_or(SessionError::AdvisorUnavailable)
    }

    /// Audit a contract and record the result.
    ///
    /// On failure nothing is recorded and the error is returned.
    pub async fn audit_contract(&self, contract_text: &str) -> Result<ContractAnalysis> {
        let advisor = self.advisor()?;

        match advisor.analyze_contract(contract_text).await {
            Ok(analysis) => {
                self.record_contract_audit(analysis.clone()).await;
                Ok(analysis)
            }
            Err(e) => {
                warn!(error = %e, "Contract audit failed");
                Err(e.into())
            }
        }
    }

    /// Send a chat message. Returns the advisor's reply turn, or `None` for
    /// blank input. Advisor failures come back as the fallback turn.
    pub async fn ask_advisor(&self, message: &str) -> Result<Option<Turn>> {
        let advisor = self.advisor()?;
        let mut conversation = self.conversation.lock().await;
        Ok(conversation.send(advisor, message).await.cloned())
    }

    /// Copy of the chat transcript.
    pub async fn conversation(&self) -> Conversation {
        self.conversation.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rap_advisor::backend::MockBackend;
    use rap_model::{Participant, ScriptedRandom};

    fn session() -> Session {
        Session::new(SessionConfig::new("test-session"))
    }

    fn profile() -> UserProfile {
        UserProfile::enroll("Neon Ghost", "Jane Doe", None, &ThreadRandom)
    }

    #[tokio::test]
    async fn test_onboarding_arms_monitor() {
        let session = session();
        assert!(!session.is_monitor_armed().await);

        session.complete_onboarding(profile()).await.unwrap();
        assert!(session.is_monitor_armed().await);

        session.end_session().await;
        assert!(!session.is_monitor_armed().await);
        assert!(!session.read().await.is_onboarded());
    }

    #[tokio::test]
    async fn test_enroll_requires_finished_flow() {
        let session = session();
        let flow = OnboardingFlow::new();

        let result = session.enroll(&flow, "Neon Ghost", "Jane Doe", None).await;
        assert!(matches!(result, Err(SessionError::OnboardingIncomplete(_))));
        assert!(!session.is_monitor_armed().await);
    }

    #[tokio::test]
    async fn test_sync_payouts() {
        let session = session().with_random(Arc::new(ScriptedRandom::new(vec![42, 1_234_567])));

        let batch = session
            .sync_payouts(&["Spotify (Global)", "Apple Music"])
            .await
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, "TX-0042");
        assert_eq!(batch[0].amount, 12345.67);
        assert!(batch.iter().all(|tx| tx.verified && tx.status == PayoutStatus::Cleared));

        let state = session.read().await;
        let sources: Vec<&str> = state.payouts().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["Spotify (Global)", "Apple Music"]);
    }

    #[tokio::test]
    async fn test_audit_without_advisor() {
        let session = session();
        assert!(matches!(
            session.audit_contract("terms").await,
            Err(SessionError::AdvisorUnavailable)
        ));
        assert!(matches!(
            session.ask_advisor("hi").await,
            Err(SessionError::AdvisorUnavailable)
        ));
    }

    #[test]
    fn test_gemini_advisor_uses_config_model() {
        let mut config = SessionConfig::new("gemini");
        config.advisor.model = "gemini-2.5-flash".to_string();

        let session = Session::new(config).with_gemini("key").unwrap();

        assert_eq!(session.advisor().unwrap().backend_ids(), vec!["gemini-2.5-flash"]);
    }

    #[tokio::test]
    async fn test_failed_audit_leaves_state() {
        let backend = Arc::new(MockBackend::default().with_failure("rate limited"));
        let session = session().with_advisor(vec![backend]);

        let result = session.audit_contract("Clause 1").await;

        assert!(matches!(result, Err(SessionError::Advisor(_))));
        assert_eq!(session.read().await.audits().count(), 0);
    }

    #[tokio::test]
    async fn test_sealed_snapshot_unseals() {
        let session = session();
        session.complete_onboarding(profile()).await.unwrap();

        let sealed = session.sealed_snapshot().await.unwrap();
        let value: serde_json::Value = security::unseal(&sealed).unwrap();

        assert_eq!(value["profile"]["name"], "Neon Ghost");
        assert_eq!(value["reputation"]["score"], 820);
        session.end_session().await;
    }

    #[tokio::test]
    async fn test_create_split_returns_sheet() {
        let session = session();
        let draft = SplitDraft::new("Test")
            .with_participant(Participant::new("A", 60.0))
            .with_participant(Participant::new("B", 40.0));

        let sheet = session.create_split(draft).await.unwrap();
        assert_eq!(session.read().await.split(&sheet.id), Some(&sheet));
    }
}

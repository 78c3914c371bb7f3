//! AdvisorService - entry point for the AI collaborators.
//!
//! Wraps LLM backends behind two operations: contract audits that come back
//! as structured [`ContractAnalysis`] records, and free-text advisor replies.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use rap_model::ContractAnalysis;

use crate::backend::openai::OpenAiBackend;
use crate::backend::traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message,
};
use crate::config::AdvisorConfig;

/// Error types for the advisor.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// No backend answered the availability probe
    #[error("No LLM backend available")]
    NoBackendAvailable,

    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Audit reply was not a JSON object
    #[error("Malformed contract analysis: {0}")]
    MalformedAnalysis(String),

    /// Blank chat message
    #[error("Message is empty")]
    EmptyMessage,

    /// Blank contract text
    #[error("Contract text is empty")]
    EmptyContract,

    /// Audit reply hit the output token limit
    #[error("Contract analysis cut off after {0} tokens")]
    Truncated(u32),
}

/// Main entry point for advisor invocations.
pub struct AdvisorService {
    /// Configuration
    config: AdvisorConfig,
    /// Backends in order of preference
    backends: Vec<Arc<dyn LlmBackend>>,
}

impl AdvisorService {
    /// Create a new service with the given backends.
    pub fn new(backends: Vec<Arc<dyn LlmBackend>>) -> Self {
        Self {
            config: AdvisorConfig::default(),
            backends,
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: AdvisorConfig) -> Self {
        self.config = config;
        self
    }

    /// Service on Gemini, running the configured model.
    pub fn gemini(config: AdvisorConfig, api_key: impl Into<String>) -> Result<Self, AdvisorError> {
        let backend = OpenAiBackend::gemini(&config.model, api_key)?;
        Ok(Self::new(vec![Arc::new(backend)]).with_config(config))
    }

    /// Service on any OpenAI-compatible endpoint, running the configured model.
    pub fn openai_compatible(
        config: AdvisorConfig,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, AdvisorError> {
        let backend = OpenAiBackend::new(base_url, config.model.as_str(), api_key)?;
        Ok(Self::new(vec![Arc::new(backend)]).with_config(config))
    }

    /// Get the configuration.
    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Backend identifiers in order of preference.
    pub fn backend_ids(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.id()).collect()
    }

    /// Audit a contract for fairness and risk.
    ///
    /// The reply is accepted as-is: missing fields take defaults and scores
    /// outside 0-10 are kept. The response schema is only sent to backends
    /// with JSON mode; a reply cut off at the token limit is an error.
    pub async fn analyze_contract(&self, contract_text: &str) -> Result<ContractAnalysis, AdvisorError> {
        if contract_text.trim().is_empty() {
            return Err(AdvisorError::EmptyContract);
        }

        let backend = self.select_backend().await?;
        let max_tokens = self.output_budget(backend.as_ref());

        let mut request = CompletionRequest::user(format!(
            "Analyze this music industry contract for fairness and risks: {}",
            contract_text
        ))
        .with_max_tokens(max_tokens);
        if backend.capabilities().supports_json_mode {
            request = request.with_json_schema(analysis_schema());
        } else {
            debug!(backend = backend.id(), "Backend lacks JSON mode, sending audit without schema");
        }

        let completion = self.call(backend.as_ref(), request).await?;
        if completion.finish_reason == FinishReason::Length {
            return Err(AdvisorError::Truncated(max_tokens));
        }
        let analysis = parse_analysis(&completion.content)?;

        info!(
            risk_score = analysis.risk_score,
            flags = analysis.flags.len(),
            "Contract analysis received"
        );
        Ok(analysis)
    }

    /// Ask the advisor, given prior turns, and return the reply text.
    ///
    /// A reply cut off at the token limit is returned as far as it got.
    pub async fn advise(&self, history: Vec<Message>, message: &str) -> Result<String, AdvisorError> {
        if message.trim().is_empty() {
            return Err(AdvisorError::EmptyMessage);
        }

        let backend = self.select_backend().await?;
        let request = CompletionRequest::conversation(history, message)
            .with_system(&self.config.system_instruction)
            .with_max_tokens(self.output_budget(backend.as_ref()))
            .with_temperature(self.config.temperature);

        let completion = self.call(backend.as_ref(), request).await?;
        if completion.finish_reason != FinishReason::Stop {
            warn!(
                backend = backend.id(),
                finish_reason = ?completion.finish_reason,
                "Advisor reply incomplete"
            );
        }
        Ok(completion.content)
    }

    /// Select the first available backend.
    async fn select_backend(&self) -> Result<Arc<dyn LlmBackend>, AdvisorError> {
        for backend in &self.backends {
            if backend.is_available().await {
                debug!(backend = backend.id(), "Selected backend");
                return Ok(Arc::clone(backend));
            }
            warn!(backend = backend.id(), "Backend unavailable, trying next");
        }
        Err(AdvisorError::NoBackendAvailable)
    }

    /// Configured token limit, capped at what the backend can produce.
    fn output_budget(&self, backend: &dyn LlmBackend) -> u32 {
        self.config.max_tokens.min(backend.capabilities().max_output_tokens)
    }

    /// Run one completion against `backend` under the deadline.
    async fn call(
        &self,
        backend: &dyn LlmBackend,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AdvisorError> {
        let timeout_ms = self.config.request_timeout_ms;

        let completion =
            match tokio::time::timeout(Duration::from_millis(timeout_ms), backend.complete(request)).await {
                Ok(result) => result?,
                Err(_) => return Err(LlmError::Timeout(timeout_ms).into()),
            };

        debug!(
            backend = backend.id(),
            total_tokens = completion.usage.total(),
            "Completion finished"
        );
        Ok(completion)
    }
}

/// JSON schema the auditor must answer with.
fn analysis_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "riskScore": { "type": "number" },
            "summary": { "type": "string" },
            "equityEstimated": { "type": "string" },
            "flags": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "severity": { "type": "string", "enum": ["low", "medium", "high"] },
                        "clause": { "type": "string" },
                        "description": { "type": "string" },
                        "suggestion": { "type": "string" }
                    },
                    "required": ["severity", "clause", "description", "suggestion"]
                }
            }
        },
        "required": ["riskScore", "summary", "equityEstimated", "flags"]
    })
}

/// Parse an audit reply. An empty reply is read as `{}`; a fenced code
/// block is unwrapped.
fn parse_analysis(content: &str) -> Result<ContractAnalysis, AdvisorError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let body = if body.is_empty() { "{}" } else { body };

    serde_json::from_str(body).map_err(|e| AdvisorError::MalformedAnalysis(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::traits::ModelCapabilities;
    use crate::backend::MockBackend;
    use rap_model::Severity;

    fn json_capable() -> ModelCapabilities {
        ModelCapabilities {
            context_window: 1_000_000,
            max_output_tokens: 8192,
            supports_json_mode: true,
        }
    }

    const AUDIT_REPLY: &str = r#"{
        "riskScore": 7.5,
        "summary": "Perpetual likeness grant",
        "equityEstimated": "35%",
        "flags": [{
            "severity": "high",
            "clause": "perpetual, worldwide, irrevocable rights to Artist's biometric likeness",
            "description": "Grants AI voice cloning rights forever",
            "suggestion": "Limit to 2 years and exclude synthetic voice"
        }]
    }"#;

    #[tokio::test]
    async fn test_analyze_contract() {
        let backend = Arc::new(
            MockBackend::default()
                .with_capabilities(json_capable())
                .with_response(AUDIT_REPLY),
        );
        let service = AdvisorService::new(vec![backend.clone()]);

        let analysis = service.analyze_contract("Clause 7: ...").await.unwrap();

        assert_eq!(analysis.risk_score, 7.5);
        assert_eq!(analysis.flags_at(Severity::High).count(), 1);

        let request = backend.last_request().unwrap();
        assert!(request.messages[0].content.contains("Clause 7"));
        assert!(request.response_format.is_some());
        assert_eq!(request.max_tokens, Some(2048));
    }

    #[test]
    fn test_gemini_runs_configured_model() {
        let config = AdvisorConfig {
            model: "gemini-2.5-pro".to_string(),
            ..Default::default()
        };

        let service = AdvisorService::gemini(config, "key").unwrap();
        assert_eq!(service.backend_ids(), vec!["gemini-2.5-pro"]);
    }

    #[tokio::test]
    async fn test_configured_model_sent_upstream() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 512
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Keep your masters."}, "finish_reason": "stop"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AdvisorConfig {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 512,
            ..Default::default()
        };
        let service = AdvisorService::openai_compatible(config, server.uri(), None).unwrap();

        let reply = service.advise(vec![], "Advice?").await.unwrap();
        assert_eq!(reply, "Keep your masters.");
    }

    #[tokio::test]
    async fn test_schema_only_for_json_mode_backends() {
        let backend = Arc::new(MockBackend::default().with_response(AUDIT_REPLY));
        let service = AdvisorService::new(vec![backend.clone()]);

        let analysis = service.analyze_contract("Clause 7: ...").await.unwrap();
        assert_eq!(analysis.risk_score, 7.5);

        let request = backend.last_request().unwrap();
        assert!(request.response_format.is_none());
        assert_eq!(request.max_tokens, Some(1024));
    }

    #[tokio::test]
    async fn test_truncated_audit_rejected() {
        let backend = Arc::new(
            MockBackend::default()
                .with_response(r#"{"riskScore": 8, "summary": "Perpetual"#)
                .with_finish_reason(FinishReason::Length),
        );
        let service = AdvisorService::new(vec![backend]);

        let result = service.analyze_contract("terms").await;
        assert!(matches!(result, Err(AdvisorError::Truncated(1024))));
    }

    #[tokio::test]
    async fn test_truncated_advice_kept() {
        let backend = Arc::new(
            MockBackend::default()
                .with_response("Register the split before")
                .with_finish_reason(FinishReason::Length),
        );
        let service = AdvisorService::new(vec![backend]);

        let reply = service.advise(vec![], "What now?").await.unwrap();
        assert_eq!(reply, "Register the split before");
    }

    #[tokio::test]
    async fn test_empty_reply_reads_as_empty_analysis() {
        let backend = Arc::new(MockBackend::default().with_response(""));
        let service = AdvisorService::new(vec![backend]);

        let analysis = service.analyze_contract("terms").await.unwrap();
        assert_eq!(analysis, ContractAnalysis::default());
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let backend = Arc::new(MockBackend::default().with_response("I cannot do that"));
        let service = AdvisorService::new(vec![backend]);

        let result = service.analyze_contract("terms").await;
        assert!(matches!(result, Err(AdvisorError::MalformedAnalysis(_))));
    }

    #[test]
    fn test_parse_fenced_reply() {
        let analysis = parse_analysis("```json\n{\"riskScore\": 2}\n```").unwrap();
        assert_eq!(analysis.risk_score, 2.0);
    }

    #[tokio::test]
    async fn test_falls_through_to_available_backend() {
        let down = Arc::new(MockBackend::new("down").with_available(false));
        let up = Arc::new(MockBackend::new("up").with_response("Register the split first."));
        let service = AdvisorService::new(vec![down.clone(), up.clone()]);

        let reply = service.advise(vec![], "What now?").await.unwrap();

        assert_eq!(reply, "Register the split first.");
        assert_eq!(down.call_count(), 0);
        assert_eq!(up.call_count(), 1);
        assert_eq!(
            up.last_request().unwrap().system_prompt.as_deref(),
            Some(service.config().system_instruction.as_str())
        );
    }

    #[tokio::test]
    async fn test_no_backend_available() {
        let service = AdvisorService::new(vec![Arc::new(MockBackend::default().with_available(false))]);

        let result = service.advise(vec![], "Hello").await;
        assert!(matches!(result, Err(AdvisorError::NoBackendAvailable)));
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected() {
        let backend = Arc::new(MockBackend::default());
        let service = AdvisorService::new(vec![backend.clone()]);

        assert!(matches!(service.advise(vec![], "   ").await, Err(AdvisorError::EmptyMessage)));
        assert!(matches!(service.analyze_contract("").await, Err(AdvisorError::EmptyContract)));
        assert_eq!(backend.call_count(), 0);
    }
}

//! Routes advisory requests to the external generator or the local
//! fallback templates.

use std::sync::Arc;
use std::time::Instant;

use crate::dtos::{HealthAnalysisRequest, ReportRequest, ReportedCase, TreatmentRequest};
use crate::services::metrics::{record_generation, record_provider_latency, record_tokens};
use crate::services::prompts;
use crate::services::providers::{ProviderError, TextProvider};

/// Where a piece of advisory text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    External,
    Fallback,
}

impl GenerationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationSource::External => "external",
            GenerationSource::Fallback => "fallback",
        }
    }
}

/// Stateless request dispatcher.
///
/// The provider is fixed at construction: `Some` exactly when an API
/// credential was supplied at startup, `None` for fallback mode.
#[derive(Clone)]
pub struct AdvisoryDispatcher {
    provider: Option<Arc<dyn TextProvider>>,
}

impl AdvisoryDispatcher {
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self { provider }
    }

    /// A dispatcher that never leaves the process.
    pub fn fallback_only() -> Self {
        Self { provider: None }
    }

    pub fn source(&self) -> GenerationSource {
        if self.provider.is_some() {
            GenerationSource::External
        } else {
            GenerationSource::Fallback
        }
    }

    pub fn is_external(&self) -> bool {
        self.source() == GenerationSource::External
    }

    pub async fn analyze_health(
        &self,
        request: &HealthAnalysisRequest,
    ) -> Result<String, ProviderError> {
        let prompt = prompts::health_analysis_prompt(&request.species, &request.symptoms);
        let fallback = || prompts::health_analysis_fallback(&request.species, &request.symptoms);

        self.dispatch("analyze_health", &prompt, fallback).await
    }

    pub async fn generate_treatment(
        &self,
        request: &TreatmentRequest,
    ) -> Result<String, ProviderError> {
        let prompt =
            prompts::treatment_prompt(&request.species, &request.diseases, &request.location);
        let fallback = || prompts::treatment_fallback(&request.diseases, &request.location);

        self.dispatch("generate_treatment", &prompt, fallback).await
    }

    /// Acknowledge a case report. Nothing is stored; the input is echoed.
    pub fn report_case(&self, request: ReportRequest) -> ReportedCase {
        record_generation("report_case", "echo", "success");
        ReportedCase::from(request)
    }

    async fn dispatch<F>(
        &self,
        operation: &'static str,
        prompt: &str,
        fallback: F,
    ) -> Result<String, ProviderError>
    where
        F: FnOnce() -> String,
    {
        let Some(provider) = &self.provider else {
            record_generation(operation, GenerationSource::Fallback.as_str(), "success");
            tracing::info!(operation, source = "fallback", "Served fallback template");
            return Ok(fallback());
        };

        let start = Instant::now();
        let result = provider.generate(prompt).await;
        record_provider_latency(provider.name(), start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                record_generation(operation, GenerationSource::External.as_str(), "success");
                record_tokens(provider.name(), response.input_tokens, response.output_tokens);
                tracing::info!(
                    operation,
                    source = "external",
                    provider = provider.name(),
                    finish_reason = response.finish_reason.as_str(),
                    output_tokens = response.output_tokens,
                    "Generated advisory text"
                );
                Ok(response.text)
            }
            Err(e) => {
                record_generation(operation, GenerationSource::External.as_str(), e.kind());
                tracing::warn!(
                    operation,
                    source = "external",
                    provider = provider.name(),
                    error = %e,
                    "Advisory generation failed"
                );
                Err(e)
            }
        }
    }
}

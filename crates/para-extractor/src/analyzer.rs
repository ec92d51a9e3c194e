//! LLM-backed analysis service
//!
//! Runs prompt → model → parser for the three analysis flows. The `try_*`
//! methods surface collaborator failures; the plain methods log them and
//! substitute the fixed fallback record instead.
//!
//! Author: hephaex@gmail.com

use crate::analysis::{parse_sighting_analysis, unavailable_analysis};
use crate::prompts::{
    report_prompt, severity_prompt, sighting_prompt, ANALYSIS_OPTIONS, REPORT_OPTIONS,
    SEVERITY_OPTIONS,
};
use crate::report::parse_extraction;
use crate::severity::{parse_severity, unavailable_assessment};
use para_core::models::{HauntingReport, SeverityAssessment, Sighting, SightingAnalysis};
use para_core::{ExtractionResult, GenerationOptions, LlmClient, ParaError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Analysis service over an optional text-generation client
#[derive(Clone, Default)]
pub struct Analyzer {
    llm: Option<Arc<dyn LlmClient>>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm: Some(llm) }
    }

    /// An analyzer with no model; every flow returns its fallback
    pub fn disabled() -> Self {
        Self { llm: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    pub fn model(&self) -> Option<&str> {
        self.llm.as_deref().map(|llm| llm.model())
    }

    async fn complete(&self, prompt: &str, options: GenerationOptions) -> Result<String> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| ParaError::LlmError("No LLM client configured".to_string()))?;

        debug!(model = llm.model(), max_tokens = options.max_tokens, "Requesting completion");
        let output = llm.generate(prompt, options).await?;

        if output.trim().is_empty() {
            return Err(ParaError::LlmError("Empty response".to_string()));
        }
        Ok(output)
    }

    /// Structured report from raw text; the raw text stands in for a
    /// missing narrative.
    pub async fn try_generate_report(&self, raw_text: &str) -> Result<ExtractionResult> {
        let output = self.complete(&report_prompt(raw_text), REPORT_OPTIONS).await?;
        Ok(parse_extraction(&output).with_fallback_description(raw_text))
    }

    pub async fn generate_report(&self, raw_text: &str) -> ExtractionResult {
        match self.try_generate_report(raw_text).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Report generation failed, using fallback: {}", e);
                ExtractionResult::unavailable(raw_text)
            }
        }
    }

    pub async fn try_analyze_sighting(&self, sighting: &Sighting) -> Result<SightingAnalysis> {
        let output = self
            .complete(&sighting_prompt(sighting), ANALYSIS_OPTIONS)
            .await?;
        Ok(parse_sighting_analysis(&output))
    }

    pub async fn analyze_sighting(&self, sighting: &Sighting) -> SightingAnalysis {
        match self.try_analyze_sighting(sighting).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(sighting_id = %sighting.id, "Sighting analysis failed, using fallback: {}", e);
                unavailable_analysis()
            }
        }
    }

    pub async fn try_assess_severity(&self, report: &HauntingReport) -> Result<SeverityAssessment> {
        let output = self
            .complete(&severity_prompt(report), SEVERITY_OPTIONS)
            .await?;
        Ok(parse_severity(&output))
    }

    pub async fn assess_severity(&self, report: &HauntingReport) -> SeverityAssessment {
        match self.try_assess_severity(report).await {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!(report_id = %report.id, "Severity assessment failed, using fallback: {}", e);
                unavailable_assessment()
            }
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("model", &self.model())
            .finish()
    }
}

//! The four-stage drafting protocol.
//!
//! Stages run in a fixed order with no backward transitions:
//! brief collected, outline ready, sources summarized, draft ready.
//! Grounding rules are a prompt-level contract with the generation backend;
//! the only deterministic gate is the citation-marking pass over the final
//! draft.

use std::sync::Arc;

use quill_common::{truncate_chars, QuillError, Result};
use quill_llm::{ChatMessage, TextGenerator};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::marks::enforce_marks;
use crate::policy::Policy;

/// Hard cap on the serialized research records handed to the summarize
/// stage, in characters. Records beyond the cap are truncated, not
/// re-selected by relevance.
pub const SUMMARIZE_INPUT_CAP: usize = 120_000;

/// Default sampling temperature for all stages.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Printed before brief collection.
pub const INTAKE_PROMPT: &str = "To begin, please provide:
1) Topic & research question
2) Course/venue and audience
3) Target length and deadline
4) Citation style (APA/MLA/Chicago/IEEE/etc.)
5) Constraints (regions/years/methods)
6) Stance or hypotheses
7) Any required sources or datasets
";

/// Linear progress marker for a drafting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    BriefCollected,
    OutlineReady,
    SourcesSummarized,
    DraftReady,
}

/// The stage prompts over a generation backend. Stateless; ordering is
/// enforced by [`DraftingSession`].
pub struct DraftingPipeline {
    generator: Arc<dyn TextGenerator>,
    policy: Policy,
    temperature: f32,
}

impl DraftingPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: Policy) -> Self {
        Self {
            generator,
            policy,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Every stage is the same two-message exchange: the immutable policy
    /// text as the system message, the stage request as the user message.
    fn exchange(&self, user_prompt: String) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.policy.as_str()),
            ChatMessage::user(user_prompt),
        ]
    }

    /// Stage 1: refined question & scope, outline, and targeted search
    /// queries. The output is free text, mined downstream by the query
    /// extraction heuristic.
    pub async fn propose_outline(&self, brief: &str) -> Result<String> {
        info!(stage = "outline", "Running drafting stage");
        let prompt = format!(
            "User brief:\n{brief}\n\nProduce sections (1)-(2)-(3) only: refined question & scope, outline, and targeted search queries & databases."
        );
        self.generator
            .generate(&self.exchange(prompt), self.temperature)
            .await
    }

    /// Stage 2: source summaries grounded in the supplied records only.
    /// Enforcement is advisory; the serialized records are truncated at
    /// [`SUMMARIZE_INPUT_CAP`] characters.
    pub async fn summarize_sources(&self, brief: &str, compact_json: &str) -> Result<String> {
        info!(
            stage = "summarize",
            input_chars = compact_json.len(),
            "Running drafting stage"
        );
        let results = truncate_chars(compact_json, SUMMARIZE_INPUT_CAP);
        let prompt = format!(
            "User brief:\n{brief}\n\nSummarize credible sources with links/DOIs (Section 4).\nUse only what appears in the provided results - no fabrication.\nIf unsure, mark [VERIFY].\n\nResults:\n{results}\n"
        );
        self.generator
            .generate(&self.exchange(prompt), self.temperature)
            .await
    }

    /// Stage 3: cited draft sections, provisional bibliography and
    /// limitations. The output passes through the citation-marking gate
    /// before being returned.
    pub async fn draft_sections(
        &self,
        brief: &str,
        outline: &str,
        summaries: &str,
    ) -> Result<String> {
        info!(stage = "draft", "Running drafting stage");
        let prompt = format!(
            "User brief:\n{brief}\n\nDraft Sections (5) Draft sections with in-text citations, (6) Provisional bibliography, and (7) Limitations & Next Checks.\nRules:\n- Insert in-text citations only if a URL/DOI is present in the summaries.\n- Quote at most 40 words with quotation marks and page numbers if available; otherwise paraphrase with attribution.\n- Mark uncertain claims [VERIFY] and missing references [CITE].\n\nOutline:\n{outline}\n\nSource summaries:\n{summaries}\n"
        );
        let draft = self
            .generator
            .generate(&self.exchange(prompt), self.temperature)
            .await?;
        Ok(enforce_marks(&draft))
    }
}

/// Stateful wrapper over [`DraftingPipeline`] enforcing the linear stage
/// order. Each stage can run once, in sequence.
pub struct DraftingSession {
    pipeline: DraftingPipeline,
    stage: Stage,
}

impl DraftingSession {
    pub fn new(pipeline: DraftingPipeline) -> Self {
        Self {
            pipeline,
            stage: Stage::BriefCollected,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub async fn outline(&mut self, brief: &str) -> Result<String> {
        self.expect(Stage::BriefCollected)?;
        let outline = self.pipeline.propose_outline(brief).await?;
        self.stage = Stage::OutlineReady;
        Ok(outline)
    }

    pub async fn summarize(&mut self, brief: &str, compact_json: &str) -> Result<String> {
        self.expect(Stage::OutlineReady)?;
        let summaries = self.pipeline.summarize_sources(brief, compact_json).await?;
        self.stage = Stage::SourcesSummarized;
        Ok(summaries)
    }

    pub async fn draft(&mut self, brief: &str, outline: &str, summaries: &str) -> Result<String> {
        self.expect(Stage::SourcesSummarized)?;
        let draft = self
            .pipeline
            .draft_sections(brief, outline, summaries)
            .await?;
        self.stage = Stage::DraftReady;
        Ok(draft)
    }

    fn expect(&self, wanted: Stage) -> Result<()> {
        if self.stage == wanted {
            Ok(())
        } else {
            Err(QuillError::Workflow(format!(
                "Stage out of order: expected {:?}, session is at {:?}",
                wanted, self.stage
            )))
        }
    }
}

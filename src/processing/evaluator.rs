//! Single-resume evaluation: retry pipeline plus interpretation

use crate::error::{Result, ResumeCartError};
use crate::input::job_description::JobDescription;
use crate::input::pdf_renderer::DocumentPayload;
use crate::llm::client::{EvaluationRequest, GenerativeModel};
use crate::llm::interpreter::{interpret, InterpretedMatch};
use crate::llm::prompts::{EvaluationKind, PromptTemplates};
use crate::llm::retry::{evaluate, RetryObserver, RetryPolicy};
use log::info;
use std::time::Instant;

/// Outcome of a percentage-match evaluation, raw answer kept alongside the parsed fields.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub raw_text: String,
    pub interpreted: InterpretedMatch,
}

pub struct Evaluator<M> {
    model: M,
    policy: RetryPolicy,
    prompts: PromptTemplates,
}

impl<M: GenerativeModel> Evaluator<M> {
    pub fn new(model: M, policy: RetryPolicy) -> Self {
        Self {
            model,
            policy,
            prompts: PromptTemplates::default(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Runs one evaluation of `kind`; fails with `NoDocumentProvided` when there is no document.
    pub async fn evaluate<O: RetryObserver + ?Sized>(
        &self,
        kind: EvaluationKind,
        document: Option<DocumentPayload>,
        job: &JobDescription,
        observer: &O,
    ) -> Result<String> {
        let document = document.ok_or(ResumeCartError::NoDocumentProvided)?;
        if job.is_blank() {
            return Err(ResumeCartError::InvalidInput(
                "Please enter the job description before proceeding.".to_string(),
            ));
        }

        let request = EvaluationRequest::new(self.prompts.instruction(kind), document, job.clone());
        let start = Instant::now();
        let text = evaluate(&self.model, &request, &self.policy, observer).await?;
        info!(
            "{:?} evaluation finished in {}ms ({} chars)",
            kind,
            start.elapsed().as_millis(),
            text.len()
        );
        Ok(text)
    }

    pub async fn review<O: RetryObserver + ?Sized>(
        &self,
        document: Option<DocumentPayload>,
        job: &JobDescription,
        observer: &O,
    ) -> Result<String> {
        self.evaluate(EvaluationKind::Review, document, job, observer)
            .await
    }

    pub async fn percentage_match<O: RetryObserver + ?Sized>(
        &self,
        document: Option<DocumentPayload>,
        job: &JobDescription,
        observer: &O,
    ) -> Result<MatchOutcome> {
        let raw_text = self
            .evaluate(EvaluationKind::PercentageMatch, document, job, observer)
            .await?;
        let interpreted = interpret(&raw_text);
        Ok(MatchOutcome {
            raw_text,
            interpreted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::retry::LogObserver;
    use std::sync::Mutex;

    struct EchoModel {
        seen_instructions: Mutex<Vec<String>>,
        reply: String,
    }

    impl GenerativeModel for EchoModel {
        async fn generate(&self, request: &EvaluationRequest) -> Result<String> {
            self.seen_instructions
                .lock()
                .unwrap()
                .push(request.instruction().to_string());
            Ok(self.reply.clone())
        }
    }

    fn evaluator(reply: &str) -> Evaluator<EchoModel> {
        Evaluator::new(
            EchoModel {
                seen_instructions: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            },
            RetryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_percentage_match_interprets_answer() {
        let evaluator = evaluator("Match: 82%\nkeywords missing: Python, Docker Final thoughts: Good fit");
        let job = JobDescription::new("Data engineer", 8000);

        let outcome = evaluator
            .percentage_match(Some(DocumentPayload::jpeg(b"page")), &job, &LogObserver)
            .await
            .unwrap();

        assert_eq!(outcome.interpreted.match_percentage, 82);
        assert_eq!(outcome.interpreted.missing_keywords, "Python, Docker");
        assert_eq!(outcome.interpreted.final_thoughts, "Good fit");
        let seen = evaluator.model().seen_instructions.lock().unwrap();
        assert!(seen[0].contains("ATS"));
    }

    #[tokio::test]
    async fn test_review_returns_raw_text() {
        let evaluator = evaluator("Strong Rust background, light on cloud.");
        let job = JobDescription::new("Platform engineer", 8000);

        let text = evaluator
            .review(Some(DocumentPayload::jpeg(b"page")), &job, &LogObserver)
            .await
            .unwrap();

        assert_eq!(text, "Strong Rust background, light on cloud.");
    }

    #[tokio::test]
    async fn test_missing_document_is_rejected_before_calling_model() {
        let evaluator = evaluator("unused");
        let job = JobDescription::new("Platform engineer", 8000);

        let result = evaluator.review(None, &job, &LogObserver).await;

        assert!(matches!(result, Err(ResumeCartError::NoDocumentProvided)));
        assert!(evaluator.model().seen_instructions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let evaluator = evaluator("unused");
        let job = JobDescription::new("   ", 8000);

        let result = evaluator
            .review(Some(DocumentPayload::jpeg(b"page")), &job, &LogObserver)
            .await;

        assert!(matches!(result, Err(ResumeCartError::InvalidInput(_))));
    }
}

//! Generative model client (Gemini `generateContent` over REST)

use crate::config::ModelConfig;
use crate::error::{Result, ResumeCartError};
use crate::input::job_description::JobDescription;
use crate::input::pdf_renderer::DocumentPayload;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Everything one model call needs: the instruction, the rendered resume page and the job text.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    instruction: String,
    document: DocumentPayload,
    job_description: JobDescription,
}

impl EvaluationRequest {
    pub fn new(
        instruction: impl Into<String>,
        document: DocumentPayload,
        job_description: JobDescription,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            document,
            job_description,
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn document(&self) -> &DocumentPayload {
        &self.document
    }

    pub fn job_description(&self) -> &JobDescription {
        &self.job_description
    }
}

/// Seam between the retry pipeline and whatever answers the prompt.
pub trait GenerativeModel {
    fn generate(
        &self,
        request: &EvaluationRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.name.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_key.trim()
        )
    }
}

impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &EvaluationRequest) -> Result<String> {
        let body = GenerateContentRequest::from_request(request);
        debug!(
            "calling {} (instruction: {} chars, job description: {} chars)",
            self.model,
            request.instruction().len(),
            request.job_description().char_count()
        );

        let response = self.client.post(self.url()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(classify_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.text().ok_or_else(|| {
            ResumeCartError::Upstream("model response contained no text".to_string())
        })
    }
}

/// Map a non-success response onto the error taxonomy; quota errors carry any retry hint.
pub fn classify_error(status: u16, body: &str) -> ResumeCartError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let message = parsed
        .as_ref()
        .map(|envelope| envelope.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let exhausted = status == 429
        || parsed
            .as_ref()
            .and_then(|envelope| envelope.error.status.as_deref())
            .is_some_and(|s| s == "RESOURCE_EXHAUSTED");

    if exhausted {
        let retry_delay = parsed.as_ref().and_then(|envelope| {
            envelope
                .error
                .details
                .iter()
                .filter_map(|detail| detail.retry_delay.as_deref())
                .find_map(parse_duration_seconds)
        });
        ResumeCartError::QuotaExhausted {
            message: format!("{} {}", status, message),
            retry_delay,
        }
    } else {
        ResumeCartError::Upstream(format!("Gemini returned {}: {}", status, message))
    }
}

/// Parses protobuf JSON durations such as `"37s"` or `"1.5s"` into whole seconds.
fn parse_duration_seconds(value: &str) -> Option<u64> {
    let seconds = value.trim().strip_suffix('s')?;
    let whole = seconds.split('.').next()?;
    whole.parse().ok()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a EvaluationRequest) -> Self {
        let document = request.document();
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: request.instruction(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &document.mime_type,
                            data: &document.data,
                        },
                    },
                    Part::Text {
                        text: request.job_description().text(),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    retry_delay: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> EvaluationRequest {
        EvaluationRequest::new(
            "Evaluate the resume",
            DocumentPayload::jpeg(b"fake-jpeg"),
            JobDescription::new("Rust engineer", 8000),
        )
    }

    #[test]
    fn test_request_body_shape() {
        let request = sample_request();
        let body = serde_json::to_value(GenerateContentRequest::from_request(&request)).unwrap();
        let parts = &body["contents"][0]["parts"];

        assert_eq!(parts[0]["text"], "Evaluate the resume");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], request.document().data.as_str());
        assert_eq!(parts[2]["text"], "Rust engineer");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Match: 82%"},{"text":" done"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Match: 82% done"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.text().is_none());
    }

    #[test]
    fn test_classify_quota_error_with_retry_info() {
        let body = r#"{
            "error": {
                "code": 429,
                "message": "Resource has been exhausted (e.g. check quota).",
                "status": "RESOURCE_EXHAUSTED",
                "details": [
                    {"@type": "type.googleapis.com/google.rpc.QuotaFailure"},
                    {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "37s"}
                ]
            }
        }"#;

        match classify_error(429, body) {
            ResumeCartError::QuotaExhausted { message, retry_delay } => {
                assert!(message.contains("Resource has been exhausted"));
                assert_eq!(retry_delay, Some(37));
            }
            other => panic!("expected quota error, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_plain_429_without_json() {
        let err = classify_error(429, "Too Many Requests");
        assert!(matches!(
            err,
            ResumeCartError::QuotaExhausted { retry_delay: None, .. }
        ));
    }

    #[test]
    fn test_classify_other_status_is_upstream() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        match classify_error(400, body) {
            ResumeCartError::Upstream(message) => assert!(message.contains("API key not valid")),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_seconds("60s"), Some(60));
        assert_eq!(parse_duration_seconds("1.5s"), Some(1));
        assert_eq!(parse_duration_seconds("soon"), None);
    }
}

//! Fixed instructions sent alongside the resume image and job description

use serde::{Deserialize, Serialize};

/// Which question is put to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationKind {
    /// Free-form strengths and weaknesses, shown verbatim.
    Review,
    /// Percentage, missing keywords and final thoughts, interpreted afterwards.
    PercentageMatch,
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub review: String,
    pub percentage_match: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            review: REVIEW_TEMPLATE.to_string(),
            percentage_match: PERCENTAGE_MATCH_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn instruction(&self, kind: EvaluationKind) -> &str {
        match kind {
            EvaluationKind::Review => &self.review,
            EvaluationKind::PercentageMatch => &self.percentage_match,
        }
    }
}

const REVIEW_TEMPLATE: &str = r#"
You are an experienced Technical Human Resource Manager. Your task is to review the provided resume against the job description.
Please share your professional evaluation on whether the candidate's profile aligns with the role.
Highlight the strengths and weaknesses of the applicant in relation to the specified job requirements.
"#;

const PERCENTAGE_MATCH_TEMPLATE: &str = r#"
You are a skilled ATS (Applicant Tracking System) scanner with a deep understanding of data science and ATS functionality.
Your task is to evaluate the resume against the provided job description. Give me the percentage of match if the resume matches
the job description. First the output should come as percentage and then keywords missing and last final thoughts.
"#;

//! Best-effort interpretation of the model's free-text answer
//!
//! The model is asked for a percentage, then the missing keywords, then final
//! thoughts, but nothing enforces that layout. Each field is pulled out with a
//! heuristic pattern and falls back to a sentinel when the pattern misses, so
//! interpretation never fails; it only degrades. If the model's phrasing
//! changes, these patterns are what needs updating.
//!
//! Known limitation: the missing-keywords capture stops at the first "final
//! thoughts" (any case) after its marker, so prose that mentions final
//! thoughts early cuts the keyword list short.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const NOT_AVAILABLE: &str = "N/A";
pub const FINAL_THOUGHTS_MARKER: &str = "Final thoughts";

fn percentage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([0-9]{1,3})\s*%").expect("percentage pattern is valid"))
}

fn missing_keywords_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)keywords missing[:\-]?\s*(.*?)(?:Final thoughts|$)")
            .expect("missing keywords pattern is valid")
    })
}

/// Structured view of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedMatch {
    pub match_percentage: u8,
    pub missing_keywords: String,
    pub final_thoughts: String,
}

impl Default for InterpretedMatch {
    fn default() -> Self {
        Self {
            match_percentage: 0,
            missing_keywords: NOT_AVAILABLE.to_string(),
            final_thoughts: NOT_AVAILABLE.to_string(),
        }
    }
}

pub fn interpret(text: &str) -> InterpretedMatch {
    InterpretedMatch {
        match_percentage: extract_percentage(text),
        missing_keywords: extract_missing_keywords(text),
        final_thoughts: extract_final_thoughts(text),
    }
}

/// First group of 1-3 ASCII digits followed by `%`; 0 when there is none. Clamped to 100.
pub fn extract_percentage(text: &str) -> u8 {
    percentage_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .map(|value| value.min(100) as u8)
        .unwrap_or(0)
}

pub fn extract_missing_keywords(text: &str) -> String {
    missing_keywords_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Everything after the last "Final thoughts" marker, minus one `:`/`-` separator.
pub fn extract_final_thoughts(text: &str) -> String {
    match text.rfind(FINAL_THOUGHTS_MARKER) {
        Some(index) => {
            let rest = &text[index + FINAL_THOUGHTS_MARKER.len()..];
            let rest = rest.trim_start();
            let rest = rest
                .strip_prefix(':')
                .or_else(|| rest.strip_prefix('-'))
                .unwrap_or(rest);
            rest.trim().to_string()
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_percentage() {
        assert_eq!(extract_percentage("Match: 82%"), 82);
        assert_eq!(extract_percentage("Percentage match: 7 % overall"), 7);
        assert_eq!(extract_percentage("no percentage here"), 0);
        assert_eq!(extract_percentage("score 100%"), 100);
    }

    #[test]
    fn test_extract_percentage_takes_first_match() {
        assert_eq!(extract_percentage("JD match 65% (previous run 40%)"), 65);
    }

    #[test]
    fn test_extract_percentage_skips_non_ascii_digits() {
        assert_eq!(extract_percentage("Match: ٨٢%"), 0);
        assert_eq!(extract_percentage("Match: ٨٢% (82%)"), 82);
    }

    #[test]
    fn test_extract_percentage_clamps_out_of_range() {
        assert_eq!(extract_percentage("a 250% improvement"), 100);
    }

    #[test]
    fn test_keywords_and_thoughts_from_inline_text() {
        let text = "keywords missing: Python, Docker Final thoughts: Good fit";
        assert_eq!(extract_missing_keywords(text), "Python, Docker");
        assert_eq!(extract_final_thoughts(text), "Good fit");
    }

    #[test]
    fn test_multiline_response() {
        let text = "**Percentage Match:** 74%\n\n**Keywords Missing:**\n- Kubernetes\n- Terraform\n\n**Final Thoughts:** Solid backend profile.";
        // "Final Thoughts" bounds the keywords but is not the exact final-thoughts marker.
        let result = interpret(text);
        assert_eq!(result.match_percentage, 74);
        assert!(result.missing_keywords.contains("Kubernetes"));
        assert!(result.missing_keywords.contains("Terraform"));
        assert!(!result.missing_keywords.contains("Solid backend"));
        assert_eq!(result.final_thoughts, NOT_AVAILABLE);
    }

    #[test]
    fn test_keywords_run_to_end_without_final_thoughts() {
        let text = "Keywords Missing- GraphQL, gRPC\n";
        assert_eq!(extract_missing_keywords(text), "GraphQL, gRPC");
    }

    #[test]
    fn test_missing_marker_yields_sentinel() {
        assert_eq!(extract_missing_keywords("Match 90%. Final thoughts: great"), NOT_AVAILABLE);
        assert_eq!(extract_missing_keywords(""), NOT_AVAILABLE);
    }

    #[test]
    fn test_final_thoughts_uses_last_marker() {
        let text = "Final thoughts first draft. Final thoughts - hire them";
        assert_eq!(extract_final_thoughts(text), "hire them");
    }

    #[test]
    fn test_malformed_output_degrades_to_defaults() {
        assert_eq!(interpret("The model had nothing useful to say."), InterpretedMatch::default());
    }
}

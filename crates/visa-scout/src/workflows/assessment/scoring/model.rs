use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::prompt::build_prompt;
use super::rule_based::RuleBasedScorer;
use super::{EvidenceThreshold, ScoringBackend, ScoringInput, ScoringStrategy, Verdict};
use crate::workflows::assessment::domain::VisaCategory;
use crate::workflows::assessment::provider::TextGenerator;

/// Reasons a provider reply could not be turned into a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    #[error("no JSON object found in provider response")]
    NoJsonObject,
    #[error("provider JSON is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("provider JSON is not an object")]
    NotAnObject,
    #[error("provider JSON is missing or has an invalid `{0}` field")]
    InvalidField(&'static str),
    #[error("unrecognized category label `{0}`")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedResponse {
    pub(crate) category: VisaCategory,
    pub(crate) confidence: u8,
    pub(crate) reasons_short: String,
    pub(crate) reasons_long: String,
}

/// Scores through an external text-generation provider, falling back to the
/// deterministic table on transport or parse failure.
pub struct ModelScorer {
    generator: Arc<dyn TextGenerator>,
    fallback: RuleBasedScorer,
    threshold: EvidenceThreshold,
}

impl ModelScorer {
    pub fn new(generator: Arc<dyn TextGenerator>, threshold: EvidenceThreshold) -> Self {
        Self {
            generator,
            fallback: RuleBasedScorer::new(),
            threshold,
        }
    }

    async fn try_score(&self, input: &ScoringInput<'_>) -> Result<Verdict, String> {
        let prompt = build_prompt(input, self.threshold);
        let reply = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|err| format!("provider call failed: {err}"))?;
        let parsed = parse_response(&reply).map_err(|err| err.to_string())?;

        Ok(Verdict {
            category: parsed.category,
            confidence: parsed.confidence,
            reasons_short: parsed.reasons_short,
            reasons_long: parsed.reasons_long,
            model_version: self.generator.model().to_string(),
            strategy: ScoringStrategy::ExternalModel,
        })
    }
}

#[async_trait]
impl ScoringBackend for ModelScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::ExternalModel
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Verdict {
        match self.try_score(input).await {
            Ok(verdict) => {
                info!(
                    provider = self.generator.provider(),
                    category = %verdict.category,
                    "external model produced verdict"
                );
                verdict
            }
            Err(reason) => {
                warn!(
                    provider = self.generator.provider(),
                    %reason,
                    "falling back to rule-based scoring"
                );
                self.fallback.evaluate(input)
            }
        }
    }
}

/// Parse the first balanced JSON object in a free-text reply.
pub(crate) fn parse_response(reply: &str) -> Result<ParsedResponse, ResponseParseError> {
    let raw = extract_json_object(reply).ok_or(ResponseParseError::NoJsonObject)?;
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(ResponseParseError::NotAnObject)?;

    let label = string_field(object, "category")?;
    let category = VisaCategory::from_label(label.trim())
        .ok_or_else(|| ResponseParseError::UnknownCategory(label.to_string()))?;
    let confidence = confidence_field(object)?;

    Ok(ParsedResponse {
        category,
        confidence,
        reasons_short: string_field(object, "reasons_short")?.to_string(),
        reasons_long: string_field(object, "reasons_long")?.to_string(),
    })
}

fn string_field<'a>(
    object: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ResponseParseError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or(ResponseParseError::InvalidField(key))
}

fn confidence_field(object: &Map<String, Value>) -> Result<u8, ResponseParseError> {
    const KEY: &str = "confidence_score";
    let raw = match object.get(KEY) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
    .ok_or(ResponseParseError::InvalidField(KEY))?;

    Ok(raw.clamp(0.0, 100.0).round() as u8)
}

/// Locate the first brace-delimited object, honoring string literals.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let reply = "Sure! Here is my assessment:\n{\"a\": {\"b\": \"}\"}}\nHope that helps.";
        assert_eq!(extract_json_object(reply), Some("{\"a\": {\"b\": \"}\"}}"));
    }

    #[test]
    fn unbalanced_object_is_not_extracted() {
        assert_eq!(extract_json_object("{\"category\": \"High\""), None);
        assert_eq!(extract_json_object("no braces here"), None);
    }

    #[test]
    fn parses_complete_reply() {
        let reply = r#"```json
{"category": "No history so far", "confidence_score": 120.4, "reasons_short": "s", "reasons_long": "l"}
```"#;
        let parsed = parse_response(reply).expect("parses");

        assert_eq!(parsed.category, VisaCategory::NoHistory);
        assert_eq!(parsed.confidence, 100);
        assert_eq!(parsed.reasons_short, "s");
    }

    #[test]
    fn negative_confidence_clamps_to_zero() {
        let reply = r#"{"category": "Low", "confidence_score": -5, "reasons_short": "s", "reasons_long": "l"}"#;
        assert_eq!(parse_response(reply).expect("parses").confidence, 0);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let reply = r#"{"category": "Very High", "confidence_score": 80, "reasons_short": "s", "reasons_long": "l"}"#;
        assert!(matches!(
            parse_response(reply),
            Err(ResponseParseError::UnknownCategory(label)) if label == "Very High"
        ));
    }

    #[test]
    fn missing_reasons_are_rejected() {
        let reply = r#"{"category": "Mid", "confidence_score": 80}"#;
        assert!(matches!(
            parse_response(reply),
            Err(ResponseParseError::InvalidField("reasons_short"))
        ));
    }
}

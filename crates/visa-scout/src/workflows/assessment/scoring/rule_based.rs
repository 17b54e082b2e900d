use async_trait::async_trait;

use super::{ScoringBackend, ScoringInput, ScoringStrategy, Verdict};
use crate::workflows::assessment::domain::VisaCategory;

pub const RULE_BASED_MODEL_VERSION: &str = "rule-based-v1";

/// Deterministic scoring table, evaluated top to bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, input: &ScoringInput<'_>) -> Verdict {
        let positive = input.signals.positive.len();
        let negative = input.signals.negative.len();

        let (category, confidence, reasons_short, reasons_long) = if negative > 0 {
            let (kind, excerpt) = input
                .restriction
                .map(|found| (found.kind.label(), found.excerpt.as_str()))
                .unwrap_or(("unknown", ""));
            (
                VisaCategory::Low,
                70,
                "Explicit restrictions found in job posting".to_string(),
                format!("This position has explicit visa restrictions: {kind}. {excerpt}")
                    .trim_end()
                    .to_string(),
            )
        } else if positive >= 2 {
            // 85 lands in the Mid band; category and band are reported separately.
            (
                VisaCategory::High,
                85,
                "Strong evidence of OPT/CPT acceptance".to_string(),
                "Job posting explicitly mentions OPT/CPT or international students. \
                 Multiple positive signals found."
                    .to_string(),
            )
        } else if positive == 1 {
            (
                VisaCategory::Mid,
                65,
                "Some evidence of visa friendliness".to_string(),
                "Some positive signals found, but not explicit confirmation of OPT/CPT \
                 acceptance."
                    .to_string(),
            )
        } else {
            (
                VisaCategory::NoHistory,
                30,
                "No clear evidence found".to_string(),
                "No explicit information about visa sponsorship or OPT/CPT acceptance \
                 found in job posting or company website."
                    .to_string(),
            )
        };

        Verdict {
            category,
            confidence,
            reasons_short,
            reasons_long,
            model_version: RULE_BASED_MODEL_VERSION.to_string(),
            strategy: ScoringStrategy::RuleBased,
        }
    }
}

#[async_trait]
impl ScoringBackend for RuleBasedScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::RuleBased
    }

    async fn score(&self, input: &ScoringInput<'_>) -> Verdict {
        self.evaluate(input)
    }
}

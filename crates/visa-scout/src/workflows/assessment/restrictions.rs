use std::sync::LazyLock;

use regex::Regex;

use super::domain::{Polarity, Restriction, RestrictionKind};

/// Row of the precedence table: earlier rows win.
struct RestrictionRule {
    pattern: &'static str,
    kind: RestrictionKind,
    polarity: Polarity,
}

// Negative rows sit above every positive row. A posting that both welcomes OPT
// and refuses sponsorship must resolve to the refusal, so keep this order.
const RULES: [RestrictionRule; 9] = [
    RestrictionRule {
        pattern: r"(?i)us\s+citizens?\s+only",
        kind: RestrictionKind::CitizenshipRequired,
        polarity: Polarity::Negative,
    },
    RestrictionRule {
        pattern: r"(?i)no\s+(?:visa\s+)?sponsorship",
        kind: RestrictionKind::NoSponsorship,
        polarity: Polarity::Negative,
    },
    RestrictionRule {
        pattern: r"(?i)security\s+clearance\s+required",
        kind: RestrictionKind::SecurityClearance,
        polarity: Polarity::Negative,
    },
    RestrictionRule {
        pattern: r"(?i)must\s+be\s+(?:legally\s+)?authorized\s+to\s+work",
        kind: RestrictionKind::WorkAuthRequired,
        polarity: Polarity::Negative,
    },
    RestrictionRule {
        pattern: r"(?i)permanent\s+resident",
        kind: RestrictionKind::PermanentResident,
        polarity: Polarity::Negative,
    },
    RestrictionRule {
        pattern: r"(?i)opt\s+(?:and\s+)?cpt\s+(?:welcome|accepted|eligible)",
        kind: RestrictionKind::OptCptAccepted,
        polarity: Polarity::Positive,
    },
    RestrictionRule {
        pattern: r"(?i)international\s+students?\s+welcome",
        kind: RestrictionKind::InternationalWelcome,
        polarity: Polarity::Positive,
    },
    RestrictionRule {
        pattern: r"(?i)visa\s+sponsorship\s+available",
        kind: RestrictionKind::SponsorshipAvailable,
        polarity: Polarity::Positive,
    },
    RestrictionRule {
        pattern: r"(?i)we\s+sponsor\s+(?:h-1b|visas?)",
        kind: RestrictionKind::SponsorshipAvailable,
        polarity: Polarity::Positive,
    },
];

struct CompiledRule {
    regex: Regex,
    kind: RestrictionKind,
    polarity: Polarity,
}

static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|rule| {
            Regex::new(rule.pattern).ok().map(|regex| CompiledRule {
                regex,
                kind: rule.kind,
                polarity: rule.polarity,
            })
        })
        .collect()
});

/// Scans free text for explicit visa restrictions or allowances.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestrictionDetector;

impl RestrictionDetector {
    pub fn new() -> Self {
        Self
    }

    /// Returns the first matching row of the precedence table, if any.
    pub fn detect(&self, text: &str) -> Option<Restriction> {
        COMPILED_RULES.iter().find_map(|rule| {
            rule.regex.find(text).map(|found| Restriction {
                kind: rule.kind,
                excerpt: found.as_str().to_string(),
                polarity: rule.polarity,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_compiles() {
        assert_eq!(COMPILED_RULES.len(), RULES.len());
    }

    #[test]
    fn negative_rows_precede_positive_rows() {
        let first_positive = RULES
            .iter()
            .position(|rule| rule.polarity == Polarity::Positive)
            .expect("positive rows present");
        assert!(RULES[first_positive..]
            .iter()
            .all(|rule| rule.polarity == Polarity::Positive));
    }
}

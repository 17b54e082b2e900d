use super::domain::{Evidence, Polarity, Relevance, Restriction, Signal, SignalBuckets};

const JOB_DESCRIPTION_SOURCE: &str = "job_description";

/// Convert posting text, the detected restriction, and evidence into signals.
///
/// Every rule applies independently and nothing is deduplicated. Keyword tests
/// are plain case-insensitive substring checks, so "adoption" counts as "opt".
pub fn extract_signals(
    job_description: &str,
    requirements: &str,
    evidence: &[Evidence],
    restriction: Option<&Restriction>,
) -> SignalBuckets {
    let mut signals = SignalBuckets::default();
    let combined = format!("{job_description} {requirements}").to_lowercase();

    if combined.contains("opt") || combined.contains("cpt") {
        signals.push(posting_signal(
            Polarity::Positive,
            "Job posting mentions OPT or CPT".to_string(),
            90,
        ));
    }

    if combined.contains("international student") {
        signals.push(posting_signal(
            Polarity::Positive,
            "Job posting mentions international students".to_string(),
            85,
        ));
    }

    if combined.contains("e-verify") {
        signals.push(posting_signal(
            Polarity::Positive,
            "Company participates in E-Verify".to_string(),
            70,
        ));
    }

    match restriction {
        Some(found) if found.polarity == Polarity::Negative => {
            signals.push(posting_signal(
                Polarity::Negative,
                format!("Restriction found: {}", found.kind),
                95,
            ));
        }
        Some(found) if found.polarity == Polarity::Positive => {
            signals.push(posting_signal(
                Polarity::Positive,
                format!("Positive signal: {}", found.kind),
                90,
            ));
        }
        _ => {}
    }

    for item in evidence
        .iter()
        .filter(|item| item.relevance == Relevance::High)
    {
        signals.push(Signal {
            polarity: Polarity::Positive,
            description: "Company website mentions visa-related information".to_string(),
            source: item.url.clone(),
            confidence: 75,
        });
    }

    signals
}

fn posting_signal(polarity: Polarity, description: String, confidence: u8) -> Signal {
    Signal {
        polarity,
        description,
        source: JOB_DESCRIPTION_SOURCE.to_string(),
        confidence,
    }
}

use super::{EvidenceThreshold, ScoringInput};

pub(crate) const DESCRIPTION_BUDGET: usize = 2000;

/// Single rubric-embedded prompt sent to the text-generation provider.
pub(crate) fn build_prompt(input: &ScoringInput<'_>, threshold: EvidenceThreshold) -> String {
    let evidence = if input.evidence.is_empty() {
        "No external evidence found.".to_string()
    } else {
        input
            .evidence
            .iter()
            .map(|item| format!("- {}: {}", item.url, item.excerpt))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let positive = bullet_list(input.signals.positive.iter().map(|s| s.description.as_str()));
    let negative = bullet_list(input.signals.negative.iter().map(|s| s.description.as_str()));
    let description: String = input.job_description.chars().take(DESCRIPTION_BUDGET).collect();
    let ceiling = threshold.value();

    format!(
        r#"You are an expert at assessing whether job/volunteer positions are friendly to international students on OPT or CPT visas.

Analyze the following position and provide a structured assessment.

POSITION DETAILS:
Company: {company}
Title: {title}
Location: {location}

JOB DESCRIPTION:
{description}

EVIDENCE COLLECTED:
{evidence}

POSITIVE SIGNALS:
{positive}

NEGATIVE SIGNALS:
{negative}

ASSESSMENT CRITERIA:
- High (90-100): Explicit OPT/CPT acceptance stated in posting or company policy
- Mid (70-89): Evidence of visa sponsorship or international hiring, but not explicit for OPT/CPT
- Low (40-69): Restrictions found or conflicting signals
- No history so far (0-39): No clear evidence either way

IMPORTANT RULES:
1. Confidence cannot exceed {ceiling} without at least one strong evidence source
2. Explicit restrictions (citizenship required, no sponsorship) = Low category
3. Separate facts from inference in reasoning
4. Cite specific evidence in reasoning

Respond in this exact JSON format:
{{
  "category": "High|Mid|Low|No history so far",
  "confidence_score": <0-100>,
  "reasons_short": "<one sentence summary>",
  "reasons_long": "<detailed reasoning with evidence citations>"
}}"#,
        company = input.company_name,
        title = input.job_title,
        location = input.location,
    )
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let lines: Vec<String> = items.map(|item| format!("- {item}")).collect();
    if lines.is_empty() {
        "None".to_string()
    } else {
        lines.join("\n")
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for ingested listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub i64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized listing fields supplied by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub company_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub apply_url: String,
    #[serde(default)]
    pub requirements: Option<String>,
}

/// Assessed friendliness of a position towards OPT/CPT students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisaCategory {
    High,
    Mid,
    Low,
    #[serde(rename = "No history so far")]
    NoHistory,
}

impl VisaCategory {
    pub const fn label(self) -> &'static str {
        match self {
            VisaCategory::High => "High",
            VisaCategory::Mid => "Mid",
            VisaCategory::Low => "Low",
            VisaCategory::NoHistory => "No history so far",
        }
    }

    /// Exact-match lookup against the provider vocabulary.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "High" => Some(VisaCategory::High),
            "Mid" => Some(VisaCategory::Mid),
            "Low" => Some(VisaCategory::Low),
            "No history so far" => Some(VisaCategory::NoHistory),
            _ => None,
        }
    }
}

impl fmt::Display for VisaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse bucketing of a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceBand {
    #[serde(rename = "No history so far")]
    NoHistory,
    Low,
    Mid,
    High,
}

impl ConfidenceBand {
    pub const fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ConfidenceBand::High,
            70..=89 => ConfidenceBand::Mid,
            40..=69 => ConfidenceBand::Low,
            _ => ConfidenceBand::NoHistory,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceBand::High => "High",
            ConfidenceBand::Mid => "Mid",
            ConfidenceBand::Low => "Low",
            ConfidenceBand::NoHistory => "No history so far",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
}

/// Externally sourced excerpt gathered while probing a company's own pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub captured_at: DateTime<Utc>,
    pub relevance: Relevance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// Polarity-tagged observation contributing to scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub polarity: Polarity,
    pub description: String,
    pub source: String,
    pub confidence: u8,
}

/// Signals grouped by polarity. Repeated matches are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBuckets {
    pub positive: Vec<Signal>,
    pub negative: Vec<Signal>,
    pub neutral: Vec<Signal>,
}

impl SignalBuckets {
    pub fn push(&mut self, signal: Signal) {
        match signal.polarity {
            Polarity::Positive => self.positive.push(signal),
            Polarity::Negative => self.negative.push(signal),
            Polarity::Neutral => self.neutral.push(signal),
        }
    }

    pub fn total(&self) -> usize {
        self.positive.len() + self.negative.len() + self.neutral.len()
    }
}

/// Labels for the explicit eligibility statements the detector recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    CitizenshipRequired,
    NoSponsorship,
    SecurityClearance,
    WorkAuthRequired,
    PermanentResident,
    OptCptAccepted,
    InternationalWelcome,
    SponsorshipAvailable,
}

impl RestrictionKind {
    pub const fn label(self) -> &'static str {
        match self {
            RestrictionKind::CitizenshipRequired => "citizenship_required",
            RestrictionKind::NoSponsorship => "no_sponsorship",
            RestrictionKind::SecurityClearance => "security_clearance",
            RestrictionKind::WorkAuthRequired => "work_auth_required",
            RestrictionKind::PermanentResident => "permanent_resident",
            RestrictionKind::OptCptAccepted => "opt_cpt_accepted",
            RestrictionKind::InternationalWelcome => "international_welcome",
            RestrictionKind::SponsorshipAvailable => "sponsorship_available",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explicit restriction or allowance found in a job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub kind: RestrictionKind,
    pub excerpt: String,
    pub polarity: Polarity,
}

/// Immutable outcome of one assessment run.
///
/// The band is derived from the post-clamp confidence at construction time and
/// no setters exist, so the pair can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentResult {
    category: VisaCategory,
    confidence: u8,
    band: ConfidenceBand,
    reasons_short: String,
    reasons_long: String,
    evidence: Vec<Evidence>,
    signals: SignalBuckets,
    model_version: String,
    assessed_at: DateTime<Utc>,
}

impl AssessmentResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        category: VisaCategory,
        confidence: u8,
        reasons_short: String,
        reasons_long: String,
        evidence: Vec<Evidence>,
        signals: SignalBuckets,
        model_version: String,
        assessed_at: DateTime<Utc>,
    ) -> Self {
        let confidence = confidence.min(100);
        Self {
            category,
            confidence,
            band: ConfidenceBand::from_score(confidence),
            reasons_short,
            reasons_long,
            evidence,
            signals,
            model_version,
            assessed_at,
        }
    }

    pub fn category(&self) -> VisaCategory {
        self.category
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn band(&self) -> ConfidenceBand {
        self.band
    }

    pub fn reasons_short(&self) -> &str {
        &self.reasons_short
    }

    pub fn reasons_long(&self) -> &str {
        &self.reasons_long
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    pub fn signals(&self) -> &SignalBuckets {
        &self.signals
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn assessed_at(&self) -> DateTime<Utc> {
        self.assessed_at
    }
}

/// Engine output handed to the storage collaborator as a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAssessment {
    pub listing_id: ListingId,
    pub result: AssessmentResult,
}

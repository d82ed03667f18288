use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::liability::NsaCalculationResult;
use crate::profiles::{NetworkStatus, ServiceType};

/// Identifier wrapper for submitted claims, unique within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub String);

/// One episode-of-care record. Immutable once submitted to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub patient_id: String,
    pub service_date: NaiveDate,
    /// Ordered procedure codes; the first entry is the primary procedure.
    pub cpt_codes: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub charged_amount: f64,
    pub network_status: NetworkStatus,
    pub provider_npi: String,
    pub facility_npi: String,
    /// Optional category used by prior-auth matching (e.g. "surgery").
    #[serde(default)]
    pub service_category: Option<String>,
    /// Authorization number on file, when the service was pre-approved.
    #[serde(default)]
    pub prior_authorization: Option<String>,
    /// Age of the cached eligibility verification; absent means just checked.
    #[serde(default)]
    pub eligibility_checked_hours_ago: Option<u32>,
    /// Whether the patient signed a notice-and-consent waiver.
    #[serde(default)]
    pub patient_consent: bool,
    /// In-network contracted rate for the primary procedure, if known.
    #[serde(default)]
    pub contracted_rate: Option<f64>,
}

impl Claim {
    /// Reject malformed input before it reaches the rule engine.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cpt_codes.is_empty() {
            return Err(ValidationError::MissingCptCodes {
                claim_id: self.claim_id.0.clone(),
            });
        }

        if !self.charged_amount.is_finite() || self.charged_amount < 0.0 {
            return Err(ValidationError::InvalidAmount {
                field: "charged_amount",
                value: self.charged_amount,
            });
        }

        if let Some(rate) = self.contracted_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ValidationError::InvalidAmount {
                    field: "contracted_rate",
                    value: rate,
                });
            }
        }

        Ok(())
    }

    pub fn primary_cpt(&self) -> &str {
        self.cpt_codes
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Service category for NSA evaluation. An explicit `service_category`
    /// wins; otherwise the category is inferred from the primary procedure
    /// code (emergency E/M codes, a short list of major surgeries, anesthesia
    /// and pathology as ancillary, radiology as imaging, everything else
    /// outpatient).
    pub fn service_type(&self) -> ServiceType {
        const EMERGENCY: [&str; 5] = ["99281", "99282", "99283", "99284", "99285"];
        const SURGERY: [&str; 3] = ["27447", "27130", "66984"];

        if let Some(category) = self.service_category.as_deref() {
            match category {
                "emergency_care" => return ServiceType::EmergencyCare,
                "ancillary" => return ServiceType::Ancillary,
                "surgery" => return ServiceType::Surgery,
                "imaging" => return ServiceType::Imaging,
                "outpatient" => return ServiceType::Outpatient,
                _ => {}
            }
        }

        let primary = self.primary_cpt();
        if EMERGENCY.contains(&primary) {
            ServiceType::EmergencyCare
        } else if SURGERY.contains(&primary) {
            ServiceType::Surgery
        } else if primary.starts_with("00") || primary.starts_with("88") {
            ServiceType::Ancillary
        } else if primary.starts_with('7') {
            ServiceType::Imaging
        } else {
            ServiceType::Outpatient
        }
    }
}

/// Malformed-input errors surfaced to the caller before evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("claim `{claim_id}` has no CPT codes")]
    MissingCptCodes { claim_id: String },
    #[error("{field} must be a non-negative finite amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Aggregate claim status; escalations are one-directional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Passed,
    Warning,
    Failed,
}

impl ClaimStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClaimStatus::Passed => "passed",
            ClaimStatus::Warning => "warning",
            ClaimStatus::Failed => "failed",
        }
    }

    /// Raise the status for an issue of the given severity. `Failed` is
    /// never downgraded.
    pub fn escalate(&mut self, severity: IssueSeverity) {
        let candidate = match severity {
            IssueSeverity::Info => ClaimStatus::Passed,
            IssueSeverity::Warning => ClaimStatus::Warning,
            IssueSeverity::Error => ClaimStatus::Failed,
        };
        if candidate > *self {
            *self = candidate;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// Machine-readable issue codes carried on every scrub finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    EligibilityStale,
    PriorAuthRequired,
    InvalidModifier,
    ServicesBundled,
    ProcessingError,
}

impl IssueCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            IssueCode::EligibilityStale => "ELIGIBILITY_STALE",
            IssueCode::PriorAuthRequired => "PRIOR_AUTH_REQUIRED",
            IssueCode::InvalidModifier => "INVALID_MODIFIER",
            IssueCode::ServicesBundled => "SERVICES_BUNDLED",
            IssueCode::ProcessingError => "PROCESSING_ERROR",
        }
    }
}

/// One finding produced while scrubbing a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(severity: IssueSeverity, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
        }
    }
}

/// Pipeline output for one claim. Created per claim, never mutated after
/// return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubResult {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    /// Names of the rules that actually triggered.
    pub applied_rules: BTreeSet<String>,
    pub issues: Vec<Issue>,
    /// The claim with bundling/modifier transforms applied.
    pub processed_claim: Claim,
    /// Liability calculation, present when the claim was out-of-network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsa_result: Option<NsaCalculationResult>,
}

impl ScrubResult {
    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::liability::{LiabilityRequest, NsaCalculator, PatientPlanProgress};
use crate::profiles::PayerProfile;
use crate::scrub::domain::{
    Claim, ClaimStatus, Issue, IssueCode, IssueSeverity, ScrubResult, ValidationError,
};
use crate::scrub::engine::RuleEngine;

/// Fixed-order scrub pipeline bound to one profile: eligibility, prior
/// authorization, bundling, modifiers, then the liability calculation for
/// out-of-network claims.
#[derive(Debug, Clone)]
pub struct ScrubPipeline {
    engine: RuleEngine,
    calculator: NsaCalculator,
}

impl ScrubPipeline {
    pub fn new(profile: Arc<PayerProfile>) -> Self {
        Self {
            engine: RuleEngine::new(profile.clone()),
            calculator: NsaCalculator::new(profile),
        }
    }

    /// Scrub one claim. Malformed input is rejected up front; a panic inside
    /// any evaluation step is folded into a failed result instead of
    /// propagating.
    pub fn scrub(&self, claim: &Claim) -> Result<ScrubResult, ValidationError> {
        claim.validate()?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(claim)));
        Ok(outcome.unwrap_or_else(|_| {
            tracing::warn!(claim_id = %claim.claim_id.0, "claim evaluation panicked");
            let mut result = ScrubResult {
                claim_id: claim.claim_id.clone(),
                status: ClaimStatus::Failed,
                applied_rules: Default::default(),
                issues: Vec::new(),
                processed_claim: claim.clone(),
                nsa_result: None,
            };
            result.issues.push(Issue::new(
                IssueSeverity::Error,
                IssueCode::ProcessingError,
                "internal error while evaluating the claim",
            ));
            result
        }))
    }

    /// Scrub a batch; one bad claim never stops the rest.
    pub fn scrub_batch(&self, claims: &[Claim]) -> Vec<Result<ScrubResult, ValidationError>> {
        claims.iter().map(|claim| self.scrub(claim)).collect()
    }

    fn evaluate(&self, claim: &Claim) -> ScrubResult {
        let mut result = ScrubResult {
            claim_id: claim.claim_id.clone(),
            status: ClaimStatus::Passed,
            applied_rules: Default::default(),
            issues: Vec::new(),
            processed_claim: claim.clone(),
            nsa_result: None,
        };

        let eligibility = self.engine.check_eligibility(
            &claim.patient_id,
            claim.service_date,
            claim.eligibility_checked_hours_ago.unwrap_or(0),
        );
        if eligibility.stale {
            result.applied_rules.insert("eligibility".to_string());
            self.raise(
                &mut result,
                IssueSeverity::Warning,
                IssueCode::EligibilityStale,
                eligibility.reasoning,
            );
        }

        let prior_auth = self
            .engine
            .check_prior_auth(&claim.cpt_codes, claim.service_category.as_deref());
        if prior_auth.required {
            result.applied_rules.insert("prior_auth".to_string());
            if claim.prior_authorization.is_none() {
                self.raise(
                    &mut result,
                    IssueSeverity::Error,
                    IssueCode::PriorAuthRequired,
                    prior_auth.reasoning,
                );
            }
        }

        let bundling = self.engine.apply_bundling(&claim.cpt_codes, &claim.modifiers);
        if bundling.bundled {
            result.applied_rules.insert("bundling".to_string());
            result.processed_claim.cpt_codes = bundling.cpt_codes;
            self.raise(
                &mut result,
                IssueSeverity::Info,
                IssueCode::ServicesBundled,
                bundling.reasoning,
            );
        }

        if !claim.modifiers.is_empty() {
            result.applied_rules.insert("modifiers".to_string());
            let primary = result.processed_claim.primary_cpt().to_string();
            for check in self.engine.check_modifiers(&primary, &claim.modifiers) {
                if !check.valid {
                    self.raise(
                        &mut result,
                        IssueSeverity::Error,
                        IssueCode::InvalidModifier,
                        check.reasoning,
                    );
                }
            }
        }

        if claim.network_status.is_out_of_network() {
            result.applied_rules.insert("nsa_calculation".to_string());
            let request = LiabilityRequest {
                service_type: result.processed_claim.service_type(),
                facility_network_status: claim.network_status,
                provider_network_status: claim.network_status,
                charged_amount: claim.charged_amount,
                contracted_rate: claim.contracted_rate,
                patient_consent: claim.patient_consent,
                patient_plan: PatientPlanProgress::default(),
            };
            match self.calculator.calculate(&request) {
                Ok(calculation) => result.nsa_result = Some(calculation),
                // Unreachable after claim validation, but never panic for it.
                Err(error) => self.raise(
                    &mut result,
                    IssueSeverity::Error,
                    IssueCode::ProcessingError,
                    error.to_string(),
                ),
            }
        }

        result
    }

    fn raise(
        &self,
        result: &mut ScrubResult,
        severity: IssueSeverity,
        code: IssueCode,
        message: impl Into<String>,
    ) {
        result.status.escalate(severity);
        result.issues.push(Issue::new(severity, code, message));
    }
}

//! Stateless rule evaluation. Every operation takes a read-only profile
//! reference plus claim-derived parameters and returns a typed decision with
//! a human-readable reasoning string, so concurrent calls on the same profile
//! need no locking.

mod bundling;
mod eligibility;
mod modifiers;
mod nsa;
mod prior_auth;

pub use bundling::BundlingOutcome;
pub use eligibility::EligibilityDecision;
pub use modifiers::ModifierCheck;
pub use nsa::NsaDecision;
pub use prior_auth::PriorAuthDecision;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::profiles::{CoverageTier, NetworkStatus, PayerProfile, ServiceType};

/// Evaluator bound to one immutable profile.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    profile: Arc<PayerProfile>,
}

impl RuleEngine {
    pub fn new(profile: Arc<PayerProfile>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &PayerProfile {
        &self.profile
    }

    pub fn check_eligibility(
        &self,
        patient_id: &str,
        service_date: NaiveDate,
        data_age_hours: u32,
    ) -> EligibilityDecision {
        eligibility::check_eligibility(&self.profile, patient_id, service_date, data_age_hours)
    }

    pub fn check_prior_auth(
        &self,
        cpt_codes: &[String],
        service_category: Option<&str>,
    ) -> PriorAuthDecision {
        prior_auth::check_prior_auth(&self.profile, cpt_codes, service_category)
    }

    pub fn apply_bundling(&self, cpt_codes: &[String], modifiers: &[String]) -> BundlingOutcome {
        bundling::apply_bundling(&self.profile, cpt_codes, modifiers)
    }

    pub fn check_modifiers(&self, primary_cpt: &str, modifiers: &[String]) -> Vec<ModifierCheck> {
        modifiers::check_modifiers(&self.profile, primary_cpt, modifiers)
    }

    pub fn check_nsa_protection(
        &self,
        service_type: ServiceType,
        facility_status: NetworkStatus,
        provider_status: NetworkStatus,
        patient_consent: bool,
    ) -> NsaDecision {
        nsa::check_nsa_protection(
            &self.profile,
            service_type,
            facility_status,
            provider_status,
            patient_consent,
        )
    }

    /// Coverage percentage and out-of-pocket cap for a network tier.
    pub fn determine_coverage(&self, network_status: NetworkStatus) -> CoverageTerms {
        let tier = match network_status {
            NetworkStatus::InNetwork => &self.profile.coverage_rules.in_network_coverage,
            NetworkStatus::OutOfNetwork => &self.profile.coverage_rules.out_of_network_coverage,
        };
        CoverageTerms::from_tier(network_status, tier)
    }
}

/// Resolved coverage terms for one network tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageTerms {
    pub network_status: NetworkStatus,
    pub percentage: f64,
    pub max_out_of_pocket: f64,
}

impl CoverageTerms {
    pub fn from_tier(network_status: NetworkStatus, tier: &CoverageTier) -> Self {
        Self {
            network_status,
            percentage: tier.percentage,
            max_out_of_pocket: tier.max_out_of_pocket,
        }
    }
}

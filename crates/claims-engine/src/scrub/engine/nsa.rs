use serde::Serialize;

use crate::profiles::{NetworkStatus, PayerProfile, ServiceType};

/// No Surprises Act verdict for one encounter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NsaDecision {
    /// Patient liability is capped at in-network cost sharing.
    pub protected: bool,
    /// Provider may not bill the patient for the charged/QPA gap.
    pub balance_billing_blocked: bool,
    /// A qualifying payment amount must be computed for this claim.
    pub qpa_required: bool,
    pub reasoning: String,
}

impl NsaDecision {
    fn unprotected(reasoning: String) -> Self {
        Self {
            protected: false,
            balance_billing_blocked: false,
            qpa_required: false,
            reasoning,
        }
    }
}

/// Protection precedence: emergency care first (unconditional: no network
/// status, profile section, or consent can waive it), then ancillary
/// providers at in-network facilities, then the profile's protected-service
/// list where a valid notice-and-consent waives protection entirely.
pub(super) fn check_nsa_protection(
    profile: &PayerProfile,
    service_type: ServiceType,
    facility_status: NetworkStatus,
    provider_status: NetworkStatus,
    patient_consent: bool,
) -> NsaDecision {
    if service_type.is_emergency() {
        return NsaDecision {
            protected: true,
            balance_billing_blocked: true,
            qpa_required: true,
            reasoning: "emergency services are always protected and balance billing is \
                        always prohibited, regardless of network status or consent"
                .to_string(),
        };
    }

    if !facility_status.is_out_of_network() && !provider_status.is_out_of_network() {
        return NsaDecision::unprotected(
            "facility and provider are both in network; no surprise-billing exposure".to_string(),
        );
    }

    let rules = &profile.nsa_rules;

    let consent_waives = rules.balance_billing_protection.consent_eligible(service_type)
        && patient_consent;

    if service_type == ServiceType::Ancillary
        && !facility_status.is_out_of_network()
        && provider_status.is_out_of_network()
        && rules.out_of_network_facility.ancillary_services_protected
    {
        return NsaDecision {
            protected: true,
            balance_billing_blocked: !consent_waives,
            qpa_required: true,
            reasoning: if consent_waives {
                "out-of-network ancillary provider at an in-network facility: liability stays \
                 capped at in-network terms, but signed consent permits balance billing"
                    .to_string()
            } else {
                "out-of-network ancillary provider at an in-network facility is protected"
                    .to_string()
            },
        };
    }

    if rules.balance_billing_protection.protects(service_type) {
        if consent_waives {
            return NsaDecision::unprotected(format!(
                "{} is on the protected list but the patient signed a notice-and-consent \
                 waiver; standard out-of-network terms apply",
                service_type.as_str()
            ));
        }
        return NsaDecision {
            protected: true,
            balance_billing_blocked: true,
            qpa_required: true,
            reasoning: format!(
                "{} is on the payer's protected-service list and no consent waiver applies",
                service_type.as_str()
            ),
        };
    }

    NsaDecision::unprotected(format!(
        "{} is not a protected service for this payer",
        service_type.as_str()
    ))
}

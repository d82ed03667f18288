//! Fixtures shared by the rule-engine and pipeline tests.

use chrono::NaiveDate;

use crate::profiles::{
    AllowedModifier, BalanceBillingProtection, BundlingRule, CoverageRules, CoverageTier,
    DeductibleRules, EligibilityRules, EmergencyServicesPolicy, ModifierConditions, ModifierRules,
    NetworkStatus, NsaRules, OutOfNetworkFacilityRules, PayerInfo, PayerProfile, PriorAuthRules,
    QpaMethod, RequiredService,
};
use crate::scrub::domain::{Claim, ClaimId};

/// A PPO profile exercising every rule family: a prior-auth rule keyed on
/// knee/hip replacement CPTs, one bundling pair with a 59 exception, two
/// allowed modifiers, and NSA rules with ancillary protection.
pub(crate) fn sample_profile() -> PayerProfile {
    PayerProfile {
        payer_info: PayerInfo {
            id: "acme-ppo".to_string(),
            name: "Acme Health PPO".to_string(),
            plan_type: "PPO".to_string(),
            region: "US-West".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
            expiration_date: None,
        },
        coverage_rules: CoverageRules {
            in_network_coverage: CoverageTier {
                percentage: 80.0,
                max_out_of_pocket: 3_000.0,
            },
            out_of_network_coverage: CoverageTier {
                percentage: 50.0,
                max_out_of_pocket: 9_000.0,
            },
            deductible_rules: DeductibleRules {
                individual: 1_500.0,
                family: 3_000.0,
            },
        },
        prior_auth_rules: PriorAuthRules {
            required_services: vec![RequiredService {
                cpt_codes: vec!["27447".to_string(), "27130".to_string()],
                service_category: "surgery".to_string(),
                authorization_window_days: 14,
            }],
        },
        bundling_rules: vec![BundlingRule {
            primary_cpt: "45380".to_string(),
            bundled_cpts: vec!["88305".to_string()],
            modifier_exceptions: vec!["59".to_string()],
        }],
        modifiers: ModifierRules {
            allowed_modifiers: vec![
                AllowedModifier {
                    code: "26".to_string(),
                    multiplier: 0.26,
                    conditions: ModifierConditions {
                        cpt_prefixes: vec!["7".to_string()],
                        cpt_codes: Vec::new(),
                    },
                },
                AllowedModifier {
                    code: "59".to_string(),
                    multiplier: 1.0,
                    conditions: ModifierConditions::default(),
                },
            ],
        },
        nsa_rules: NsaRules {
            emergency_services: Some(EmergencyServicesPolicy {
                balance_billing_prohibited: true,
            }),
            out_of_network_facility: OutOfNetworkFacilityRules {
                qpa_calculation_method: QpaMethod::MedianContractedRate,
                ancillary_services_protected: true,
            },
            balance_billing_protection: BalanceBillingProtection {
                protected_services: vec!["emergency_care".to_string(), "ancillary".to_string()],
                notice_and_consent_eligible: vec!["ancillary".to_string()],
            },
        },
        eligibility_rules: EligibilityRules {
            staleness_threshold_hours: 72,
        },
    }
}

/// An uncontroversial in-network office visit; tests mutate what they need.
pub(crate) fn sample_claim() -> Claim {
    Claim {
        claim_id: ClaimId("CLM-0001".to_string()),
        patient_id: "PAT-0001".to_string(),
        service_date: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        cpt_codes: vec!["99213".to_string()],
        modifiers: Vec::new(),
        charged_amount: 450.0,
        network_status: NetworkStatus::InNetwork,
        provider_npi: "1234567890".to_string(),
        facility_npi: "0987654321".to_string(),
        service_category: None,
        prior_authorization: None,
        eligibility_checked_hours_ago: None,
        patient_consent: false,
        contracted_rate: None,
    }
}

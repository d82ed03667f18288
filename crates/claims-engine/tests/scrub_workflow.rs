use chrono::NaiveDate;

use claims_engine::profiles::{load_profile_reader, NetworkStatus, ProfileRegistry};
use claims_engine::scrub::{Claim, ClaimId, ClaimStatus, IssueCode, ScrubPipeline};

const PPO_PROFILE: &str = r#"
payer_info:
  id: acme-ppo
  name: Acme Health PPO
  plan_type: PPO
  region: US-West
  effective_date: 2026-01-01
coverage_rules:
  in_network_coverage:
    percentage: 80.0
    max_out_of_pocket: 3000.0
  out_of_network_coverage:
    percentage: 50.0
    max_out_of_pocket: 9000.0
  deductible_rules:
    individual: 1500.0
    family: 3000.0
prior_auth_rules:
  required_services:
    - cpt_codes: ["27447", "27130"]
      service_category: surgery
      authorization_window_days: 14
bundling_rules:
  - primary_cpt: "45380"
    bundled_cpts: ["88305"]
    modifier_exceptions: ["59"]
modifiers:
  allowed_modifiers:
    - code: "26"
      multiplier: 0.26
      conditions:
        cpt_prefixes: ["7"]
    - code: "59"
      multiplier: 1.0
nsa_rules:
  emergency_services:
    balance_billing_prohibited: true
  out_of_network_facility:
    qpa_calculation_method: median_contracted_rate
    ancillary_services_protected: true
  balance_billing_protection:
    protected_services: [emergency_care, ancillary]
    notice_and_consent_eligible: [ancillary]
eligibility_rules:
  staleness_threshold_hours: 72
"#;

fn pipeline() -> ScrubPipeline {
    let registry = ProfileRegistry::new();
    let profile =
        load_profile_reader("acme-ppo", PPO_PROFILE.as_bytes()).expect("profile parses");
    registry.insert(profile).expect("profile registers");
    ScrubPipeline::new(registry.require("acme-ppo").expect("profile registered"))
}

fn base_claim(cpt_codes: &[&str]) -> Claim {
    Claim {
        claim_id: ClaimId("CLM-1001".to_string()),
        patient_id: "PAT-77".to_string(),
        service_date: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        cpt_codes: cpt_codes.iter().map(|code| code.to_string()).collect(),
        modifiers: Vec::new(),
        charged_amount: 1800.0,
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

#[test]
fn bundled_procedures_collapse_to_the_primary() {
    let result = pipeline()
        .scrub(&base_claim(&["45380", "88305"]))
        .expect("claim scrubs");

    assert_eq!(result.processed_claim.cpt_codes, vec!["45380".to_string()]);
    assert!(result.applied_rules.contains("bundling"));
    assert!(result.has_issue(IssueCode::ServicesBundled));
    assert_eq!(result.status, ClaimStatus::Passed);
}

#[test]
fn exception_modifier_keeps_both_procedures() {
    let mut claim = base_claim(&["45380", "88305"]);
    claim.modifiers = vec!["59".to_string()];

    let result = pipeline().scrub(&claim).expect("claim scrubs");
    assert_eq!(
        result.processed_claim.cpt_codes,
        vec!["45380".to_string(), "88305".to_string()]
    );
    assert!(!result.applied_rules.contains("bundling"));
}

#[test]
fn knee_replacement_without_authorization_fails() {
    let result = pipeline()
        .scrub(&base_claim(&["27447"]))
        .expect("claim scrubs");

    assert_eq!(result.status, ClaimStatus::Failed);
    assert!(result.has_issue(IssueCode::PriorAuthRequired));
}

#[test]
fn stale_eligibility_escalates_to_warning_only() {
    let mut claim = base_claim(&["99213"]);
    claim.eligibility_checked_hours_ago = Some(200);

    let result = pipeline().scrub(&claim).expect("claim scrubs");
    assert_eq!(result.status, ClaimStatus::Warning);
    assert!(result.has_issue(IssueCode::EligibilityStale));
}

#[test]
fn issues_only_ever_escalate_the_status() {
    // Stale eligibility (warning) plus missing prior auth (error) on one
    // claim: the error wins and the warning is still reported.
    let mut claim = base_claim(&["27447"]);
    claim.eligibility_checked_hours_ago = Some(200);

    let result = pipeline().scrub(&claim).expect("claim scrubs");
    assert_eq!(result.status, ClaimStatus::Failed);
    assert!(result.has_issue(IssueCode::EligibilityStale));
    assert!(result.has_issue(IssueCode::PriorAuthRequired));
}

#[test]
fn scrubbing_twice_yields_identical_results() {
    let pipeline = pipeline();
    let mut claim = base_claim(&["45380", "88305"]);
    claim.network_status = NetworkStatus::OutOfNetwork;
    claim.eligibility_checked_hours_ago = Some(80);

    let first = pipeline.scrub(&claim).expect("claim scrubs");
    let second = pipeline.scrub(&claim).expect("claim scrubs");
    assert_eq!(first, second);
}

#[test]
fn out_of_network_emergency_gets_a_protected_calculation() {
    let mut claim = base_claim(&["99284"]);
    claim.network_status = NetworkStatus::OutOfNetwork;
    claim.charged_amount = 2500.0;
    claim.contracted_rate = Some(1800.0);

    let result = pipeline().scrub(&claim).expect("claim scrubs");
    let calculation = result.nsa_result.expect("liability attached");
    assert!(calculation.nsa_applicable);
    assert!(!calculation.balance_billing_allowed);
    assert_eq!(
        calculation.final_patient_liability,
        calculation.patient_cost_sharing
    );
}

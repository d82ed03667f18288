use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;

use claims_engine::profiles::{load_profile_reader, PayerProfile};
use claims_engine::simulation::{ClaimSimulator, LoadTestConfig, LoadTester};

const PROFILE: &str = r#"
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
    - code: "25"
      multiplier: 1.0
nsa_rules:
  emergency_services:
    balance_billing_prohibited: true
  out_of_network_facility:
    qpa_calculation_method: ghost_rate
    ancillary_services_protected: true
  balance_billing_protection:
    protected_services: [emergency_care, ancillary]
    notice_and_consent_eligible: [ancillary]
eligibility_rules:
  staleness_threshold_hours: 72
"#;

fn profile() -> Arc<PayerProfile> {
    Arc::new(load_profile_reader("acme-ppo", PROFILE.as_bytes()).expect("profile parses"))
}

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
}

#[test]
fn simulation_tallies_every_requested_claim() {
    let simulator = ClaimSimulator::new(profile());
    let result = simulator.run(300, 42, anchor());

    assert_eq!(result.total_claims, 300);
    assert_eq!(result.processed, 300);
    assert_eq!(result.successful + result.failed, 300);
    assert!(result.total_charged > 0.0);
    assert_eq!(result.processing_times_ms.len(), 300);
}

#[test]
fn simulation_is_reproducible_per_seed() {
    let simulator = ClaimSimulator::new(profile());
    let first = simulator.run(150, 7, anchor());
    let second = simulator.run(150, 7, anchor());

    assert_eq!(first.successful, second.successful);
    assert_eq!(first.failed, second.failed);
    assert_eq!(first.nsa_protected, second.nsa_protected);
    assert_eq!(first.bundled, second.bundled);
    assert_eq!(first.prior_auth_required, second.prior_auth_required);
    assert_eq!(first.total_charged, second.total_charged);
    assert_eq!(first.total_liability, second.total_liability);
}

#[tokio::test(start_paused = true)]
async fn ten_users_fifty_claims_each() {
    let tester = LoadTester::new(profile());
    let report = tester
        .run(&LoadTestConfig {
            concurrent_users: 10,
            claims_per_user: 50,
            ramp_up: Duration::from_secs(5),
            seed: 42,
            today: anchor(),
            deadline: None,
        })
        .await;

    assert_eq!(report.stats.total_claims, 500);
    assert_eq!(report.stats.processed, 500);
    assert!(report.throughput_claims_per_second > 0.0);
    assert!(!report.cancelled);
    for rate in [
        report.stats.success_rate,
        report.stats.nsa_protection_rate,
        report.stats.bundling_rate,
        report.stats.prior_auth_rate,
    ] {
        assert!((0.0..=100.0).contains(&rate), "rate {rate} out of range");
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_run_returns_partial_aggregates() {
    let tester = LoadTester::new(profile());
    let (cancel_tx, cancel_rx) = watch::channel(false);
    cancel_tx.send(true).expect("receiver alive");

    let report = tester
        .run_until(
            &LoadTestConfig {
                concurrent_users: 5,
                claims_per_user: 100,
                ramp_up: Duration::from_secs(10),
                seed: 1,
                today: anchor(),
                deadline: None,
            },
            cancel_rx,
        )
        .await;

    assert!(report.cancelled);
    assert_eq!(report.stats.total_claims, 500);
    assert!(report.stats.processed < 500);
    assert_eq!(
        report.stats.successful + report.stats.failed,
        report.stats.processed
    );
}

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::profiles::PayerProfile;
use crate::scrub::pipeline::ScrubPipeline;
use crate::simulation::generator::ClaimGenerator;
use crate::simulation::simulator::{SimulationAccumulator, SimulationResult};

#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    pub concurrent_users: usize,
    pub claims_per_user: usize,
    /// User streams start staggered across this window.
    pub ramp_up: Duration,
    pub seed: u64,
    /// Anchor date for generated service dates.
    pub today: NaiveDate,
    /// Hard stop; partial aggregates are returned once it elapses.
    pub deadline: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestReport {
    pub concurrent_users: usize,
    pub claims_per_user: usize,
    pub wall_clock_secs: f64,
    pub throughput_claims_per_second: f64,
    pub cancelled: bool,
    pub stats: SimulationResult,
}

/// Concurrent load harness. Each user stream owns its pipeline, generator,
/// and accumulator; the aggregate exists only after every stream has joined.
#[derive(Debug, Clone)]
pub struct LoadTester {
    profile: Arc<PayerProfile>,
}

impl LoadTester {
    pub fn new(profile: Arc<PayerProfile>) -> Self {
        Self { profile }
    }

    /// Run with an internally managed cancellation signal driven by the
    /// configured deadline, if any.
    pub async fn run(&self, config: &LoadTestConfig) -> LoadTestReport {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        if let Some(deadline) = config.deadline {
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                let _ = cancel_tx.send(true);
            });
        } else {
            // Keep the sender alive for the duration of the run.
            tokio::spawn(async move {
                cancel_tx.closed().await;
            });
        }
        self.run_until(config, cancel_rx).await
    }

    /// Run until every stream finishes or `cancel` flips to true. Once
    /// raised, no new user or claim starts; streams drain and their partial
    /// tallies are still merged.
    pub async fn run_until(
        &self,
        config: &LoadTestConfig,
        cancel: watch::Receiver<bool>,
    ) -> LoadTestReport {
        let started = Instant::now();
        let users = config.concurrent_users.max(1);

        let mut handles = Vec::with_capacity(users);
        for user in 0..users {
            let delay = config.ramp_up.mul_f64(user as f64 / users as f64);
            let pipeline = ScrubPipeline::new(self.profile.clone());
            let mut cancel = cancel.clone();
            let seed = config.seed.wrapping_add(user as u64);
            let claims = config.claims_per_user;
            let today = config.today;

            handles.push(tokio::spawn(async move {
                let mut local = SimulationAccumulator::default();

                if !delay.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.changed() => return local,
                    }
                }

                let mut generator = ClaimGenerator::new(seed, today);
                for index in 0..claims {
                    if *cancel.borrow() {
                        break;
                    }
                    let claim = generator.generate(index);
                    let claim_started = Instant::now();
                    let outcome = pipeline.scrub(&claim);
                    local.record(
                        claim.charged_amount,
                        &outcome,
                        claim_started.elapsed().as_secs_f64() * 1_000.0,
                    );
                    tokio::task::yield_now().await;
                }
                local
            }));
        }

        let mut total = SimulationAccumulator::default();
        for handle in handles {
            if let Ok(local) = handle.await {
                total.merge(local);
            }
        }

        let wall_clock_secs = started.elapsed().as_secs_f64();
        let cancelled = *cancel.borrow();
        let successful = total.successful();
        let stats = total.finalize(users * config.claims_per_user);

        LoadTestReport {
            concurrent_users: users,
            claims_per_user: config.claims_per_user,
            wall_clock_secs,
            throughput_claims_per_second: successful as f64
                / wall_clock_secs.max(f64::MIN_POSITIVE),
            cancelled,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::tests::common::sample_profile;

    fn config(users: usize, claims: usize) -> LoadTestConfig {
        LoadTestConfig {
            concurrent_users: users,
            claims_per_user: claims,
            ramp_up: Duration::from_secs(5),
            seed: 42,
            today: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
            deadline: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_processes_every_claim() {
        let tester = LoadTester::new(Arc::new(sample_profile()));
        let report = tester.run(&config(10, 50)).await;

        assert_eq!(report.stats.total_claims, 500);
        assert_eq!(report.stats.processed, 500);
        assert!(!report.cancelled);
        assert!(report.throughput_claims_per_second > 0.0);
        for rate in [
            report.stats.success_rate,
            report.stats.nsa_protection_rate,
            report.stats.bundling_rate,
        ] {
            assert!((0.0..=100.0).contains(&rate));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_returns_partial_aggregates() {
        let tester = LoadTester::new(Arc::new(sample_profile()));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        cancel_tx.send(true).expect("receiver alive");

        let report = tester.run_until(&config(4, 100), cancel_rx).await;

        assert!(report.cancelled);
        assert!(report.stats.processed < report.stats.total_claims);
        assert_eq!(report.stats.total_claims, 400);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_the_run() {
        let tester = LoadTester::new(Arc::new(sample_profile()));
        let mut config = config(4, 200);
        config.ramp_up = Duration::from_secs(60);
        config.deadline = Some(Duration::from_secs(1));

        let report = tester.run(&config).await;
        assert!(report.cancelled);
        assert!(report.stats.processed <= report.stats.total_claims);
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::profiles::PayerProfile;
use crate::scrub::domain::{ClaimStatus, IssueCode, ScrubResult, ValidationError};
use crate::scrub::pipeline::ScrubPipeline;
use crate::simulation::generator::ClaimGenerator;

/// Aggregate outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_claims: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub nsa_protected: usize,
    pub bundled: usize,
    pub prior_auth_required: usize,
    pub total_charged: f64,
    pub total_liability: f64,
    pub processing_times_ms: Vec<f64>,
    /// Error message -> occurrence count.
    pub errors: HashMap<String, usize>,
    pub success_rate: f64,
    pub nsa_protection_rate: f64,
    pub bundling_rate: f64,
    pub prior_auth_rate: f64,
    pub avg_processing_time_ms: f64,
    pub average_liability: f64,
}

/// Stream-local tallies. Each worker keeps its own accumulator and the
/// harness merges them once the stream has joined, so no shared state is
/// touched while claims are in flight.
#[derive(Debug, Clone, Default)]
pub struct SimulationAccumulator {
    processed: usize,
    successful: usize,
    failed: usize,
    nsa_protected: usize,
    bundled: usize,
    prior_auth_required: usize,
    total_charged: f64,
    total_liability: f64,
    processing_times_ms: Vec<f64>,
    errors: HashMap<String, usize>,
}

impl SimulationAccumulator {
    pub fn record(
        &mut self,
        charged_amount: f64,
        outcome: &Result<ScrubResult, ValidationError>,
        elapsed_ms: f64,
    ) {
        self.processed += 1;
        self.total_charged += charged_amount;
        self.processing_times_ms.push(elapsed_ms);

        match outcome {
            Ok(result) => {
                if result.status == ClaimStatus::Failed {
                    self.failed += 1;
                } else {
                    self.successful += 1;
                }
                if result
                    .nsa_result
                    .as_ref()
                    .is_some_and(|calc| calc.nsa_applicable)
                {
                    self.nsa_protected += 1;
                }
                if result.applied_rules.contains("bundling") {
                    self.bundled += 1;
                }
                if result.applied_rules.contains("prior_auth") {
                    self.prior_auth_required += 1;
                }
                if let Some(calc) = &result.nsa_result {
                    self.total_liability += calc.final_patient_liability;
                }
                for issue in &result.issues {
                    if issue.code == IssueCode::ProcessingError {
                        *self.errors.entry(issue.message.clone()).or_default() += 1;
                    }
                }
            }
            Err(error) => {
                self.failed += 1;
                *self.errors.entry(error.to_string()).or_default() += 1;
            }
        }
    }

    pub fn merge(&mut self, other: SimulationAccumulator) {
        self.processed += other.processed;
        self.successful += other.successful;
        self.failed += other.failed;
        self.nsa_protected += other.nsa_protected;
        self.bundled += other.bundled;
        self.prior_auth_required += other.prior_auth_required;
        self.total_charged += other.total_charged;
        self.total_liability += other.total_liability;
        self.processing_times_ms.extend(other.processing_times_ms);
        for (message, count) in other.errors {
            *self.errors.entry(message).or_default() += count;
        }
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    /// Derive rates over the requested claim count, which may exceed
    /// `processed` when a run was cancelled.
    pub fn finalize(self, total_claims: usize) -> SimulationResult {
        let denominator = total_claims.max(1) as f64;
        let avg_processing_time_ms = if self.processing_times_ms.is_empty() {
            0.0
        } else {
            self.processing_times_ms.iter().sum::<f64>() / self.processing_times_ms.len() as f64
        };
        let average_liability = if self.nsa_protected == 0 && self.total_liability == 0.0 {
            0.0
        } else {
            self.total_liability / self.processed.max(1) as f64
        };

        SimulationResult {
            total_claims,
            processed: self.processed,
            successful: self.successful,
            failed: self.failed,
            nsa_protected: self.nsa_protected,
            bundled: self.bundled,
            prior_auth_required: self.prior_auth_required,
            total_charged: self.total_charged,
            total_liability: self.total_liability,
            success_rate: self.successful as f64 / denominator * 100.0,
            nsa_protection_rate: self.nsa_protected as f64 / denominator * 100.0,
            bundling_rate: self.bundled as f64 / denominator * 100.0,
            prior_auth_rate: self.prior_auth_required as f64 / denominator * 100.0,
            avg_processing_time_ms,
            average_liability,
            processing_times_ms: self.processing_times_ms,
            errors: self.errors,
        }
    }
}

/// Sequential simulation driver: generate, scrub, tally.
#[derive(Debug, Clone)]
pub struct ClaimSimulator {
    pipeline: ScrubPipeline,
}

impl ClaimSimulator {
    pub fn new(profile: Arc<PayerProfile>) -> Self {
        Self {
            pipeline: ScrubPipeline::new(profile),
        }
    }

    pub fn run(&self, num_claims: usize, seed: u64, today: NaiveDate) -> SimulationResult {
        let mut generator = ClaimGenerator::new(seed, today);
        let mut accumulator = SimulationAccumulator::default();

        for index in 0..num_claims {
            let claim = generator.generate(index);
            let started = Instant::now();
            let outcome = self.pipeline.scrub(&claim);
            accumulator.record(
                claim.charged_amount,
                &outcome,
                started.elapsed().as_secs_f64() * 1_000.0,
            );
        }

        accumulator.finalize(num_claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::tests::common::sample_profile;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    fn simulator() -> ClaimSimulator {
        ClaimSimulator::new(Arc::new(sample_profile()))
    }

    #[test]
    fn every_generated_claim_is_tallied() {
        let result = simulator().run(250, 42, anchor());
        assert_eq!(result.total_claims, 250);
        assert_eq!(result.processed, 250);
        assert_eq!(result.successful + result.failed, 250);
        assert_eq!(result.processing_times_ms.len(), 250);
    }

    #[test]
    fn rates_are_percentages() {
        let result = simulator().run(100, 7, anchor());
        for rate in [
            result.success_rate,
            result.nsa_protection_rate,
            result.bundling_rate,
            result.prior_auth_rate,
        ] {
            assert!((0.0..=100.0).contains(&rate), "rate {rate} out of range");
        }
    }

    #[test]
    fn same_seed_yields_identical_counts() {
        let first = simulator().run(120, 99, anchor());
        let second = simulator().run(120, 99, anchor());
        assert_eq!(first.successful, second.successful);
        assert_eq!(first.nsa_protected, second.nsa_protected);
        assert_eq!(first.bundled, second.bundled);
        assert_eq!(first.total_charged, second.total_charged);
    }

    #[test]
    fn merge_is_sum_of_parts() {
        let mut left = SimulationAccumulator::default();
        let mut right = SimulationAccumulator::default();
        let simulator = simulator();
        let mut generator = ClaimGenerator::new(3, anchor());

        for index in 0..40 {
            let claim = generator.generate(index);
            let outcome = simulator.pipeline.scrub(&claim);
            let target = if index % 2 == 0 { &mut left } else { &mut right };
            target.record(claim.charged_amount, &outcome, 0.1);
        }

        left.merge(right);
        let result = left.finalize(40);
        assert_eq!(result.processed, 40);
        assert_eq!(result.successful + result.failed, 40);
    }
}

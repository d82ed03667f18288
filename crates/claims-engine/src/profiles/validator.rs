use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

use super::domain::PayerProfile;

/// One validation finding tied to the profile field that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileFinding {
    pub field: String,
    pub message: String,
}

impl ProfileFinding {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validation outcome: hard errors block registration, warnings are logged
/// and surfaced to operators but do not block.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub valid: bool,
    pub errors: Vec<ProfileFinding>,
    pub warnings: Vec<ProfileFinding>,
}

/// Business-rule validator for payer profiles, applied once at load time.
#[derive(Debug, Default)]
pub struct ProfileValidator;

impl ProfileValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, profile: &PayerProfile) -> ProfileReport {
        self.validate_at(profile, Local::now().date_naive())
    }

    /// Validation with an explicit reference date so checks stay deterministic
    /// in tests.
    pub fn validate_at(&self, profile: &PayerProfile, today: NaiveDate) -> ProfileReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if profile.payer_info.id.trim().is_empty() {
            errors.push(ProfileFinding::new(
                "payer_info.id",
                "payer id must be non-empty",
            ));
        }

        let in_network = &profile.coverage_rules.in_network_coverage;
        let out_of_network = &profile.coverage_rules.out_of_network_coverage;

        for (field, tier) in [
            ("coverage_rules.in_network_coverage", in_network),
            ("coverage_rules.out_of_network_coverage", out_of_network),
        ] {
            if !(0.0..=100.0).contains(&tier.percentage) {
                errors.push(ProfileFinding::new(
                    field,
                    format!("coverage percentage {} outside 0-100", tier.percentage),
                ));
            }
            if tier.max_out_of_pocket < 0.0 {
                errors.push(ProfileFinding::new(
                    field,
                    "max out-of-pocket must be non-negative",
                ));
            }
        }

        if profile.eligibility_rules.staleness_threshold_hours == 0 {
            errors.push(ProfileFinding::new(
                "eligibility_rules.staleness_threshold_hours",
                "staleness threshold must be at least one hour",
            ));
        }

        if in_network.percentage < 50.0 {
            warnings.push(ProfileFinding::new(
                "coverage_rules.in_network_coverage.percentage",
                "in-network coverage percentage is unusually low (< 50%)",
            ));
        }

        if out_of_network.percentage > in_network.percentage {
            warnings.push(ProfileFinding::new(
                "coverage_rules.out_of_network_coverage.percentage",
                "out-of-network coverage should typically be lower than in-network coverage",
            ));
        }

        let deductibles = &profile.coverage_rules.deductible_rules;
        if deductibles.family > 0.0 && deductibles.family < deductibles.individual * 2.0 {
            warnings.push(ProfileFinding::new(
                "coverage_rules.deductible_rules.family",
                "family deductible is typically at least 2x individual deductible",
            ));
        }

        if profile.nsa_rules.emergency_services.is_none() {
            warnings.push(ProfileFinding::new(
                "nsa_rules.emergency_services",
                "NSA emergency services rules should be defined for compliance",
            ));
        }

        if profile.payer_info.effective_date > today + Duration::days(365) {
            warnings.push(ProfileFinding::new(
                "payer_info.effective_date",
                "effective date is more than one year in the future",
            ));
        }

        ProfileReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

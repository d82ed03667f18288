use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use super::domain::PayerProfile;
use super::validator::ProfileValidator;

/// Error enumeration for profile configuration failures. These are fatal for
/// the profile being loaded, never for claims already in flight.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile `{0}` is not registered")]
    UnknownProfile(String),
    #[error("profile `{id}` is missing required section `{section}`")]
    MissingSection { id: String, section: String },
    #[error("profile `{id}` failed validation: {detail}")]
    Invalid { id: String, detail: String },
    #[error("failed to read profile `{id}`: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse profile `{id}`: {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Listing entry exposed to API consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub plan_type: String,
    pub qpa_calculation_method: String,
}

/// Process-wide store of payer profiles keyed by id.
///
/// Profiles are held as `Arc<PayerProfile>`; readers clone the `Arc` and the
/// profile they see stays immutable for the lifetime of their evaluation.
/// `insert` swaps the `Arc` whole, so a concurrent reader observes either the
/// old or the new profile in full, never a partial update.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: RwLock<HashMap<String, Arc<PayerProfile>>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a profile, replacing any previous version
    /// atomically. Returns the profile id.
    pub fn insert(&self, profile: PayerProfile) -> Result<String, ProfileError> {
        let id = profile.payer_info.id.clone();
        let report = ProfileValidator::new().validate(&profile);

        if !report.valid {
            let detail = report
                .errors
                .iter()
                .map(|finding| format!("{}: {}", finding.field, finding.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ProfileError::Invalid { id, detail });
        }

        for warning in &report.warnings {
            tracing::warn!(profile = %id, field = %warning.field, "{}", warning.message);
        }

        let mut guard = self.profiles.write().expect("profile registry poisoned");
        guard.insert(id.clone(), Arc::new(profile));
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<PayerProfile>> {
        let guard = self.profiles.read().expect("profile registry poisoned");
        guard.get(id).cloned()
    }

    pub fn require(&self, id: &str) -> Result<Arc<PayerProfile>, ProfileError> {
        self.get(id)
            .ok_or_else(|| ProfileError::UnknownProfile(id.to_string()))
    }

    pub fn summaries(&self) -> Vec<ProfileSummary> {
        let guard = self.profiles.read().expect("profile registry poisoned");
        let mut entries: Vec<ProfileSummary> = guard
            .values()
            .map(|profile| ProfileSummary {
                id: profile.payer_info.id.clone(),
                name: profile.payer_info.name.clone(),
                plan_type: profile.payer_info.plan_type.clone(),
                qpa_calculation_method: profile
                    .nsa_rules
                    .out_of_network_facility
                    .qpa_calculation_method
                    .as_str()
                    .to_string(),
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    pub fn len(&self) -> usize {
        self.profiles
            .read()
            .expect("profile registry poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::domain::*;
    use chrono::NaiveDate;

    fn sample_profile(id: &str, in_network_pct: f64) -> PayerProfile {
        PayerProfile {
            payer_info: PayerInfo {
                id: id.to_string(),
                name: "Sample Health PPO".to_string(),
                plan_type: "PPO".to_string(),
                region: "IA".to_string(),
                effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
                expiration_date: None,
            },
            coverage_rules: CoverageRules {
                in_network_coverage: CoverageTier {
                    percentage: in_network_pct,
                    max_out_of_pocket: 3000.0,
                },
                out_of_network_coverage: CoverageTier {
                    percentage: 50.0,
                    max_out_of_pocket: 9000.0,
                },
                deductible_rules: DeductibleRules {
                    individual: 1500.0,
                    family: 3000.0,
                },
            },
            prior_auth_rules: PriorAuthRules::default(),
            bundling_rules: Vec::new(),
            modifiers: ModifierRules::default(),
            nsa_rules: NsaRules {
                emergency_services: Some(EmergencyServicesPolicy {
                    balance_billing_prohibited: true,
                }),
                out_of_network_facility: OutOfNetworkFacilityRules {
                    qpa_calculation_method: QpaMethod::GhostRate,
                    ancillary_services_protected: true,
                },
                balance_billing_protection: BalanceBillingProtection::default(),
            },
            eligibility_rules: EligibilityRules {
                staleness_threshold_hours: 72,
            },
        }
    }

    #[test]
    fn insert_then_get_returns_the_profile() {
        let registry = ProfileRegistry::new();
        registry
            .insert(sample_profile("acme-ppo", 80.0))
            .expect("profile registers");
        let profile = registry.get("acme-ppo").expect("profile resolves");
        assert_eq!(profile.payer_info.name, "Sample Health PPO");
    }

    #[test]
    fn replace_swaps_the_profile_whole() {
        let registry = ProfileRegistry::new();
        registry
            .insert(sample_profile("acme-ppo", 80.0))
            .expect("initial version registers");
        let before = registry.get("acme-ppo").expect("initial resolves");

        registry
            .insert(sample_profile("acme-ppo", 90.0))
            .expect("replacement registers");
        let after = registry.get("acme-ppo").expect("replacement resolves");

        // The reader holding the old Arc keeps a fully consistent old view.
        assert_eq!(before.coverage_rules.in_network_coverage.percentage, 80.0);
        assert_eq!(after.coverage_rules.in_network_coverage.percentage, 90.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn structurally_invalid_profile_is_rejected() {
        let registry = ProfileRegistry::new();
        let mut profile = sample_profile("acme-ppo", 130.0);
        profile.coverage_rules.out_of_network_coverage.percentage = -10.0;

        let err = registry.insert(profile).expect_err("validation rejects");
        assert!(matches!(err, ProfileError::Invalid { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn require_distinguishes_unknown_profiles() {
        let registry = ProfileRegistry::new();
        let err = registry.require("nope").expect_err("unknown profile");
        assert!(matches!(err, ProfileError::UnknownProfile(id) if id == "nope"));
    }
}

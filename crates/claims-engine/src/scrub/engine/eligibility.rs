use chrono::NaiveDate;
use serde::Serialize;

use crate::profiles::PayerProfile;

/// Staleness check on the cached eligibility verification. Stale data is an
/// advisory, not a denial: the claim keeps processing with a warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub stale: bool,
    pub data_age_hours: u32,
    pub threshold_hours: u32,
    pub reasoning: String,
}

pub(super) fn check_eligibility(
    profile: &PayerProfile,
    patient_id: &str,
    service_date: NaiveDate,
    data_age_hours: u32,
) -> EligibilityDecision {
    let threshold_hours = profile.eligibility_rules.staleness_threshold_hours;
    let stale = data_age_hours > threshold_hours;

    let reasoning = if stale {
        format!(
            "eligibility data for {patient_id} is {data_age_hours}h old, past the {threshold_hours}h staleness threshold; re-verify before {service_date}"
        )
    } else {
        format!(
            "eligibility data for {patient_id} is {data_age_hours}h old, within the {threshold_hours}h staleness threshold"
        )
    };

    EligibilityDecision {
        eligible: !stale,
        stale,
        data_age_hours,
        threshold_hours,
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrub::tests::common::sample_profile;

    fn service_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    #[test]
    fn fresh_data_is_eligible() {
        let profile = sample_profile();
        let decision = check_eligibility(&profile, "PAT-1", service_date(), 12);
        assert!(decision.eligible);
        assert!(!decision.stale);
    }

    #[test]
    fn data_past_threshold_is_stale_not_denied() {
        let profile = sample_profile();
        let decision = check_eligibility(&profile, "PAT-1", service_date(), 96);
        assert!(!decision.eligible);
        assert!(decision.stale);
        assert!(decision.reasoning.contains("re-verify"));
    }

    #[test]
    fn age_equal_to_threshold_is_still_fresh() {
        let profile = sample_profile();
        let threshold = profile.eligibility_rules.staleness_threshold_hours;
        let decision = check_eligibility(&profile, "PAT-1", service_date(), threshold);
        assert!(!decision.stale);
    }
}

use serde::Serialize;

use crate::profiles::{PayerProfile, RequiredService};

/// Prior-authorization requirement for one claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorAuthDecision {
    pub required: bool,
    /// The rule that matched, when one did.
    pub matched_rule: Option<RequiredService>,
    pub reasoning: String,
}

/// A claim matches when any required-service entry shares a CPT code with it
/// or names the same service category.
pub(super) fn check_prior_auth(
    profile: &PayerProfile,
    cpt_codes: &[String],
    service_category: Option<&str>,
) -> PriorAuthDecision {
    for rule in &profile.prior_auth_rules.required_services {
        let cpt_match = rule
            .cpt_codes
            .iter()
            .find(|code| cpt_codes.contains(code));
        let category_match =
            service_category.is_some_and(|category| category == rule.service_category);

        if let Some(code) = cpt_match {
            return PriorAuthDecision {
                required: true,
                reasoning: format!(
                    "CPT {code} requires prior authorization ({} window: {} days)",
                    rule.service_category, rule.authorization_window_days
                ),
                matched_rule: Some(rule.clone()),
            };
        }

        if category_match {
            return PriorAuthDecision {
                required: true,
                reasoning: format!(
                    "service category `{}` requires prior authorization (window: {} days)",
                    rule.service_category, rule.authorization_window_days
                ),
                matched_rule: Some(rule.clone()),
            };
        }
    }

    PriorAuthDecision {
        required: false,
        matched_rule: None,
        reasoning: "no prior-authorization rule matches this claim".to_string(),
    }
}

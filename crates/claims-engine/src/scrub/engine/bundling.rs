use serde::Serialize;

use crate::profiles::PayerProfile;

/// Result of the NCCI bundling pass. When a rule fires the claim's codes
/// collapse to the primary procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundlingOutcome {
    pub bundled: bool,
    /// Codes after the pass; unchanged when no rule fired.
    pub cpt_codes: Vec<String>,
    /// Codes removed by the collapse.
    pub removed_cpts: Vec<String>,
    pub reasoning: String,
}

/// A rule fires when its primary and at least one bundled code are both
/// present and none of its exception modifiers is attached. The first
/// matching rule wins.
pub(super) fn apply_bundling(
    profile: &PayerProfile,
    cpt_codes: &[String],
    modifiers: &[String],
) -> BundlingOutcome {
    for rule in &profile.bundling_rules {
        if !cpt_codes.contains(&rule.primary_cpt) {
            continue;
        }

        let bundled_present: Vec<String> = rule
            .bundled_cpts
            .iter()
            .filter(|code| cpt_codes.contains(code))
            .cloned()
            .collect();
        if bundled_present.is_empty() {
            continue;
        }

        if let Some(exception) = rule
            .modifier_exceptions
            .iter()
            .find(|exception| modifiers.contains(exception))
        {
            return BundlingOutcome {
                bundled: false,
                cpt_codes: cpt_codes.to_vec(),
                removed_cpts: Vec::new(),
                reasoning: format!(
                    "modifier {exception} exempts {} from bundling into {}",
                    bundled_present.join(", "),
                    rule.primary_cpt
                ),
            };
        }

        let removed_cpts: Vec<String> = cpt_codes
            .iter()
            .filter(|code| **code != rule.primary_cpt)
            .cloned()
            .collect();

        return BundlingOutcome {
            bundled: true,
            cpt_codes: vec![rule.primary_cpt.clone()],
            reasoning: format!(
                "{} bundle into primary {} (no exception modifier attached)",
                removed_cpts.join(", "),
                rule.primary_cpt
            ),
            removed_cpts,
        };
    }

    BundlingOutcome {
        bundled: false,
        cpt_codes: cpt_codes.to_vec(),
        removed_cpts: Vec::new(),
        reasoning: "no bundling rule matches this code combination".to_string(),
    }
}

use serde::Serialize;

use crate::profiles::PayerProfile;

/// Per-modifier validity verdict against the primary procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifierCheck {
    pub code: String,
    pub valid: bool,
    /// Payment multiplier, carried only for valid modifiers.
    pub multiplier: Option<f64>,
    pub reasoning: String,
}

/// A modifier is valid only when its code is in the payer's allowed list and
/// the primary CPT satisfies the modifier's conditions.
pub(super) fn check_modifiers(
    profile: &PayerProfile,
    primary_cpt: &str,
    modifiers: &[String],
) -> Vec<ModifierCheck> {
    modifiers
        .iter()
        .map(|code| {
            let allowed = profile
                .modifiers
                .allowed_modifiers
                .iter()
                .find(|candidate| candidate.code == *code);

            match allowed {
                Some(rule) if rule.conditions.permits(primary_cpt) => ModifierCheck {
                    code: code.clone(),
                    valid: true,
                    multiplier: Some(rule.multiplier),
                    reasoning: format!(
                        "modifier {code} allowed for {primary_cpt} (multiplier {:.2})",
                        rule.multiplier
                    ),
                },
                Some(_) => ModifierCheck {
                    code: code.clone(),
                    valid: false,
                    multiplier: None,
                    reasoning: format!(
                        "modifier {code} is allowed by the payer but not for procedure {primary_cpt}"
                    ),
                },
                None => ModifierCheck {
                    code: code.clone(),
                    valid: false,
                    multiplier: None,
                    reasoning: format!("modifier {code} is not in the payer's allowed list"),
                },
            }
        })
        .collect()
}

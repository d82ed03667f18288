use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{
    BundlingRule, CoverageRules, EligibilityRules, ModifierRules, NsaRules, PayerInfo,
    PayerProfile, PriorAuthRules,
};
use super::registry::ProfileError;

/// Raw profile document with the required sections left optional so their
/// absence surfaces as a configuration error rather than a parse failure.
#[derive(Debug, Deserialize)]
struct ProfileDocument {
    payer_info: PayerInfo,
    coverage_rules: Option<CoverageRules>,
    #[serde(default)]
    prior_auth_rules: PriorAuthRules,
    #[serde(default)]
    bundling_rules: Vec<BundlingRule>,
    #[serde(default)]
    modifiers: ModifierRules,
    nsa_rules: Option<NsaRules>,
    eligibility_rules: Option<EligibilityRules>,
}

impl ProfileDocument {
    fn into_profile(self) -> Result<PayerProfile, ProfileError> {
        let id = self.payer_info.id.clone();
        let require = |section: &str| ProfileError::MissingSection {
            id: id.clone(),
            section: section.to_string(),
        };

        Ok(PayerProfile {
            coverage_rules: self.coverage_rules.ok_or_else(|| require("coverage_rules"))?,
            nsa_rules: self.nsa_rules.ok_or_else(|| require("nsa_rules"))?,
            eligibility_rules: self
                .eligibility_rules
                .ok_or_else(|| require("eligibility_rules"))?,
            payer_info: self.payer_info,
            prior_auth_rules: self.prior_auth_rules,
            bundling_rules: self.bundling_rules,
            modifiers: self.modifiers,
        })
    }
}

/// Parse a single payer profile from a YAML reader.
pub fn load_profile_reader<R: Read>(id_hint: &str, reader: R) -> Result<PayerProfile, ProfileError> {
    let document: ProfileDocument =
        serde_yaml::from_reader(reader).map_err(|source| ProfileError::Parse {
            id: id_hint.to_string(),
            source,
        })?;
    document.into_profile()
}

/// Load one payer profile from a YAML file. The file stem is used as the
/// identifier hint in error messages; the authoritative id lives in
/// `payer_info.id`.
pub fn load_profile_file(path: &Path) -> Result<PayerProfile, ProfileError> {
    let id_hint = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = fs::File::open(path).map_err(|source| ProfileError::Io {
        id: id_hint.clone(),
        source,
    })?;

    load_profile_reader(&id_hint, file)
}

/// Outcome of a directory sweep: profiles that registered plus per-file
/// failures. A failing profile aborts only itself.
#[derive(Debug, Default)]
pub struct DirectoryLoadReport {
    pub loaded: Vec<String>,
    pub failures: Vec<(String, ProfileError)>,
}

/// Load every `*.yaml`/`*.yml` file under `dir` and register the parsed
/// profiles into `registry`.
pub fn load_profile_dir(
    registry: &super::registry::ProfileRegistry,
    dir: &Path,
) -> Result<DirectoryLoadReport, ProfileError> {
    let entries = fs::read_dir(dir).map_err(|source| ProfileError::Io {
        id: dir.display().to_string(),
        source,
    })?;

    let mut report = DirectoryLoadReport::default();

    for entry in entries {
        let entry = entry.map_err(|source| ProfileError::Io {
            id: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        if !is_yaml {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match load_profile_file(&path).and_then(|profile| registry.insert(profile)) {
            Ok(id) => report.loaded.push(id),
            Err(err) => {
                tracing::warn!(profile = %stem, error = %err, "skipping payer profile");
                report.failures.push((stem, err));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MINIMAL_PROFILE: &str = r#"
payer_info:
  id: acme-ppo
  name: Acme PPO
  plan_type: PPO
  region: IA
  effective_date: 2026-01-01
coverage_rules:
  in_network_coverage: { percentage: 80, max_out_of_pocket: 3000 }
  out_of_network_coverage: { percentage: 50, max_out_of_pocket: 9000 }
  deductible_rules: { individual: 1500, family: 3000 }
nsa_rules:
  emergency_services: { balance_billing_prohibited: true }
  out_of_network_facility:
    qpa_calculation_method: ghost_rate
    ancillary_services_protected: true
  balance_billing_protection:
    protected_services: [emergency_care, ancillary]
    notice_and_consent_eligible: [ancillary]
eligibility_rules:
  staleness_threshold_hours: 72
"#;

    #[test]
    fn parses_a_complete_profile() {
        let profile =
            load_profile_reader("acme-ppo", Cursor::new(MINIMAL_PROFILE)).expect("profile parses");
        assert_eq!(profile.payer_info.id, "acme-ppo");
        assert_eq!(
            profile.nsa_rules.out_of_network_facility.qpa_calculation_method,
            crate::profiles::QpaMethod::GhostRate
        );
        assert_eq!(profile.eligibility_rules.staleness_threshold_hours, 72);
    }

    #[test]
    fn missing_required_section_is_a_config_error() {
        let without_nsa = MINIMAL_PROFILE.replace("nsa_rules:", "nsa_rules_disabled:");
        let err = load_profile_reader("acme-ppo", Cursor::new(without_nsa))
            .expect_err("nsa_rules is required");
        match err {
            ProfileError::MissingSection { section, .. } => assert_eq!(section, "nsa_rules"),
            other => panic!("expected MissingSection, got {other:?}"),
        }
    }
}

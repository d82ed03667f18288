use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable, versioned payer configuration. One active profile per payer
/// and effective window; updates replace the whole object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerProfile {
    pub payer_info: PayerInfo,
    pub coverage_rules: CoverageRules,
    #[serde(default)]
    pub prior_auth_rules: PriorAuthRules,
    #[serde(default)]
    pub bundling_rules: Vec<BundlingRule>,
    #[serde(default)]
    pub modifiers: ModifierRules,
    pub nsa_rules: NsaRules,
    pub eligibility_rules: EligibilityRules,
}

/// Identity block for a payer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerInfo {
    pub id: String,
    pub name: String,
    pub plan_type: String,
    pub region: String,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

/// Coverage percentages and out-of-pocket caps per network tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRules {
    pub in_network_coverage: CoverageTier,
    pub out_of_network_coverage: CoverageTier,
    #[serde(default)]
    pub deductible_rules: DeductibleRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageTier {
    /// Percentage of the allowed amount the plan covers (0-100).
    pub percentage: f64,
    pub max_out_of_pocket: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeductibleRules {
    #[serde(default)]
    pub individual: f64,
    #[serde(default)]
    pub family: f64,
}

/// Services that require prior authorization before they are covered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorAuthRules {
    #[serde(default)]
    pub required_services: Vec<RequiredService>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredService {
    #[serde(default)]
    pub cpt_codes: Vec<String>,
    pub service_category: String,
    pub authorization_window_days: u16,
}

/// NCCI-style bundling: when primary and bundled codes are billed together,
/// the claim collapses to the primary unless an exception modifier is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundlingRule {
    pub primary_cpt: String,
    pub bundled_cpts: Vec<String>,
    #[serde(default)]
    pub modifier_exceptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModifierRules {
    #[serde(default)]
    pub allowed_modifiers: Vec<AllowedModifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedModifier {
    pub code: String,
    pub multiplier: f64,
    #[serde(default)]
    pub conditions: ModifierConditions,
}

/// Constraints a primary CPT must satisfy for the modifier to be valid.
/// Empty lists mean the modifier applies to any procedure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModifierConditions {
    #[serde(default)]
    pub cpt_prefixes: Vec<String>,
    #[serde(default)]
    pub cpt_codes: Vec<String>,
}

impl ModifierConditions {
    pub fn permits(&self, cpt_code: &str) -> bool {
        if self.cpt_prefixes.is_empty() && self.cpt_codes.is_empty() {
            return true;
        }

        self.cpt_codes.iter().any(|code| code == cpt_code)
            || self
                .cpt_prefixes
                .iter()
                .any(|prefix| cpt_code.starts_with(prefix.as_str()))
    }
}

/// No Surprises Act handling for the payer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsaRules {
    #[serde(default)]
    pub emergency_services: Option<EmergencyServicesPolicy>,
    pub out_of_network_facility: OutOfNetworkFacilityRules,
    pub balance_billing_protection: BalanceBillingProtection,
}

/// Payer-stated emergency billing posture. Documentation only: emergency
/// care is protected and balance billing blocked no matter what a profile
/// declares here, so the validator warns when the section is missing but
/// evaluation never consults it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyServicesPolicy {
    #[serde(default = "default_true")]
    pub balance_billing_prohibited: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutOfNetworkFacilityRules {
    pub qpa_calculation_method: QpaMethod,
    #[serde(default)]
    pub ancillary_services_protected: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceBillingProtection {
    #[serde(default)]
    pub protected_services: Vec<String>,
    #[serde(default)]
    pub notice_and_consent_eligible: Vec<String>,
}

impl BalanceBillingProtection {
    pub fn protects(&self, service: ServiceType) -> bool {
        self.protected_services
            .iter()
            .any(|entry| entry == service.as_str())
    }

    pub fn consent_eligible(&self, service: ServiceType) -> bool {
        self.notice_and_consent_eligible
            .iter()
            .any(|entry| entry == service.as_str())
    }
}

/// QPA derivation strategy, kept as a closed enum with a forward-compatible
/// fallback variant for methods this build does not know yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QpaMethod {
    MedianContractedRate,
    GhostRate,
    AllPayerDatabase,
    Other(String),
}

impl QpaMethod {
    pub fn as_str(&self) -> &str {
        match self {
            QpaMethod::MedianContractedRate => "median_contracted_rate",
            QpaMethod::GhostRate => "ghost_rate",
            QpaMethod::AllPayerDatabase => "all_payer_database",
            QpaMethod::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for QpaMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "median_contracted_rate" => QpaMethod::MedianContractedRate,
            "ghost_rate" => QpaMethod::GhostRate,
            "all_payer_database" => QpaMethod::AllPayerDatabase,
            _ => QpaMethod::Other(value),
        }
    }
}

impl From<QpaMethod> for String {
    fn from(value: QpaMethod) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRules {
    pub staleness_threshold_hours: u32,
}

/// Network tier of a provider or facility relative to the payer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    InNetwork,
    OutOfNetwork,
}

impl NetworkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            NetworkStatus::InNetwork => "in_network",
            NetworkStatus::OutOfNetwork => "out_of_network",
        }
    }

    pub const fn is_out_of_network(self) -> bool {
        matches!(self, NetworkStatus::OutOfNetwork)
    }
}

/// Service category used by NSA protection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    EmergencyCare,
    Ancillary,
    Surgery,
    Imaging,
    Outpatient,
}

impl ServiceType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceType::EmergencyCare => "emergency_care",
            ServiceType::Ancillary => "ancillary",
            ServiceType::Surgery => "surgery",
            ServiceType::Imaging => "imaging",
            ServiceType::Outpatient => "outpatient",
        }
    }

    pub const fn is_emergency(self) -> bool {
        matches!(self, ServiceType::EmergencyCare)
    }
}

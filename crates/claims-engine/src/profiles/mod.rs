//! Payer-profile configuration: the immutable rule set one insurer publishes
//! for coverage, prior authorization, bundling, modifiers, and NSA handling.
//!
//! Profiles are loaded once (YAML files, one profile per file) and registered
//! in a [`ProfileRegistry`]. Evaluation components hold `Arc` references and
//! never write through them; replacing a profile swaps the whole object.

pub mod domain;
pub mod loader;
pub mod registry;
pub mod validator;

pub use domain::{
    AllowedModifier, BalanceBillingProtection, BundlingRule, CoverageRules, CoverageTier,
    DeductibleRules, EligibilityRules, EmergencyServicesPolicy, ModifierConditions, ModifierRules,
    NetworkStatus, NsaRules, OutOfNetworkFacilityRules, PayerInfo, PayerProfile, PriorAuthRules,
    QpaMethod, RequiredService, ServiceType,
};
pub use loader::{load_profile_dir, load_profile_file, load_profile_reader, DirectoryLoadReport};
pub use registry::{ProfileError, ProfileRegistry, ProfileSummary};
pub use validator::{ProfileFinding, ProfileReport, ProfileValidator};

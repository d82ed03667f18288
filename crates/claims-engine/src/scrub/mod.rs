//! Claim scrubbing: per-claim validation, the rule engine, and the fixed-order
//! pipeline that turns a submitted claim into a [`ScrubResult`].

pub mod domain;
pub mod engine;
pub mod pipeline;
pub mod router;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    Claim, ClaimId, ClaimStatus, Issue, IssueCode, IssueSeverity, ScrubResult, ValidationError,
};
pub use engine::{
    BundlingOutcome, CoverageTerms, EligibilityDecision, ModifierCheck, NsaDecision,
    PriorAuthDecision, RuleEngine,
};
pub use pipeline::ScrubPipeline;
pub use router::claims_router;

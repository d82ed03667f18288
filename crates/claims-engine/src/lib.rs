//! Configuration-driven claims rule engine and No Surprises Act (NSA)
//! patient-liability calculator.
//!
//! The crate is organized around a one-way data flow: payer profiles are
//! loaded into a [`profiles::ProfileRegistry`] once, the stateless
//! [`scrub::RuleEngine`] and [`liability::NsaCalculator`] evaluate claims
//! against a shared read-only profile, the [`scrub::ScrubPipeline`]
//! orchestrates the checks for one claim, and the [`simulation`] harness
//! fans out pipeline invocations at volume.

pub mod config;
pub mod error;
pub mod liability;
pub mod profiles;
pub mod scrub;
pub mod simulation;
pub mod telemetry;

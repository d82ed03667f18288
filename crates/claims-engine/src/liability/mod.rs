//! No Surprises Act patient-liability calculator. Every calculation carries a
//! full audit trail: one [`CalculationStep`] per decision, in order, so a
//! reviewer can reconstruct the amount without rerunning the engine.

mod qpa;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::profiles::{NetworkStatus, PayerProfile, ServiceType};
use crate::scrub::domain::ValidationError;
use crate::scrub::engine::RuleEngine;

/// Input to one liability calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityRequest {
    pub service_type: ServiceType,
    pub facility_network_status: NetworkStatus,
    pub provider_network_status: NetworkStatus,
    pub charged_amount: f64,
    #[serde(default)]
    pub contracted_rate: Option<f64>,
    #[serde(default)]
    pub patient_consent: bool,
    #[serde(default)]
    pub patient_plan: PatientPlanProgress,
}

/// Year-to-date accumulators supplied by the caller. Echoed in the result but
/// not folded into the cost-sharing formulas; the audit trail flags this.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatientPlanProgress {
    #[serde(default)]
    pub deductible_met: f64,
    #[serde(default)]
    pub out_of_pocket_met: f64,
}

impl PatientPlanProgress {
    fn is_zero(&self) -> bool {
        self.deductible_met == 0.0 && self.out_of_pocket_met == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    StandardOon,
    NsaProtected,
    NsaWithBalanceBilling,
}

/// Value recorded by one audit-trail step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Bool(bool),
    Amount(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    pub step: u8,
    pub description: String,
    pub result: StepValue,
    pub reasoning: String,
}

/// Calculation output: the input echoed back, the derived amounts, and the
/// ordered audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NsaCalculationResult {
    pub request: LiabilityRequest,
    pub nsa_applicable: bool,
    pub qualifying_payment_amount: Option<f64>,
    pub patient_cost_sharing: f64,
    pub balance_billing_allowed: bool,
    pub final_patient_liability: f64,
    pub calculation_method: CalculationMethod,
    pub calculation_steps: Vec<CalculationStep>,
}

/// Calculator bound to one immutable profile.
#[derive(Debug, Clone)]
pub struct NsaCalculator {
    engine: RuleEngine,
}

impl NsaCalculator {
    pub fn new(profile: Arc<PayerProfile>) -> Self {
        Self {
            engine: RuleEngine::new(profile),
        }
    }

    /// Run the full liability algorithm for one request.
    pub fn calculate(
        &self,
        request: &LiabilityRequest,
    ) -> Result<NsaCalculationResult, ValidationError> {
        validate_request(request)?;

        let mut trail = AuditTrail::default();

        let decision = self.engine.check_nsa_protection(
            request.service_type,
            request.facility_network_status,
            request.provider_network_status,
            request.patient_consent,
        );
        trail.record(
            "nsa_applicability",
            StepValue::Bool(decision.protected),
            decision.reasoning.clone(),
        );

        let result = if decision.protected {
            let balance_billing_allowed = !decision.balance_billing_blocked;
            trail.record(
                "balance_billing_determination",
                StepValue::Bool(balance_billing_allowed),
                if balance_billing_allowed {
                    "notice-and-consent waiver permits balance billing".to_string()
                } else {
                    "balance billing is prohibited for this encounter".to_string()
                },
            );

            let method = &self
                .engine
                .profile()
                .nsa_rules
                .out_of_network_facility
                .qpa_calculation_method;
            let qpa = qpa::compute_qpa(method, request.charged_amount, request.contracted_rate);
            trail.record(
                "qualifying_payment_amount",
                StepValue::Amount(qpa.amount),
                qpa.reasoning,
            );

            let terms = self.engine.determine_coverage(NetworkStatus::InNetwork);
            let coinsurance = 1.0 - terms.percentage / 100.0;
            let cost_sharing = (qpa.amount * coinsurance).min(terms.max_out_of_pocket);
            trail.record(
                "in_network_equivalent_cost_sharing",
                StepValue::Amount(cost_sharing),
                format!(
                    "min(QPA {:.2} x {:.0}% coinsurance, {:.2} max out-of-pocket)",
                    qpa.amount,
                    coinsurance * 100.0,
                    terms.max_out_of_pocket
                ),
            );

            let (final_liability, calculation_method) = if balance_billing_allowed {
                let gap = (request.charged_amount - qpa.amount).max(0.0);
                let liability = (cost_sharing + gap).min(request.charged_amount);
                trail.record(
                    "final_patient_liability",
                    StepValue::Amount(liability),
                    format!(
                        "min(charged {:.2}, cost sharing {cost_sharing:.2} + billed gap {gap:.2})",
                        request.charged_amount
                    ),
                );
                (liability, CalculationMethod::NsaWithBalanceBilling)
            } else {
                trail.record(
                    "final_patient_liability",
                    StepValue::Amount(cost_sharing),
                    "liability capped at in-network-equivalent cost sharing".to_string(),
                );
                (cost_sharing, CalculationMethod::NsaProtected)
            };

            NsaCalculationResult {
                request: request.clone(),
                nsa_applicable: true,
                qualifying_payment_amount: Some(qpa.amount),
                patient_cost_sharing: cost_sharing,
                balance_billing_allowed,
                final_patient_liability: final_liability,
                calculation_method,
                calculation_steps: Vec::new(),
            }
        } else {
            let terms = self.engine.determine_coverage(NetworkStatus::OutOfNetwork);
            let coinsurance = 1.0 - terms.percentage / 100.0;
            let cost_sharing = (request.charged_amount * coinsurance).min(terms.max_out_of_pocket);
            trail.record(
                "standard_out_of_network_cost_sharing",
                StepValue::Amount(cost_sharing),
                format!(
                    "min(charged {:.2} x {:.0}% coinsurance, {:.2} max out-of-pocket)",
                    request.charged_amount,
                    coinsurance * 100.0,
                    terms.max_out_of_pocket
                ),
            );
            trail.record(
                "final_patient_liability",
                StepValue::Amount(cost_sharing),
                "standard out-of-network terms apply; provider may balance bill".to_string(),
            );

            NsaCalculationResult {
                request: request.clone(),
                nsa_applicable: false,
                qualifying_payment_amount: None,
                patient_cost_sharing: cost_sharing,
                balance_billing_allowed: true,
                final_patient_liability: cost_sharing,
                calculation_method: CalculationMethod::StandardOon,
                calculation_steps: Vec::new(),
            }
        };

        if !request.patient_plan.is_zero() {
            trail.record(
                "plan_accumulators",
                StepValue::Text("not_applied".to_string()),
                format!(
                    "deductible_met {:.2} and out_of_pocket_met {:.2} were received but \
                     not folded into cost sharing",
                    request.patient_plan.deductible_met, request.patient_plan.out_of_pocket_met
                ),
            );
        }

        Ok(NsaCalculationResult {
            calculation_steps: trail.steps,
            ..result
        })
    }

    /// Map a batch of requests to results; one bad request does not stop the
    /// rest.
    pub fn calculate_batch(
        &self,
        requests: &[LiabilityRequest],
    ) -> Vec<Result<NsaCalculationResult, ValidationError>> {
        requests.iter().map(|request| self.calculate(request)).collect()
    }
}

fn validate_request(request: &LiabilityRequest) -> Result<(), ValidationError> {
    if !request.charged_amount.is_finite() || request.charged_amount < 0.0 {
        return Err(ValidationError::InvalidAmount {
            field: "charged_amount",
            value: request.charged_amount,
        });
    }
    if let Some(rate) = request.contracted_rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ValidationError::InvalidAmount {
                field: "contracted_rate",
                value: rate,
            });
        }
    }
    Ok(())
}

#[derive(Default)]
struct AuditTrail {
    steps: Vec<CalculationStep>,
}

impl AuditTrail {
    fn record(&mut self, description: &str, result: StepValue, reasoning: String) {
        let step = self.steps.len() as u8 + 1;
        self.steps.push(CalculationStep {
            step,
            description: description.to_string(),
            result,
            reasoning,
        });
    }
}

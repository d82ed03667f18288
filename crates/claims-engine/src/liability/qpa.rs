use crate::profiles::QpaMethod;

/// Qualifying payment amount plus the reasoning recorded in the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct QpaOutcome {
    pub amount: f64,
    pub reasoning: String,
}

/// One arm per method; unknown methods fall back to the contracted rate or a
/// conservative share of charges. The result is clamped to `[0, charged]`.
pub(super) fn compute_qpa(
    method: &QpaMethod,
    charged_amount: f64,
    contracted_rate: Option<f64>,
) -> QpaOutcome {
    let (raw, reasoning) = match method {
        QpaMethod::MedianContractedRate => match contracted_rate {
            Some(rate) => (
                rate,
                format!("median contracted rate on file: {rate:.2}"),
            ),
            None => (
                charged_amount * 0.75,
                "no contracted rate on file; estimated at 75% of charges".to_string(),
            ),
        },
        QpaMethod::GhostRate => (
            charged_amount * 0.70,
            "ghost rate: 70% of charges".to_string(),
        ),
        QpaMethod::AllPayerDatabase => (
            charged_amount * 0.80,
            "all-payer database benchmark: 80% of charges".to_string(),
        ),
        QpaMethod::Other(name) => match contracted_rate {
            Some(rate) => (
                rate,
                format!("unrecognized method `{name}`; using contracted rate {rate:.2}"),
            ),
            None => (
                charged_amount * 0.80,
                format!("unrecognized method `{name}` and no contracted rate; 80% of charges"),
            ),
        },
    };

    QpaOutcome {
        amount: raw.clamp(0.0, charged_amount),
        reasoning,
    }
}

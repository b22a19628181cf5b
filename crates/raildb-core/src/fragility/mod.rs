//! # Fragility Module
//!
//! Seismic fragility curves: calculator, formatter and equation catalog.
//!
//! The calculator is the single source of truth for every number; the
//! formatter and the catalog only read its results.

mod calculator;
mod equations;
mod formatter;

pub use calculator::*;
pub use equations::*;
pub use formatter::*;

/// Result of [`compute_fragility`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FragilityReport {
    pub probability: f64,
    pub z: f64,
    pub derivation: String,
    pub variables: VariableMap,
}

/// Validate, compute and format in one call.
///
/// `damage_state` defaults to [`DEFAULT_DAMAGE_STATE`] when `None`.
pub fn compute_fragility(
    pga: f64,
    pga_mean: f64,
    beta: f64,
    damage_state: Option<&str>,
) -> Result<FragilityReport, FragilityError> {
    let input = FragilityInput::new(
        pga,
        pga_mean,
        beta,
        damage_state.unwrap_or(DEFAULT_DAMAGE_STATE),
    )?;
    let result = calculate(&input);
    let display = StatisticsFormatter::display(&input, &result);

    Ok(FragilityReport {
        probability: result.probability,
        z: result.z,
        derivation: display.derivation,
        variables: display.variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_matches_calculator() {
        let report = compute_fragility(0.2, 0.2, 0.5, None);
        assert_eq!(report.as_ref().map(|r| r.z).ok(), Some(0.0));
        assert_eq!(report.as_ref().map(|r| r.probability).ok(), Some(0.5));
        assert!(
            report
                .as_ref()
                .map(|r| r.derivation.ends_with("Φ[0.000] = 0.5000"))
                .unwrap_or(false)
        );
    }

    #[test]
    fn report_rejects_invalid_input() {
        let report = compute_fragility(-0.1, 0.2, 0.5, Some("ds_2"));
        assert!(matches!(
            report,
            Err(FragilityError::InvalidParameter { name: "pga", .. })
        ));
    }
}

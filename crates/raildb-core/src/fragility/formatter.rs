//! # Statistics Formatter
//!
//! Display records for fragility calculations.
//!
//! The formatter only formats: every number it prints is read from the
//! [`FragilityInput`] or the [`FragilityResult`] it is given. Intermediate
//! values are shown with 3 decimals, the probability with 4.

use super::calculator::{FragilityInput, FragilityResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Labelled variable descriptions, keyed by symbol.
pub type VariableMap = BTreeMap<String, String>;

/// Display record bundling input, intermediate values and result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragilityDisplay {
    pub damage_state: String,
    pub pga: f64,
    pub pga_mean: f64,
    pub beta: f64,
    pub log_ratio: f64,
    pub z: f64,
    pub probability: f64,
    /// Markup-free derivation trail.
    pub derivation: String,
    pub variables: VariableMap,
}

/// Formats fragility results for reports and the HTTP layer.
pub struct StatisticsFormatter;

impl StatisticsFormatter {
    /// Build the full display record (plain derivation, parameterized
    /// variable map).
    #[must_use]
    pub fn display(input: &FragilityInput, result: &FragilityResult) -> FragilityDisplay {
        FragilityDisplay {
            damage_state: input.damage_state().to_string(),
            pga: input.pga(),
            pga_mean: input.pga_mean(),
            beta: input.beta(),
            log_ratio: result.log_ratio,
            z: result.z,
            probability: result.probability,
            derivation: Self::plain_derivation(input, result),
            variables: Self::parameterized_variables(input, result),
        }
    }

    /// One-line derivation without markup.
    ///
    /// `P[ds >= ds_i | PGA] = Φ[(1/0.500) ln(0.100/0.200)] = Φ[-1.386] = 0.0828`
    #[must_use]
    pub fn plain_derivation(input: &FragilityInput, result: &FragilityResult) -> String {
        format!(
            "P[ds >= {ds} | PGA] = Φ[(1/{beta:.3}) ln({pga:.3}/{mean:.3})] = Φ[{z:.3}] = {p:.4}",
            ds = input.damage_state(),
            beta = input.beta(),
            pga = input.pga(),
            mean = input.pga_mean(),
            z = result.z,
            p = result.probability,
        )
    }

    /// Single-line LaTeX with the parameters substituted.
    #[must_use]
    pub fn inline_latex(input: &FragilityInput, result: &FragilityResult) -> String {
        format!(
            "P[ds \\geq {ds}\\;/\\;PGA] = \\Phi \\left[ \\frac{{1}}{{{beta:.3}}} \\ln \\left( \\frac{{{pga:.3}}}{{{mean:.3}}} \\right) \\right] = \\Phi \\left[ {z:.3} \\right] = {p:.4}",
            ds = input.damage_state(),
            beta = input.beta(),
            pga = input.pga(),
            mean = input.pga_mean(),
            z = result.z,
            p = result.probability,
        )
    }

    /// Four-step LaTeX derivation: substitution, log ratio, z, result.
    #[must_use]
    pub fn stepwise_latex(input: &FragilityInput, result: &FragilityResult) -> String {
        const BREAK: &str = "\\\\[0.5em]";

        let steps = [
            format!(
                "P[ds \\geq {ds}\\;/\\;PGA] = \\Phi \\left[ \\frac{{1}}{{{beta:.3}}} \\ln \\left( \\frac{{{pga:.3}}}{{{mean:.3}}} \\right) \\right]",
                ds = input.damage_state(),
                beta = input.beta(),
                pga = input.pga(),
                mean = input.pga_mean(),
            ),
            format!(
                "= \\Phi \\left[ \\frac{{1}}{{{beta:.3}}} \\times {ln:.3} \\right]",
                beta = input.beta(),
                ln = result.log_ratio,
            ),
            format!("= \\Phi \\left[ {z:.3} \\right]", z = result.z),
            format!("= {p:.4}", p = result.probability),
        ];

        steps.join(BREAK)
    }

    /// Variable descriptions for the parameterized equation view.
    #[must_use]
    pub fn parameterized_variables(
        input: &FragilityInput,
        result: &FragilityResult,
    ) -> VariableMap {
        let mut variables = VariableMap::new();
        variables.insert(
            "P[ds ≥ ds_i / PGA]".to_string(),
            format!(
                "Probability of exceeding {} given PGA = {:.4}",
                input.damage_state(),
                result.probability
            ),
        );
        variables.insert("Φ".to_string(), "Standard normal CDF".to_string());
        variables.insert(
            "β_{ds_i}".to_string(),
            format!("Log standard deviation = {}", input.beta()),
        );
        variables.insert(
            "PGA".to_string(),
            format!("Peak Ground Acceleration = {}", input.pga()),
        );
        variables.insert(
            "\\overline{PGA}_{ds_i}".to_string(),
            format!("Median capacity = {}", input.pga_mean()),
        );
        variables
    }

    /// Variable descriptions for the step-by-step analysis view.
    #[must_use]
    pub fn analysis_variables(result: &FragilityResult) -> VariableMap {
        let mut variables = VariableMap::new();
        variables.insert(
            "P[ds ≥ ds_i / PGA]".to_string(),
            format!("Exceedance probability = {:.4}", result.probability),
        );
        variables.insert(
            "Φ(z)".to_string(),
            format!("Standard normal CDF of z = {:.3}", result.z),
        );
        variables.insert(
            "z".to_string(),
            format!("Standardized variable = {:.3}", result.z),
        );
        variables.insert(
            "ln(PGA/PGA_mean)".to_string(),
            format!("Natural log ratio = {:.3}", result.log_ratio),
        );
        variables
    }

    /// Short LaTeX used in the example list: `P[ds \geq Light] = \Phi[-1.386] = 0.0828`.
    #[must_use]
    pub fn example_latex(damage_state: &str, result: &FragilityResult) -> String {
        format!(
            "P[ds \\geq {damage_state}] = \\Phi[{z:.3}] = {p:.4}",
            z = result.z,
            p = result.probability,
        )
    }

    /// Probability as a percentage with 2 decimals, e.g. `8.28%`.
    #[must_use]
    pub fn percentage(result: &FragilityResult) -> String {
        format!("{:.2}%", result.probability * 100.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Equation Catalog
//!
//! Static reference equations and the fixed example scenarios.

use super::calculator::{FragilityError, FragilityInput, FragilityResult, calculate};
use super::formatter::{StatisticsFormatter, VariableMap};
use serde::Serialize;

/// General form of the lognormal fragility curve.
pub const FRAGILITY_LATEX: &str = r"P[ds \geq ds_i\;/\;PGA] = \Phi \left[ \frac{1}{\beta_{ds_i}} \ln \left( \frac{PGA}{\overline{PGA}_{ds_i}} \right) \right]";

const NORMAL_CDF_LATEX: &str =
    r"\Phi(z) = \frac{1}{\sqrt{2\pi}} \int_{-\infty}^{z} e^{-\frac{t^2}{2}} dt";

const LOGNORMAL_PDF_LATEX: &str =
    r"f(x) = \frac{1}{x\sigma\sqrt{2\pi}} e^{-\frac{(\ln x - \mu)^2}{2\sigma^2}}";

/// A reference equation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equation {
    pub name: String,
    pub category: String,
    pub latex: String,
    pub description: Option<String>,
    pub variables: Option<VariableMap>,
}

impl Equation {
    fn new(name: &str, category: &str, latex: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            latex: latex.to_string(),
            description: Some(description.to_string()),
            variables: None,
        }
    }

    fn with_variables(mut self, variables: VariableMap) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Basic fragility curve with its symbol definitions.
#[must_use]
pub fn basic_fragility() -> Equation {
    let variables = [
        (
            "P[ds ≥ ds_i / PGA]",
            "Probability of exceeding damage state ds_i given PGA",
        ),
        ("Φ", "Standard normal cumulative distribution function"),
        (
            "β_{ds_i}",
            "Standard deviation of the natural logarithm of PGA for damage state ds_i",
        ),
        ("PGA", "Peak Ground Acceleration"),
        (
            "\\overline{PGA}_{ds_i}",
            "Median PGA capacity for damage state ds_i",
        ),
    ]
    .into_iter()
    .map(|(symbol, meaning)| (symbol.to_string(), meaning.to_string()))
    .collect();

    Equation::new(
        "Fragility Curve - Basic Form",
        "fragility",
        FRAGILITY_LATEX,
        "Probability of exceeding damage state ds_i given Peak Ground Acceleration (PGA)",
    )
    .with_variables(variables)
}

/// Every equation the service can render.
#[must_use]
pub fn all_equations() -> Vec<Equation> {
    vec![
        Equation::new(
            "Fragility Curve - Basic",
            "fragility",
            FRAGILITY_LATEX,
            "Basic fragility curve equation for seismic damage assessment",
        ),
        Equation::new(
            "Standard Normal CDF",
            "statistics",
            NORMAL_CDF_LATEX,
            "Standard normal cumulative distribution function",
        ),
        Equation::new(
            "Lognormal Distribution",
            "statistics",
            LOGNORMAL_PDF_LATEX,
            "Probability density function of lognormal distribution",
        ),
    ]
}

// =============================================================================
// EXAMPLE SCENARIOS
// =============================================================================

/// A named example scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub damage_state: &'static str,
    pub pga: f64,
    pub pga_mean: f64,
    pub beta: f64,
}

/// Light, moderate, heavy and complete damage.
pub const SCENARIOS: [Scenario; 4] = [
    Scenario {
        name: "Light Damage",
        damage_state: "Light",
        pga: 0.1,
        pga_mean: 0.2,
        beta: 0.5,
    },
    Scenario {
        name: "Moderate Damage",
        damage_state: "Moderate",
        pga: 0.3,
        pga_mean: 0.4,
        beta: 0.6,
    },
    Scenario {
        name: "Heavy Damage",
        damage_state: "Heavy",
        pga: 0.6,
        pga_mean: 0.8,
        beta: 0.7,
    },
    Scenario {
        name: "Complete Damage",
        damage_state: "Complete",
        pga: 1.0,
        pga_mean: 1.2,
        beta: 0.8,
    },
];

/// An evaluated scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub result: FragilityResult,
    pub latex: String,
    pub percentage: String,
}

impl Scenario {
    /// Run the scenario through the calculator.
    pub fn evaluate(&self) -> Result<ScenarioOutcome, FragilityError> {
        let input = FragilityInput::new(self.pga, self.pga_mean, self.beta, self.damage_state)?;
        let result = calculate(&input);
        Ok(ScenarioOutcome {
            scenario: *self,
            latex: StatisticsFormatter::example_latex(self.damage_state, &result),
            percentage: StatisticsFormatter::percentage(&result),
            result,
        })
    }
}

/// Evaluate every scenario, in catalog order.
#[must_use]
pub fn example_scenarios() -> Vec<Result<ScenarioOutcome, FragilityError>> {
    SCENARIOS.iter().map(Scenario::evaluate).collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_three_equations() {
        let equations = all_equations();
        assert_eq!(equations.len(), 3);
        assert_eq!(equations[0].category, "fragility");
        assert!(equations.iter().skip(1).all(|e| e.category == "statistics"));
    }

    #[test]
    fn basic_equation_defines_symbols() {
        let equation = basic_fragility();
        assert_eq!(equation.latex, FRAGILITY_LATEX);
        assert_eq!(equation.variables.as_ref().map(|v| v.len()), Some(5));
    }

    #[test]
    fn scenarios_evaluate() {
        let outcomes: Vec<_> = example_scenarios().into_iter().flatten().collect();
        assert_eq!(outcomes.len(), SCENARIOS.len());

        let light = &outcomes[0];
        assert_eq!(light.latex, "P[ds \\geq Light] = \\Phi[-1.386] = 0.0828");
        assert_eq!(light.percentage, "8.28%");

        let complete = &outcomes[3];
        assert!((complete.result.probability - 0.4097).abs() < 5e-4);
    }
}

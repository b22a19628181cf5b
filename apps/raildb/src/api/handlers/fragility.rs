//! Fragility curve equations and calculators.
//!
//! Pure computation: nothing here touches the store.

use crate::api::error::ApiError;
use crate::api::types::{ExampleEntry, ExamplesResponse, FragilityParameters, ParameterizedEquation};
use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use raildb_core::fragility::{
    self, Equation, FRAGILITY_LATEX, FragilityInput, SCENARIOS, StatisticsFormatter, calculate,
};
use std::collections::BTreeMap;

fn parameters(input: &FragilityInput) -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("PGA".to_string(), input.pga()),
        ("PGA_mean".to_string(), input.pga_mean()),
        ("beta".to_string(), input.beta()),
    ])
}

fn validated(params: FragilityParameters) -> Result<FragilityInput, ApiError> {
    Ok(FragilityInput::new(
        params.pga,
        params.pga_mean,
        params.beta,
        params.damage_state,
    )?)
}

/// `GET /latex/fragility/basic`
pub async fn basic() -> Json<Equation> {
    Json(fragility::basic_fragility())
}

/// `GET /latex/fragility/parameterized`
pub async fn parameterized(
    query: Result<Query<FragilityParameters>, QueryRejection>,
) -> Result<Json<ParameterizedEquation>, ApiError> {
    let Query(params) = query?;
    let input = validated(params)?;
    let result = calculate(&input);
    let ds = input.damage_state();

    Ok(Json(ParameterizedEquation {
        name: format!("Fragility Curve - {ds}"),
        category: "fragility".to_string(),
        latex: FRAGILITY_LATEX.to_string(),
        description: Some(format!("Fragility curve calculation for damage state {ds}")),
        variables: Some(StatisticsFormatter::parameterized_variables(&input, &result)),
        parameters: parameters(&input),
        latex_with_values: StatisticsFormatter::inline_latex(&input, &result),
        numerical_result: result.probability,
    }))
}

/// `POST /latex/fragility/calculate`
pub async fn calculate_with_params(
    body: Result<Json<FragilityParameters>, JsonRejection>,
) -> Result<Json<ParameterizedEquation>, ApiError> {
    let Json(params) = body?;
    let input = validated(params)?;
    let result = calculate(&input);
    let ds = input.damage_state();

    let mut parameters = parameters(&input);
    parameters.insert("z_value".to_string(), result.z);

    Ok(Json(ParameterizedEquation {
        name: format!("Fragility Analysis - {ds}"),
        category: "fragility".to_string(),
        latex: FRAGILITY_LATEX.to_string(),
        description: Some(format!("Complete fragility curve analysis for {ds}")),
        variables: Some(StatisticsFormatter::analysis_variables(&result)),
        parameters,
        latex_with_values: StatisticsFormatter::stepwise_latex(&input, &result),
        numerical_result: result.probability,
    }))
}

/// `GET /latex/fragility/examples`
pub async fn examples() -> Json<ExamplesResponse> {
    let examples = SCENARIOS
        .iter()
        .zip(fragility::example_scenarios())
        .map(|(scenario, outcome)| match outcome {
            Ok(outcome) => outcome.into(),
            Err(e) => ExampleEntry::Failed {
                scenario: scenario.name.to_string(),
                error: e.to_string(),
            },
        })
        .collect();

    Json(ExamplesResponse {
        description: "Common fragility curve calculation examples".to_string(),
        base_equation: FRAGILITY_LATEX.to_string(),
        examples,
    })
}

/// `GET /latex/equations`
pub async fn equations() -> Json<Vec<Equation>> {
    Json(fragility::all_equations())
}

//! # Fragility Calculator
//!
//! Lognormal fragility model:
//!
//! ```text
//! P[ds >= ds_i | PGA] = Φ( (1/β) · ln(PGA / PGA_mean) )
//! ```
//!
//! Everything here is a pure function of its inputs. There is no state,
//! no I/O and no randomness, so calls may run concurrently without any
//! coordination.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Damage state label used when the caller does not provide one.
pub const DEFAULT_DAMAGE_STATE: &str = "ds_i";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by the fragility calculator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FragilityError {
    /// A numeric parameter was zero, negative, infinite or NaN.
    #[error("invalid parameter `{name}`: {value} (all parameters must be positive and finite)")]
    InvalidParameter { name: &'static str, value: f64 },
}

// =============================================================================
// INPUT
// =============================================================================

/// Validated calculator input.
///
/// Construct with [`FragilityInput::new`]; fields are private so an
/// instance always satisfies `pga, pga_mean, beta > 0` with all three finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragilityInput {
    pga: f64,
    pga_mean: f64,
    beta: f64,
    damage_state: String,
}

impl FragilityInput {
    /// Validate the three physical parameters and bundle them with a
    /// damage state label.
    ///
    /// An empty label falls back to [`DEFAULT_DAMAGE_STATE`].
    pub fn new(
        pga: f64,
        pga_mean: f64,
        beta: f64,
        damage_state: impl Into<String>,
    ) -> Result<Self, FragilityError> {
        ensure_positive("pga", pga)?;
        ensure_positive("pga_mean", pga_mean)?;
        ensure_positive("beta", beta)?;

        let damage_state = damage_state.into();
        let damage_state = if damage_state.trim().is_empty() {
            DEFAULT_DAMAGE_STATE.to_string()
        } else {
            damage_state
        };

        Ok(Self {
            pga,
            pga_mean,
            beta,
            damage_state,
        })
    }

    /// Peak ground acceleration.
    #[must_use]
    pub fn pga(&self) -> f64 {
        self.pga
    }

    /// Median PGA capacity for the damage state.
    #[must_use]
    pub fn pga_mean(&self) -> f64 {
        self.pga_mean
    }

    /// Log standard deviation.
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    #[must_use]
    pub fn damage_state(&self) -> &str {
        &self.damage_state
    }
}

/// Rejects NaN and both infinities along with non-positive values.
fn ensure_positive(name: &'static str, value: f64) -> Result<(), FragilityError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FragilityError::InvalidParameter { name, value })
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// Output of [`calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragilityResult {
    /// `ln(pga / pga_mean)`.
    pub log_ratio: f64,
    /// Standardized variable `(1/beta) * ln(pga / pga_mean)`.
    pub z: f64,
    /// `Φ(z)`, always within `[0, 1]`.
    pub probability: f64,
}

/// Evaluate the fragility curve for a validated input.
#[must_use]
pub fn calculate(input: &FragilityInput) -> FragilityResult {
    let log_ratio = (input.pga / input.pga_mean).ln();
    let z = (1.0 / input.beta) * log_ratio;
    let probability = standard_normal_cdf(z).clamp(0.0, 1.0);

    FragilityResult {
        log_ratio,
        z,
        probability,
    }
}

// =============================================================================
// STANDARD NORMAL CDF
// =============================================================================

/// Beyond this |z| the lower tail underflows to zero in double precision.
const CDF_TAIL_LIMIT: f64 = 37.0;

/// Switch point between the rational form and the continued fraction.
const CDF_RATIONAL_LIMIT: f64 = 7.071_067_811_865_47;

const SQRT_TWO_PI: f64 = 2.506_628_274_631;

const CDF_NUMERATOR: [f64; 7] = [
    3.526_249_659_989_11e-2,
    0.700_383_064_443_688,
    6.373_962_203_531_65,
    33.912_866_078_383,
    112.079_291_497_871,
    221.213_596_169_931,
    220.206_867_912_376,
];

const CDF_DENOMINATOR: [f64; 8] = [
    8.838_834_764_831_84e-2,
    1.755_667_163_182_64,
    16.064_177_579_207,
    86.780_732_202_946_1,
    296.564_248_779_674,
    637.333_633_378_831,
    793.826_512_519_948,
    440.413_735_824_752,
];

/// Standard normal cumulative distribution function Φ(z).
///
/// Hart's double precision rational approximation (algorithm 5666) with a
/// continued fraction for the far tail. Absolute error stays below 1e-14
/// and `Φ(0)` is exactly `0.5`.
#[must_use]
pub fn standard_normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }

    let x = z.abs();
    let lower_tail = if x > CDF_TAIL_LIMIT {
        0.0
    } else {
        let gaussian = (-x * x / 2.0).exp();
        if x < CDF_RATIONAL_LIMIT {
            gaussian * horner(&CDF_NUMERATOR, x) / horner(&CDF_DENOMINATOR, x)
        } else {
            let mut fraction = x + 0.65;
            for k in [4.0, 3.0, 2.0, 1.0] {
                fraction = x + k / fraction;
            }
            gaussian / fraction / SQRT_TWO_PI
        }
    };

    if z > 0.0 {
        1.0 - lower_tail
    } else {
        lower_tail
    }
}

fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .fold(0.0, |acc, &coefficient| acc * x + coefficient)
}

// =============================================================================
// TESTS
// =============================================================================

//! Edge weight pairs and the synthetic self-loop constant.

use serde::{Deserialize, Serialize};

use crate::address::EdgeAddress;
use crate::error::ScoreGraphError;

/// Default synthetic loop weight, applied at every node when a caller does
/// not specify one explicitly.
pub const DEFAULT_SYNTHETIC_LOOP_WEIGHT: f64 = 1e-3;

/// Asymmetric forward/backward weight of a single edge.
///
/// `to_weight` governs score flow `src -> dst`; `fro_weight` governs score
/// flow `dst -> src`. Both are non-negative finite reals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    /// Weight of the `src -> dst` direction.
    pub to_weight: f64,
    /// Weight of the `dst -> src` direction.
    pub fro_weight: f64,
}

impl EdgeWeight {
    /// Build a weight pair, validating both components against
    /// [`validate_weight`].
    ///
    /// # Errors
    ///
    /// Returns [`ScoreGraphError::InvalidWeight`] if either component is
    /// negative, `NaN`, or infinite.
    pub fn new(address: &EdgeAddress, to_weight: f64, fro_weight: f64) -> Result<Self, ScoreGraphError> {
        validate_weight(address, to_weight)?;
        validate_weight(address, fro_weight)?;
        Ok(Self {
            to_weight,
            fro_weight,
        })
    }
}

/// Validate that `value` is a legal weight component: non-negative and finite.
///
/// # Errors
///
/// Returns [`ScoreGraphError::InvalidWeight`] naming `address` and the
/// specific reason (`NaN`, infinite, or negative) when `value` fails the
/// check.
pub fn validate_weight(address: &EdgeAddress, value: f64) -> Result<(), ScoreGraphError> {
    if value.is_nan() {
        return Err(ScoreGraphError::InvalidWeight {
            address: address.clone(),
            value,
            reason: "NaN",
        });
    }
    if value.is_infinite() {
        return Err(ScoreGraphError::InvalidWeight {
            address: address.clone(),
            value,
            reason: "infinite",
        });
    }
    if value < 0.0 {
        return Err(ScoreGraphError::InvalidWeight {
            address: address.clone(),
            value,
            reason: "negative",
        });
    }
    Ok(())
}

/// Validate a synthetic loop weight: must be strictly positive and finite.
///
/// # Errors
///
/// Returns [`ScoreGraphError::InvalidLoopWeight`] if `value` is not
/// strictly positive, or is `NaN`/infinite.
pub fn validate_loop_weight(value: f64) -> Result<(), ScoreGraphError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ScoreGraphError::InvalidLoopWeight { got: value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> EdgeAddress {
        EdgeAddress::new(["edge", "1"])
    }

    #[test]
    fn accepts_zero_weights() {
        let w = EdgeWeight::new(&addr(), 0.0, 0.0).unwrap();
        assert_eq!(w.to_weight, 0.0);
        assert_eq!(w.fro_weight, 0.0);
    }

    #[test]
    fn rejects_negative() {
        assert!(EdgeWeight::new(&addr(), -1.0, 0.0).is_err());
    }

    #[test]
    fn rejects_nan_and_infinite() {
        assert!(EdgeWeight::new(&addr(), f64::NAN, 0.0).is_err());
        assert!(EdgeWeight::new(&addr(), f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn loop_weight_must_be_strictly_positive() {
        assert!(validate_loop_weight(0.0).is_err());
        assert!(validate_loop_weight(-1e-3).is_err());
        assert!(validate_loop_weight(DEFAULT_SYNTHETIC_LOOP_WEIGHT).is_ok());
    }
}

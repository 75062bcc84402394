use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Key identifying a raw-material line in the master stock register.
///
/// The upstream register has no surrogate id; a material is addressed by the
/// full name + dimensions tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct MasterStockKey {
    pub name: String,

    /// Capacity in millilitres.
    pub capacity_ml: Decimal,

    /// Unit weight in grams.
    pub weight_gm: Decimal,

    /// Neck diameter in millimetres.
    pub neck_diameter_mm: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockAdjustmentError {
    #[error("empty adjustment expression")]
    Empty,

    #[error("invalid adjustment expression: {0}")]
    Invalid(String),

    #[error("adjustment would drive stock below zero (current {current}, delta {delta})")]
    Underflow { current: i64, delta: i64 },
}

/// A stock adjustment expression from the dashboard.
///
/// `+N` and `-N` apply a signed delta to the current level; a bare `N` sets
/// the level outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockAdjustment {
    Delta(i64),
    Absolute(i64),
}

impl StockAdjustment {
    pub fn parse(raw: &str) -> Result<Self, StockAdjustmentError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(StockAdjustmentError::Empty);
        }
        let invalid = || StockAdjustmentError::Invalid(raw.to_string());
        if let Some(rest) = raw.strip_prefix('+') {
            let n: i64 = rest.trim().parse().map_err(|_| invalid())?;
            Ok(Self::Delta(n))
        } else if let Some(rest) = raw.strip_prefix('-') {
            let n: i64 = rest.trim().parse().map_err(|_| invalid())?;
            Ok(Self::Delta(-n))
        } else {
            let n: i64 = raw.parse().map_err(|_| invalid())?;
            if n < 0 {
                return Err(invalid());
            }
            Ok(Self::Absolute(n))
        }
    }

    /// The level after applying this adjustment to `current`. Levels never
    /// go below zero; an underflowing delta is rejected before any mutation.
    pub fn apply(self, current: i64) -> Result<i64, StockAdjustmentError> {
        match self {
            Self::Absolute(level) => Ok(level),
            Self::Delta(delta) => {
                let next = current + delta;
                if next < 0 {
                    Err(StockAdjustmentError::Underflow { current, delta })
                } else {
                    Ok(next)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_deltas_and_absolute() {
        assert_eq!(StockAdjustment::parse("+25"), Ok(StockAdjustment::Delta(25)));
        assert_eq!(StockAdjustment::parse("-10"), Ok(StockAdjustment::Delta(-10)));
        assert_eq!(
            StockAdjustment::parse("300"),
            Ok(StockAdjustment::Absolute(300))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            StockAdjustment::parse("ten"),
            Err(StockAdjustmentError::Invalid(_))
        ));
        assert_eq!(StockAdjustment::parse("   "), Err(StockAdjustmentError::Empty));
    }

    #[test]
    fn delta_applies_to_current_level() {
        assert_eq!(StockAdjustment::Delta(25).apply(100), Ok(125));
        assert_eq!(StockAdjustment::Delta(-100).apply(100), Ok(0));
        assert_eq!(StockAdjustment::Absolute(40).apply(100), Ok(40));
    }

    #[test]
    fn underflow_is_rejected() {
        assert_eq!(
            StockAdjustment::Delta(-101).apply(100),
            Err(StockAdjustmentError::Underflow {
                current: 100,
                delta: -101
            })
        );
    }
}

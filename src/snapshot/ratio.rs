//! Percentages with an explicit "not applicable" state.
//!
//! A zero denominator never produces NaN or infinity; it produces
//! [`Ratio::NotApplicable`], which renders as `N/A`.

use crate::utils::config::NOT_APPLICABLE_LABEL;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Percent(f64),
    NotApplicable,
}

impl Ratio {
    /// `part / whole` as a percentage
    pub fn of(part: f64, whole: f64) -> Self {
        if whole == 0.0 || !whole.is_finite() || !part.is_finite() {
            Ratio::NotApplicable
        } else {
            Ratio::Percent(part / whole * 100.0)
        }
    }

    pub fn percent(self) -> Option<f64> {
        match self {
            Ratio::Percent(p) => Some(p),
            Ratio::NotApplicable => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Percent(p) => write!(f, "{:.1}%", p),
            Ratio::NotApplicable => f.write_str(NOT_APPLICABLE_LABEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_normal() {
        assert_eq!(Ratio::of(25.0, 100.0), Ratio::Percent(25.0));
        assert_eq!(Ratio::of(-50.0, 100.0).to_string(), "-50.0%");
    }

    #[test]
    fn test_ratio_zero_whole() {
        // Should not divide and should render the marker
        assert_eq!(Ratio::of(10.0, 0.0), Ratio::NotApplicable);
        assert_eq!(Ratio::of(0.0, 0.0).to_string(), "N/A");
        assert_eq!(Ratio::NotApplicable.percent(), None);
    }
}

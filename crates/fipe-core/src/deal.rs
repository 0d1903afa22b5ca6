//! Asking price versus reference price.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How an asking price sits against the reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealVerdict {
    /// Far below the reference; likely a scam or a damaged vehicle.
    SuspiciouslyLow,
    Opportunity,
    Fair,
    Expensive,
}

impl DealVerdict {
    pub fn from_ratio(ratio: Decimal) -> Self {
        if ratio < dec!(0.75) {
            Self::SuspiciouslyLow
        } else if ratio <= dec!(0.92) {
            Self::Opportunity
        } else if ratio <= dec!(1.08) {
            Self::Fair
        } else {
            Self::Expensive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealEvaluation {
    pub asking: Decimal,
    pub reference: Decimal,
    /// `asking / reference`, four decimal places.
    pub ratio: Decimal,
    /// Signed percentage above (+) or below (-) the reference, two places.
    pub difference_pct: Decimal,
    pub verdict: DealVerdict,
}

/// Parses a Brazilian currency string such as `R$ 45.800,00`.
///
/// Every non-digit is dropped and the last two digits are cents, so
/// `"45800"` reads as `458.00`. Returns `None` when no digits remain.
pub fn parse_brl_price(raw: &str) -> Option<Decimal> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let cents: i64 = digits.parse().ok()?;
    Some(Decimal::new(cents, 2))
}

/// Compares `asking` with `reference`. A zero or negative reference has no
/// meaningful ratio.
pub fn evaluate_deal(asking: Decimal, reference: Decimal) -> Option<DealEvaluation> {
    if reference <= Decimal::ZERO {
        return None;
    }
    let ratio = asking.checked_div(reference)?;
    let difference_pct = ((ratio - Decimal::ONE) * dec!(100)).round_dp(2);

    Some(DealEvaluation {
        asking,
        reference,
        ratio: ratio.round_dp(4),
        difference_pct,
        verdict: DealVerdict::from_ratio(ratio),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_brl_price() {
        assert_eq!(parse_brl_price("R$ 45.800,00"), Some(dec!(45800.00)));
        assert_eq!(parse_brl_price("R$ 1.234.567,89"), Some(dec!(1234567.89)));
        assert_eq!(parse_brl_price("R$ "), None);
        assert_eq!(parse_brl_price(""), None);
    }

    #[test]
    fn test_verdict_bands() {
        let reference = dec!(100000);
        let verdict = |asking| evaluate_deal(asking, reference).unwrap().verdict;

        assert_eq!(verdict(dec!(70000)), DealVerdict::SuspiciouslyLow);
        assert_eq!(verdict(dec!(75000)), DealVerdict::Opportunity);
        assert_eq!(verdict(dec!(92000)), DealVerdict::Opportunity);
        assert_eq!(verdict(dec!(100000)), DealVerdict::Fair);
        assert_eq!(verdict(dec!(108000)), DealVerdict::Fair);
        assert_eq!(verdict(dec!(108001)), DealVerdict::Expensive);
    }

    #[test]
    fn test_difference_is_signed_percentage() {
        let evaluation = evaluate_deal(dec!(41220), dec!(45800)).unwrap();
        assert_eq!(evaluation.difference_pct, dec!(-10.00));
        assert_eq!(evaluation.ratio, dec!(0.9));
    }

    #[test]
    fn test_zero_reference_has_no_evaluation() {
        assert!(evaluate_deal(dec!(1000), Decimal::ZERO).is_none());
    }
}

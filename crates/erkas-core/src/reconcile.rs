//! Assessed and not-yet-assessed lengths of one classification family.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Codes that count as assessed.
pub const ASSESSED_CODES: RangeInclusive<i64> = 1..=4;

/// Reconciled lengths, in the units of the inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    pub assessed: f64,
    pub not_yet_assessed: f64,
}

/// Splits `total` into exempted, assessed and not-yet-assessed.
///
/// The not-yet-assessed length is the residual, so code 0, out-of-range
/// codes and segments without a code all end up there.
pub fn reconcile(total: f64, exempted: f64, codes: &BTreeMap<i64, f64>) -> Reconciliation {
    let assessed: f64 = codes
        .range(ASSESSED_CODES)
        .map(|(_, length)| *length)
        .sum();
    Reconciliation {
        assessed,
        not_yet_assessed: total - exempted - assessed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessed_counts_codes_one_to_four() {
        let codes = BTreeMap::from([(0, 100.0), (1, 200.0), (4, 300.0), (5, 400.0), (9, 50.0)]);
        let result = reconcile(2000.0, 250.0, &codes);
        assert_eq!(result.assessed, 500.0);
        assert_eq!(result.not_yet_assessed, 1250.0);
    }

    #[test]
    fn test_empty_codes() {
        let result = reconcile(1000.0, 0.0, &BTreeMap::new());
        assert_eq!(result.assessed, 0.0);
        assert_eq!(result.not_yet_assessed, 1000.0);
    }
}

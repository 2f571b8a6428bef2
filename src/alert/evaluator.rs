//! Threshold evaluation against the last alerted-from price

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Outcome of comparing a fresh price with its baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    /// Move is below the threshold, or there is no usable baseline
    NoAlert,
    /// Move reached the threshold; signed, unrounded percent change
    Alert(Decimal),
}

impl AlertDecision {
    pub fn fired(&self) -> bool {
        matches!(self, AlertDecision::Alert(_))
    }
}

/// Whether `baseline` must be (re)established from the current price
///
/// Absent and non-positive baselines cannot produce a percent change.
pub fn needs_seed(baseline: Option<Decimal>) -> bool {
    !matches!(baseline, Some(b) if b > Decimal::ZERO)
}

/// Decide whether `current` moved at least `threshold_pct` percent away from
/// `baseline`
///
/// The comparison is inclusive and uses the unrounded delta. Never fires
/// when the baseline is absent or not positive.
pub fn evaluate(
    current: Decimal,
    baseline: Option<Decimal>,
    threshold_pct: Decimal,
) -> AlertDecision {
    let baseline = match baseline {
        Some(b) if b > Decimal::ZERO => b,
        _ => return AlertDecision::NoAlert,
    };

    let delta = percent_change(current, baseline);

    if delta.abs() >= threshold_pct {
        AlertDecision::Alert(delta)
    } else {
        AlertDecision::NoAlert
    }
}

/// `(current - baseline) / baseline * 100`, saturating on overflow
fn percent_change(current: Decimal, baseline: Decimal) -> Decimal {
    let diff = current - baseline;
    diff.checked_div(baseline)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(if diff.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

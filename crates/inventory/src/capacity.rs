//! Warehouse capacity usage.

use serde::{Deserialize, Serialize};

use packflow_core::ValueObject;

/// Post-order warehouse fill level.
///
/// A capacity of 0 means the SKU has no physical ceiling; that renders as
/// "unlimited" rather than a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CapacityUsage {
    Unlimited,
    Percent(i64),
}

impl ValueObject for CapacityUsage {}

impl CapacityUsage {
    /// `round((on_hand + qty) / max * 100)`, or `Unlimited` when `max <= 0`.
    pub fn after_order(on_hand: i64, qty: i64, max_capacity: i64) -> Self {
        if max_capacity <= 0 {
            return Self::Unlimited;
        }
        let filled = (on_hand.max(0) + qty.max(0)) as f64;
        Self::Percent((filled / max_capacity as f64 * 100.0).round() as i64)
    }

    pub fn percent(self) -> Option<i64> {
        match self {
            Self::Unlimited => None,
            Self::Percent(p) => Some(p),
        }
    }

    pub fn exceeds_capacity(self) -> bool {
        matches!(self, Self::Percent(p) if p > 100)
    }
}

impl core::fmt::Display for CapacityUsage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Units that still fit before the warehouse is full; `None` when unbounded.
pub fn headroom(on_hand: i64, max_capacity: i64) -> Option<i64> {
    (max_capacity > 0).then(|| (max_capacity - on_hand).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(CapacityUsage::after_order(80, 20, 100), CapacityUsage::Percent(100));
        assert_eq!(CapacityUsage::after_order(1, 0, 3), CapacityUsage::Percent(33));
        assert_eq!(CapacityUsage::after_order(2, 0, 3), CapacityUsage::Percent(67));
    }

    #[test]
    fn unbounded_capacity_is_unlimited() {
        let usage = CapacityUsage::after_order(5_000, 10_000, 0);
        assert_eq!(usage, CapacityUsage::Unlimited);
        assert_eq!(usage.to_string(), "unlimited");
        assert_eq!(usage.percent(), None);
        assert!(!usage.exceeds_capacity());
    }

    #[test]
    fn over_capacity_detected() {
        assert!(CapacityUsage::after_order(80, 50, 100).exceeds_capacity());
        assert!(!CapacityUsage::after_order(80, 20, 100).exceeds_capacity());
    }

    #[test]
    fn headroom_never_negative() {
        assert_eq!(headroom(80, 100), Some(20));
        assert_eq!(headroom(120, 100), Some(0));
        assert_eq!(headroom(120, 0), None);
    }
}

//! Recommendation parameters.

use serde::{Deserialize, Serialize};

use packflow_core::DomainError;

/// Days-of-inventory target. Only the fixed menu values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DoiGoal {
    Days30,
    Days60,
    Days90,
    #[default]
    Days120,
    Days150,
    Days180,
}

impl DoiGoal {
    pub const ALL: [DoiGoal; 6] = [
        DoiGoal::Days30,
        DoiGoal::Days60,
        DoiGoal::Days90,
        DoiGoal::Days120,
        DoiGoal::Days150,
        DoiGoal::Days180,
    ];

    pub fn days(self) -> u32 {
        match self {
            DoiGoal::Days30 => 30,
            DoiGoal::Days60 => 60,
            DoiGoal::Days90 => 90,
            DoiGoal::Days120 => 120,
            DoiGoal::Days150 => 150,
            DoiGoal::Days180 => 180,
        }
    }
}

impl TryFrom<u32> for DoiGoal {
    type Error = DomainError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        DoiGoal::ALL
            .into_iter()
            .find(|g| g.days() == days)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "doi goal must be one of 30/60/90/120/150/180 days (got {days})"
                ))
            })
    }
}

impl From<DoiGoal> for u32 {
    fn from(goal: DoiGoal) -> Self {
        goal.days()
    }
}

impl core::fmt::Display for DoiGoal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// Target fraction of warehouse capacity to fill, in `[0.70, 1.00]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SafetyBufferRatio(f64);

impl SafetyBufferRatio {
    pub const MIN: f64 = 0.70;
    pub const MAX: f64 = 1.00;

    pub fn new(ratio: f64) -> Result<Self, DomainError> {
        if !(ratio.is_finite() && (Self::MIN..=Self::MAX).contains(&ratio)) {
            return Err(DomainError::validation(format!(
                "safety buffer ratio must be between 0.70 and 1.00 (got {ratio})"
            )));
        }
        Ok(Self(ratio))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SafetyBufferRatio {
    fn default() -> Self {
        Self(0.85)
    }
}

impl TryFrom<f64> for SafetyBufferRatio {
    type Error = DomainError;

    fn try_from(ratio: f64) -> Result<Self, Self::Error> {
        Self::new(ratio)
    }
}

impl From<SafetyBufferRatio> for f64 {
    fn from(ratio: SafetyBufferRatio) -> Self {
        ratio.0
    }
}

/// Ordering among SKUs with equal days of inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep inventory-store iteration order.
    #[default]
    InputOrder,
    /// Sort equal-DOI SKUs by name for reproducible output.
    SkuName,
}

impl core::str::FromStr for TieBreak {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "input_order" => Ok(TieBreak::InputOrder),
            "sku" | "sku_name" => Ok(TieBreak::SkuName),
            other => Err(DomainError::validation(format!(
                "unknown tie-break '{other}' (expected input or sku)"
            ))),
        }
    }
}

//! Engine configuration loaded from the environment.
//!
//! | Variable                 | Meaning                                  | Default |
//! |--------------------------|------------------------------------------|---------|
//! | `PACKFLOW_DOI_GOAL`      | days of inventory to target (30..=180)   | 120     |
//! | `PACKFLOW_SAFETY_BUFFER` | capacity fill ratio (0.70..=1.00)        | 0.85    |
//! | `PACKFLOW_TIE_BREAK`     | equal-DOI ordering (`input` or `sku`)    | input   |
//!
//! Invalid values are logged and replaced by the default.

use serde::{Deserialize, Serialize};

use packflow_forecasting::{DoiGoal, ForecastRecommender, SafetyBufferRatio, TieBreak};

pub const DOI_GOAL_VAR: &str = "PACKFLOW_DOI_GOAL";
pub const SAFETY_BUFFER_VAR: &str = "PACKFLOW_SAFETY_BUFFER";
pub const TIE_BREAK_VAR: &str = "PACKFLOW_TIE_BREAK";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub doi_goal: DoiGoal,
    pub safety_buffer: SafetyBufferRatio,
    pub tie_break: TieBreak,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(DOI_GOAL_VAR) {
            match raw.trim().parse::<u32>().ok().map(DoiGoal::try_from) {
                Some(Ok(goal)) => config.doi_goal = goal,
                _ => tracing::warn!(
                    var = DOI_GOAL_VAR,
                    value = %raw,
                    default = %config.doi_goal,
                    "invalid doi goal; using default"
                ),
            }
        }

        if let Some(raw) = lookup(SAFETY_BUFFER_VAR) {
            match raw.trim().parse::<f64>().ok().map(SafetyBufferRatio::new) {
                Some(Ok(ratio)) => config.safety_buffer = ratio,
                _ => tracing::warn!(
                    var = SAFETY_BUFFER_VAR,
                    value = %raw,
                    default = config.safety_buffer.value(),
                    "invalid safety buffer; using default"
                ),
            }
        }

        if let Some(raw) = lookup(TIE_BREAK_VAR) {
            match raw.parse::<TieBreak>() {
                Ok(tie_break) => config.tie_break = tie_break,
                Err(err) => tracing::warn!(
                    var = TIE_BREAK_VAR,
                    error = %err,
                    "invalid tie-break; using input order"
                ),
            }
        }

        config
    }

    pub fn recommender(&self) -> ForecastRecommender {
        ForecastRecommender::new(self.doi_goal, self.safety_buffer).with_tie_break(self.tie_break)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(|_| None);
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.doi_goal.days(), 120);
        assert_eq!(config.safety_buffer.value(), 0.85);
        assert_eq!(config.tie_break, TieBreak::InputOrder);
    }

    #[test]
    fn reads_valid_values() {
        let config = EngineConfig::from_lookup(lookup(&[
            (DOI_GOAL_VAR, "90"),
            (SAFETY_BUFFER_VAR, " 0.9 "),
            (TIE_BREAK_VAR, "sku"),
        ]));
        assert_eq!(config.doi_goal, DoiGoal::Days90);
        assert_eq!(config.safety_buffer.value(), 0.9);
        assert_eq!(config.tie_break, TieBreak::SkuName);
    }

    #[test]
    fn invalid_values_fall_back_independently() {
        let config = EngineConfig::from_lookup(lookup(&[
            (DOI_GOAL_VAR, "45"),
            (SAFETY_BUFFER_VAR, "1.5"),
            (TIE_BREAK_VAR, "sku_name"),
        ]));
        assert_eq!(config.doi_goal, DoiGoal::Days120);
        assert_eq!(config.safety_buffer, SafetyBufferRatio::default());
        assert_eq!(config.tie_break, TieBreak::SkuName);
    }
}

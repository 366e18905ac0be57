//! Reference forecast requirements (stand-in for the external forecast service).
//!
//! For each SKU:
//! - `forecasted_units_needed = daily_rate * doi_goal`
//! - the target is clamped to `floor(max_capacity * safety_buffer)` when capacity is bounded
//! - the shortfall against on-hand stock is rounded up to whole pallets, or down to whole
//!   pallets when rounding up would overrun the buffered capacity

use packflow_inventory::{InventoryItem, pallet};

use crate::params::{DoiGoal, SafetyBufferRatio};
use crate::record::{ForecastRecord, ProductDemand};

#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementsPlanner {
    doi_goal: DoiGoal,
    safety_buffer: SafetyBufferRatio,
}

impl RequirementsPlanner {
    pub fn new(doi_goal: DoiGoal, safety_buffer: SafetyBufferRatio) -> Self {
        Self {
            doi_goal,
            safety_buffer,
        }
    }

    /// One record per inventory item, in inventory order.
    pub fn plan_all(
        &self,
        inventory: &[InventoryItem],
        demand: &[ProductDemand],
    ) -> Vec<ForecastRecord> {
        inventory.iter().map(|item| self.plan(item, demand)).collect()
    }

    pub fn plan(&self, item: &InventoryItem, demand: &[ProductDemand]) -> ForecastRecord {
        let consumers: Vec<ProductDemand> = demand
            .iter()
            .filter(|d| &d.sku == item.sku())
            .cloned()
            .collect();

        let mut record = ForecastRecord {
            sku: item.sku().clone(),
            recommended_order_qty: 0.0,
            forecasted_units_needed: 0.0,
            current_inventory: item.warehouse_quantity(),
            demand: consumers,
        };

        let needed = record.daily_sales_rate() * f64::from(self.doi_goal.days());
        record.forecasted_units_needed = needed;
        record.recommended_order_qty = self.order_quantity(item, needed) as f64;
        record
    }

    fn order_quantity(&self, item: &InventoryItem, needed: f64) -> i64 {
        let on_hand = item.warehouse_quantity();
        let upp = item.units_per_pallet();

        let buffered_cap = item.is_capacity_bounded().then(|| {
            (item.max_warehouse_capacity() as f64 * self.safety_buffer.value()).floor() as i64
        });

        let target = match buffered_cap {
            Some(cap) => needed.min(cap as f64),
            None => needed,
        };

        let shortfall = (target - on_hand as f64).ceil().max(0.0) as i64;
        if shortfall == 0 {
            return 0;
        }

        let rounded = pallet::round_up_to_pallet(shortfall, upp);
        let Some(cap) = buffered_cap else {
            return rounded;
        };

        let allowed = (cap - on_hand).max(0);
        if rounded <= allowed {
            return rounded;
        }

        match pallet::full_pallets(allowed, upp) * upp {
            0 => shortfall.min(allowed),
            whole => whole,
        }
    }
}

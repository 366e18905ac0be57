use std::sync::RwLock;

use packflow_forecasting::{
    DoiGoal, ForecastRecord, ProductDemand, RequirementsPlanner, SafetyBufferRatio,
};

use super::{ForecastSource, InventoryStore, StoreError};

/// Forecast source that plans requirements from per-product demand against the
/// live inventory store.
#[derive(Debug)]
pub struct PlannedForecastSource<I> {
    inventory: I,
    demand: RwLock<Vec<ProductDemand>>,
}

impl<I> PlannedForecastSource<I> {
    pub fn new(inventory: I, demand: Vec<ProductDemand>) -> Self {
        Self {
            inventory,
            demand: RwLock::new(demand),
        }
    }

    pub fn replace_demand(&self, demand: Vec<ProductDemand>) -> Result<(), StoreError> {
        *self.demand.write().map_err(|_| StoreError::poisoned())? = demand;
        Ok(())
    }
}

impl<I> ForecastSource for PlannedForecastSource<I>
where
    I: InventoryStore,
{
    fn get_forecast_requirements(
        &self,
        doi_goal: DoiGoal,
        safety_buffer: SafetyBufferRatio,
    ) -> Result<Vec<ForecastRecord>, StoreError> {
        let inventory = self.inventory.get_inventory()?;
        let demand = self.demand.read().map_err(|_| StoreError::poisoned())?;
        Ok(RequirementsPlanner::new(doi_goal, safety_buffer).plan_all(&inventory, &demand))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::InMemoryInventoryStore;
    use packflow_inventory::{InventoryItem, SkuName};

    #[test]
    fn plans_against_current_inventory() {
        let sku = SkuName::new("8oz-bottle").unwrap();
        let inventory = Arc::new(InMemoryInventoryStore::with_items([InventoryItem::new(
            sku.clone(),
            "Acme Glass",
            500,
        )
        .unwrap()
        .with_warehouse_quantity(1_000)]));
        let source = PlannedForecastSource::new(
            inventory.clone(),
            vec![ProductDemand {
                product: "cold brew".to_string(),
                sku: sku.clone(),
                daily_sales_rate: 25.0,
            }],
        );

        let records = source
            .get_forecast_requirements(DoiGoal::Days60, SafetyBufferRatio::default())
            .unwrap();
        // 25 * 60 = 1500 needed, 500 short -> one pallet.
        assert_eq!(records[0].recommended_order_qty, 500.0);

        source.replace_demand(vec![]).unwrap();
        let records = source
            .get_forecast_requirements(DoiGoal::Days60, SafetyBufferRatio::default())
            .unwrap();
        assert_eq!(records[0].recommended_order_qty, 0.0);
    }
}

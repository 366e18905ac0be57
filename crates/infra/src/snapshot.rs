//! File-backed inventory + demand snapshot used to seed the in-memory stores.
//!
//! ```json
//! {
//!   "inventory": [
//!     { "name": "8oz-bottle", "supplier": "Acme Glass", "units_per_pallet": 500,
//!       "max_warehouse_capacity": 10000, "warehouse_quantity": 2000 }
//!   ],
//!   "demand": [
//!     { "product": "cold brew", "sku": "8oz-bottle", "daily_sales_rate": 40.0 }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use packflow_forecasting::ProductDemand;
use packflow_inventory::InventoryItem;

use crate::store::{InMemoryInventoryStore, InMemoryOrderStore, PlannedForecastSource};
use crate::replenishment::ReplenishmentService;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub demand: Vec<ProductDemand>,
}

/// Service wired to in-memory stores.
pub type InMemoryService = ReplenishmentService<
    Arc<InMemoryInventoryStore>,
    PlannedForecastSource<Arc<InMemoryInventoryStore>>,
    InMemoryOrderStore,
>;

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Seed in-memory stores and wire a service over them.
    pub fn into_service(self) -> InMemoryService {
        let inventory = Arc::new(InMemoryInventoryStore::with_items(self.inventory));
        let forecast = PlannedForecastSource::new(inventory.clone(), self.demand);
        ReplenishmentService::new(inventory, forecast, InMemoryOrderStore::new())
    }
}

//! Infrastructure layer: collaborator stores, inventory write-back, service
//! orchestration and configuration.

pub mod config;
pub mod error;
pub mod inventory_sync;
pub mod replenishment;
pub mod snapshot;
pub mod store;

pub use config::EngineConfig;
pub use error::{ServiceError, ServiceResult};
pub use inventory_sync::{InventorySync, InventoryWrite};
pub use replenishment::{ReceiptOutcome, ReplenishmentService};
pub use snapshot::{InMemoryService, Snapshot, SnapshotError};
pub use store::{
    ForecastSource, InMemoryInventoryStore, InMemoryOrderStore, InventoryStore, InventoryUpdate,
    LineUpdate, OrderStore, PlannedForecastSource, StoreError,
};

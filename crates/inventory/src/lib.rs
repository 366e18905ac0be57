//! Inventory domain module.
//!
//! Packaging SKUs, their pallet/case math and warehouse capacity, implemented
//! purely as deterministic domain logic (no IO, no storage).

pub mod capacity;
pub mod item;
pub mod pallet;
pub mod sku;

pub use capacity::CapacityUsage;
pub use item::{
    EditCounts, InventoryCommand, InventoryEvent, InventoryItem, InventoryItemRecord,
    ReceiveStock, StockReceived, SupplierCountUpdated, WarehouseCountOverridden,
};
pub use sku::SkuName;

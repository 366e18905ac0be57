//! Collaborator seams: inventory, forecast and order stores.
//!
//! The engine only talks to these traits. In-memory implementations back tests,
//! dev and the CLI; a real deployment plugs in its own.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use packflow_forecasting::{DoiGoal, ForecastRecord, SafetyBufferRatio};
use packflow_inventory::{InventoryItem, SkuName};
use packflow_purchasing::{LineStatus, OrderLineId, OrderSnapshot, PurchaseOrderId};

mod forecast;
mod in_memory;

pub use forecast::PlannedForecastSource;
pub use in_memory::{InMemoryInventoryStore, InMemoryOrderStore};

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

/// Partial counter write for one SKU; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_quantity: Option<i64>,
}

impl InventoryUpdate {
    pub fn warehouse(quantity: i64) -> Self {
        Self {
            warehouse_quantity: Some(quantity),
            supplier_quantity: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warehouse_quantity.is_none() && self.supplier_quantity.is_none()
    }
}

/// Write for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdate {
    pub status: LineStatus,
    pub quantity_received: i64,
    pub actual_delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<bool>,
}

/// Inventory collaborator. Items are keyed by [`SkuName`].
pub trait InventoryStore: Send + Sync {
    /// Every item, in the store's stable listing order.
    fn get_inventory(&self) -> Result<Vec<InventoryItem>, StoreError>;
    fn get_item(&self, sku: &SkuName) -> Result<Option<InventoryItem>, StoreError>;
    fn update_inventory(&self, sku: &SkuName, update: InventoryUpdate) -> Result<(), StoreError>;
}

/// Forecast collaborator.
pub trait ForecastSource: Send + Sync {
    fn get_forecast_requirements(
        &self,
        doi_goal: DoiGoal,
        safety_buffer: SafetyBufferRatio,
    ) -> Result<Vec<ForecastRecord>, StoreError>;
}

/// Order collaborator.
pub trait OrderStore: Send + Sync {
    fn create_order(&self, order: OrderSnapshot) -> Result<(), StoreError>;
    fn get_order(&self, order_id: PurchaseOrderId) -> Result<OrderSnapshot, StoreError>;
    fn update_order(
        &self,
        order_id: PurchaseOrderId,
        line_id: OrderLineId,
        update: LineUpdate,
    ) -> Result<(), StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn get_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        (**self).get_inventory()
    }

    fn get_item(&self, sku: &SkuName) -> Result<Option<InventoryItem>, StoreError> {
        (**self).get_item(sku)
    }

    fn update_inventory(&self, sku: &SkuName, update: InventoryUpdate) -> Result<(), StoreError> {
        (**self).update_inventory(sku, update)
    }
}

impl<S> ForecastSource for Arc<S>
where
    S: ForecastSource + ?Sized,
{
    fn get_forecast_requirements(
        &self,
        doi_goal: DoiGoal,
        safety_buffer: SafetyBufferRatio,
    ) -> Result<Vec<ForecastRecord>, StoreError> {
        (**self).get_forecast_requirements(doi_goal, safety_buffer)
    }
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn create_order(&self, order: OrderSnapshot) -> Result<(), StoreError> {
        (**self).create_order(order)
    }

    fn get_order(&self, order_id: PurchaseOrderId) -> Result<OrderSnapshot, StoreError> {
        (**self).get_order(order_id)
    }

    fn update_order(
        &self,
        order_id: PurchaseOrderId,
        line_id: OrderLineId,
        update: LineUpdate,
    ) -> Result<(), StoreError> {
        (**self).update_order(order_id, line_id, update)
    }
}

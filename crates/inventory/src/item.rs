use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use packflow_core::{Aggregate, AggregateRoot, DomainError};
use packflow_events::Event;

use crate::capacity::{self, CapacityUsage};
use crate::pallet;
use crate::sku::SkuName;

/// Wire/storage shape of an inventory record, validated into [`InventoryItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemRecord {
    pub name: String,
    #[serde(default)]
    pub supplier: String,
    pub units_per_pallet: i64,
    #[serde(default)]
    pub max_warehouse_capacity: i64,
    #[serde(default)]
    pub warehouse_quantity: i64,
    #[serde(default)]
    pub supplier_quantity: i64,
}

/// Aggregate root: InventoryItem (one packaging SKU).
///
/// Records are created by the inventory store; this aggregate only decides the
/// two write-backs this engine owns (receipts and confirmed manual edits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InventoryItemRecord", into = "InventoryItemRecord")]
pub struct InventoryItem {
    sku: SkuName,
    supplier: String,
    units_per_pallet: i64,
    max_warehouse_capacity: i64,
    warehouse_quantity: i64,
    supplier_quantity: i64,
    version: u64,
}

impl InventoryItem {
    /// New record with empty counts and unbounded capacity.
    pub fn new(
        sku: SkuName,
        supplier: impl Into<String>,
        units_per_pallet: i64,
    ) -> Result<Self, DomainError> {
        if units_per_pallet < 1 {
            return Err(DomainError::validation(format!(
                "{sku}: units_per_pallet must be at least 1"
            )));
        }
        Ok(Self {
            sku,
            supplier: supplier.into(),
            units_per_pallet,
            max_warehouse_capacity: 0,
            warehouse_quantity: 0,
            supplier_quantity: 0,
            version: 0,
        })
    }

    /// Set the warehouse ceiling (0 = unlimited; negative clamps to 0).
    pub fn with_max_capacity(mut self, max_warehouse_capacity: i64) -> Self {
        self.max_warehouse_capacity = max_warehouse_capacity.max(0);
        self
    }

    pub fn with_warehouse_quantity(mut self, warehouse_quantity: i64) -> Self {
        self.warehouse_quantity = warehouse_quantity.max(0);
        self
    }

    pub fn with_supplier_quantity(mut self, supplier_quantity: i64) -> Self {
        self.supplier_quantity = supplier_quantity.max(0);
        self
    }

    pub fn sku(&self) -> &SkuName {
        &self.sku
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn units_per_pallet(&self) -> i64 {
        self.units_per_pallet
    }

    pub fn max_warehouse_capacity(&self) -> i64 {
        self.max_warehouse_capacity
    }

    pub fn warehouse_quantity(&self) -> i64 {
        self.warehouse_quantity
    }

    pub fn supplier_quantity(&self) -> i64 {
        self.supplier_quantity
    }

    pub fn is_capacity_bounded(&self) -> bool {
        self.max_warehouse_capacity > 0
    }

    /// Units that can still be ordered before the warehouse is full.
    pub fn headroom(&self) -> Option<i64> {
        capacity::headroom(self.warehouse_quantity, self.max_warehouse_capacity)
    }

    pub fn usage_after(&self, qty: i64) -> CapacityUsage {
        CapacityUsage::after_order(self.warehouse_quantity, qty, self.max_warehouse_capacity)
    }

    pub fn pallets_for(&self, qty: i64) -> i64 {
        pallet::pallets(qty, self.units_per_pallet)
    }
}

impl TryFrom<InventoryItemRecord> for InventoryItem {
    type Error = DomainError;

    fn try_from(r: InventoryItemRecord) -> Result<Self, Self::Error> {
        let sku = SkuName::new(&r.name)?;
        for (field, value) in [
            ("max_warehouse_capacity", r.max_warehouse_capacity),
            ("warehouse_quantity", r.warehouse_quantity),
            ("supplier_quantity", r.supplier_quantity),
        ] {
            if value < 0 {
                return Err(DomainError::validation(format!(
                    "{sku}: {field} cannot be negative"
                )));
            }
        }
        Ok(Self::new(sku, r.supplier, r.units_per_pallet)?
            .with_max_capacity(r.max_warehouse_capacity)
            .with_warehouse_quantity(r.warehouse_quantity)
            .with_supplier_quantity(r.supplier_quantity))
    }
}

impl From<InventoryItem> for InventoryItemRecord {
    fn from(item: InventoryItem) -> Self {
        Self {
            name: item.sku.into(),
            supplier: item.supplier,
            units_per_pallet: item.units_per_pallet,
            max_warehouse_capacity: item.max_warehouse_capacity,
            warehouse_quantity: item.warehouse_quantity,
            supplier_quantity: item.supplier_quantity,
        }
    }
}

impl AggregateRoot for InventoryItem {
    type Id = SkuName;

    fn id(&self) -> &Self::Id {
        &self.sku
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ReceiveStock (goods from a purchase-order receipt pass).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub sku: SkuName,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditCounts (manual correction of warehouse and/or supplier counts).
///
/// A changed warehouse count needs `overwrite_confirmed`; supplier counts are
/// informational and never need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCounts {
    pub sku: SkuName,
    pub warehouse_quantity: Option<i64>,
    pub supplier_quantity: Option<i64>,
    pub overwrite_confirmed: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    ReceiveStock(ReceiveStock),
    EditCounts(EditCounts),
}

/// Event: StockReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReceived {
    pub sku: SkuName,
    pub quantity: i64,
    pub warehouse_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WarehouseCountOverridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseCountOverridden {
    pub sku: SkuName,
    pub previous: i64,
    pub warehouse_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SupplierCountUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierCountUpdated {
    pub sku: SkuName,
    pub previous: i64,
    pub supplier_quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    StockReceived(StockReceived),
    WarehouseCountOverridden(WarehouseCountOverridden),
    SupplierCountUpdated(SupplierCountUpdated),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::StockReceived(_) => "inventory.item.stock_received",
            InventoryEvent::WarehouseCountOverridden(_) => "inventory.item.warehouse_overridden",
            InventoryEvent::SupplierCountUpdated(_) => "inventory.item.supplier_updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::StockReceived(e) => e.occurred_at,
            InventoryEvent::WarehouseCountOverridden(e) => e.occurred_at,
            InventoryEvent::SupplierCountUpdated(e) => e.occurred_at,
        }
    }

    fn subject(&self) -> String {
        match self {
            InventoryEvent::StockReceived(e) => e.sku.to_string(),
            InventoryEvent::WarehouseCountOverridden(e) => e.sku.to_string(),
            InventoryEvent::SupplierCountUpdated(e) => e.sku.to_string(),
        }
    }
}

impl Aggregate for InventoryItem {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::StockReceived(e) => {
                self.warehouse_quantity = e.warehouse_quantity;
            }
            InventoryEvent::WarehouseCountOverridden(e) => {
                self.warehouse_quantity = e.warehouse_quantity;
            }
            InventoryEvent::SupplierCountUpdated(e) => {
                self.supplier_quantity = e.supplier_quantity;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::ReceiveStock(cmd) => self.handle_receive(cmd),
            InventoryCommand::EditCounts(cmd) => self.handle_edit(cmd),
        }
    }
}

impl InventoryItem {
    fn ensure_sku(&self, sku: &SkuName) -> Result<(), DomainError> {
        if &self.sku != sku {
            return Err(DomainError::invariant(format!(
                "sku mismatch (expected {}, got {sku})",
                self.sku
            )));
        }
        Ok(())
    }

    fn handle_receive(&self, cmd: &ReceiveStock) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_sku(&cmd.sku)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "{}: received quantity must be positive",
                cmd.sku
            )));
        }

        let warehouse_quantity = self
            .warehouse_quantity
            .checked_add(cmd.quantity)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "{}: receiving {} overflows the warehouse count",
                    cmd.sku, cmd.quantity
                ))
            })?;

        Ok(vec![InventoryEvent::StockReceived(StockReceived {
            sku: cmd.sku.clone(),
            quantity: cmd.quantity,
            warehouse_quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditCounts) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_sku(&cmd.sku)?;

        if cmd.warehouse_quantity.is_some_and(|q| q < 0)
            || cmd.supplier_quantity.is_some_and(|q| q < 0)
        {
            return Err(DomainError::validation(format!(
                "{}: inventory counts cannot be negative",
                cmd.sku
            )));
        }

        let warehouse = cmd
            .warehouse_quantity
            .filter(|q| *q != self.warehouse_quantity);
        let supplier = cmd
            .supplier_quantity
            .filter(|q| *q != self.supplier_quantity);

        if let Some(q) = warehouse {
            if !cmd.overwrite_confirmed {
                return Err(DomainError::confirmation_required(vec![format!(
                    "{}: this overwrites current warehouse inventory ({} -> {q})",
                    cmd.sku, self.warehouse_quantity
                )]));
            }
        }

        let mut events = Vec::new();
        if let Some(q) = warehouse {
            events.push(InventoryEvent::WarehouseCountOverridden(
                WarehouseCountOverridden {
                    sku: cmd.sku.clone(),
                    previous: self.warehouse_quantity,
                    warehouse_quantity: q,
                    occurred_at: cmd.occurred_at,
                },
            ));
        }
        if let Some(q) = supplier {
            events.push(InventoryEvent::SupplierCountUpdated(SupplierCountUpdated {
                sku: cmd.sku.clone(),
                previous: self.supplier_quantity,
                supplier_quantity: q,
                occurred_at: cmd.occurred_at,
            }));
        }
        Ok(events)
    }
}

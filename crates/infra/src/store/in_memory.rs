use std::collections::HashMap;
use std::sync::RwLock;

use packflow_inventory::{InventoryItem, SkuName};
use packflow_purchasing::{OrderLineId, OrderSnapshot, PurchaseOrderId};

use super::{InventoryStore, InventoryUpdate, LineUpdate, OrderStore, StoreError};

#[derive(Debug, Default)]
struct InventoryTable {
    items: Vec<InventoryItem>,
    index: HashMap<SkuName, usize>,
}

/// In-memory inventory store for tests/dev. Lists items in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<InventoryTable>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let store = Self::new();
        if let Ok(mut table) = store.inner.write() {
            for item in items {
                upsert(&mut table, item);
            }
        }
        store
    }

    /// Insert or replace the item for its SKU.
    pub fn upsert(&self, item: InventoryItem) -> Result<(), StoreError> {
        let mut table = self.inner.write().map_err(|_| StoreError::poisoned())?;
        upsert(&mut table, item);
        Ok(())
    }
}

fn upsert(table: &mut InventoryTable, item: InventoryItem) {
    match table.index.get(item.sku()) {
        Some(&idx) => table.items[idx] = item,
        None => {
            table.index.insert(item.sku().clone(), table.items.len());
            table.items.push(item);
        }
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn get_inventory(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let table = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(table.items.clone())
    }

    fn get_item(&self, sku: &SkuName) -> Result<Option<InventoryItem>, StoreError> {
        let table = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(table.index.get(sku).map(|&idx| table.items[idx].clone()))
    }

    fn update_inventory(&self, sku: &SkuName, update: InventoryUpdate) -> Result<(), StoreError> {
        let mut table = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let idx = *table
            .index
            .get(sku)
            .ok_or_else(|| StoreError::NotFound(format!("inventory item {sku}")))?;

        let mut item = table.items[idx].clone();
        if let Some(q) = update.warehouse_quantity {
            item = item.with_warehouse_quantity(q);
        }
        if let Some(q) = update.supplier_quantity {
            item = item.with_supplier_quantity(q);
        }
        table.items[idx] = item;
        Ok(())
    }
}

/// In-memory order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<PurchaseOrderId, OrderSnapshot>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

}

impl OrderStore for InMemoryOrderStore {
    fn create_order(&self, order: OrderSnapshot) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        if map.contains_key(&order.order_id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.order_id)));
        }
        map.insert(order.order_id, order);
        Ok(())
    }

    fn get_order(&self, order_id: PurchaseOrderId) -> Result<OrderSnapshot, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        map.get(&order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))
    }

    fn update_order(
        &self,
        order_id: PurchaseOrderId,
        line_id: OrderLineId,
        update: LineUpdate,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let order = map
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;
        let line = order
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| StoreError::NotFound(format!("order line {line_id}")))?;

        line.status = update.status;
        line.received_qty = update.quantity_received;
        line.actual_delivery_date = update.actual_delivery_date;
        if let Some(qty) = update.qty {
            line.qty = qty;
            line.pallets = packflow_inventory::pallet::pallets(qty, line.units_per_pallet);
        }
        if let Some(edited) = update.edited {
            line.edited = edited;
        }
        Ok(())
    }
}

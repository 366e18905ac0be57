//! Write-back of warehouse/supplier counters.
//!
//! The only writer of `InventoryItem` counts. Decisions go through the item
//! aggregate; the resulting counts are written to the inventory store keyed by SKU.
//! Every SKU of an operation is resolved before the first write.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use packflow_core::{Aggregate, DomainError};
use packflow_events::Event;
use packflow_inventory::{
    EditCounts, InventoryCommand, InventoryEvent, InventoryItem, ReceiveStock, SkuName,
};
use packflow_purchasing::LineReceived;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{InventoryStore, InventoryUpdate};

/// One pending counter write and the events that justify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryWrite {
    pub sku: SkuName,
    pub update: InventoryUpdate,
    pub events: Vec<InventoryEvent>,
}

#[derive(Debug)]
pub struct InventorySync<I> {
    inventory: I,
}

impl<I> InventorySync<I> {
    pub fn new(inventory: I) -> Self {
        Self { inventory }
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }
}

impl<I> InventorySync<I>
where
    I: InventoryStore,
{
    /// Manual correction of one SKU's counts.
    ///
    /// A changed warehouse count needs `overwrite_confirmed`; otherwise the edit is
    /// rejected with `ConfirmationRequired` and nothing is written. An edit that
    /// changes nothing writes nothing.
    pub fn apply_manual_edit(&self, cmd: EditCounts) -> ServiceResult<Vec<InventoryEvent>> {
        let item = self.resolve(&cmd.sku)?;
        let sku = cmd.sku.clone();
        let events = item.handle(&InventoryCommand::EditCounts(cmd))?;

        if events.is_empty() {
            debug!(sku = %sku, "inventory edit changes nothing");
            return Ok(events);
        }

        for event in &events {
            debug!(event_type = event.event_type(), subject = %event.subject(), "inventory event");
        }
        let update = update_from(&events);
        self.inventory.update_inventory(&sku, update)?;
        info!(
            sku = %sku,
            warehouse_quantity = ?update.warehouse_quantity,
            supplier_quantity = ?update.supplier_quantity,
            "inventory counts edited"
        );
        Ok(events)
    }

    /// Plan warehouse credits for received lines: one write per SKU, in
    /// first-received order. Fails with `Unresolved` if any SKU is unknown.
    pub fn plan_receipt(
        &self,
        received: &[LineReceived],
        occurred_at: DateTime<Utc>,
    ) -> ServiceResult<Vec<InventoryWrite>> {
        let mut totals: Vec<(SkuName, i64)> = Vec::new();
        for line in received {
            match totals.iter_mut().find(|(sku, _)| sku == &line.sku) {
                Some((_, qty)) => *qty += line.qty,
                None => totals.push((line.sku.clone(), line.qty)),
            }
        }

        let items = totals
            .iter()
            .map(|(sku, _)| self.resolve(sku))
            .collect::<ServiceResult<Vec<InventoryItem>>>()?;

        let mut writes = Vec::with_capacity(totals.len());
        for (mut item, (sku, quantity)) in items.into_iter().zip(totals) {
            let events = item.execute(&InventoryCommand::ReceiveStock(ReceiveStock {
                sku: sku.clone(),
                quantity,
                occurred_at,
            }))?;
            debug!(
                sku = %sku,
                quantity,
                warehouse_quantity = item.warehouse_quantity(),
                "warehouse credit planned"
            );
            writes.push(InventoryWrite {
                update: InventoryUpdate::warehouse(item.warehouse_quantity()),
                sku,
                events,
            });
        }
        Ok(writes)
    }

    /// Credit received lines to warehouse stock.
    pub fn apply_receipt(
        &self,
        received: &[LineReceived],
        occurred_at: DateTime<Utc>,
    ) -> ServiceResult<Vec<InventoryEvent>> {
        let writes = self.plan_receipt(received, occurred_at)?;
        self.write_all(&writes, 0, writes.len())?;
        Ok(writes.into_iter().flat_map(|w| w.events).collect())
    }

    /// Issue planned writes in order. `landed` writes of the enclosing operation
    /// (out of `planned`) have already been committed.
    pub(crate) fn write_all(
        &self,
        writes: &[InventoryWrite],
        landed: usize,
        planned: usize,
    ) -> ServiceResult<()> {
        for (i, write) in writes.iter().enumerate() {
            self.inventory
                .update_inventory(&write.sku, write.update)
                .map_err(|e| ServiceError::write_failed(landed + i, planned, e))?;
        }
        if !writes.is_empty() {
            info!(skus = writes.len(), "warehouse stock credited");
        }
        Ok(())
    }

    fn resolve(&self, sku: &SkuName) -> ServiceResult<InventoryItem> {
        self.inventory
            .get_item(sku)?
            .ok_or_else(|| DomainError::unresolved(sku.as_str()).into())
    }
}

fn update_from(events: &[InventoryEvent]) -> InventoryUpdate {
    let mut update = InventoryUpdate::default();
    for event in events {
        match event {
            InventoryEvent::StockReceived(e) => {
                update.warehouse_quantity = Some(e.warehouse_quantity)
            }
            InventoryEvent::WarehouseCountOverridden(e) => {
                update.warehouse_quantity = Some(e.warehouse_quantity)
            }
            InventoryEvent::SupplierCountUpdated(e) => {
                update.supplier_quantity = Some(e.supplier_quantity)
            }
        }
    }
    update
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::store::InMemoryInventoryStore;
    use packflow_core::EntityId;
    use packflow_purchasing::{LineStatus, OrderLineId, PurchaseOrderId};

    fn sku(name: &str) -> SkuName {
        SkuName::new(name).unwrap()
    }

    fn store() -> Arc<InMemoryInventoryStore> {
        Arc::new(InMemoryInventoryStore::with_items([
            InventoryItem::new(sku("8oz-bottle"), "Acme Glass", 500)
                .unwrap()
                .with_warehouse_quantity(2_000)
                .with_supplier_quantity(40_000),
            InventoryItem::new(sku("16oz-bottle"), "Acme Glass", 250)
                .unwrap()
                .with_warehouse_quantity(100),
        ]))
    }

    fn received(name: &str, qty: i64) -> LineReceived {
        LineReceived {
            order_id: PurchaseOrderId::new(packflow_core::AggregateId::new()),
            line_id: OrderLineId::new(EntityId::new()),
            sku: sku(name),
            qty,
            received_qty: qty,
            status: LineStatus::Received,
            delivered_on: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            occurred_at: Utc::now(),
        }
    }

    fn edit(warehouse: Option<i64>, supplier: Option<i64>, confirmed: bool) -> EditCounts {
        EditCounts {
            sku: sku("8oz-bottle"),
            warehouse_quantity: warehouse,
            supplier_quantity: supplier,
            overwrite_confirmed: confirmed,
            occurred_at: Utc::now(),
        }
    }

    fn warehouse(store: &InMemoryInventoryStore, name: &str) -> i64 {
        store.get_item(&sku(name)).unwrap().unwrap().warehouse_quantity()
    }

    #[test]
    fn receipt_credits_each_sku_once() {
        let store = store();
        let sync = InventorySync::new(store.clone());

        let events = sync
            .apply_receipt(
                &[
                    received("8oz-bottle", 600),
                    received("16oz-bottle", 50),
                    received("8oz-bottle", 400),
                ],
                Utc::now(),
            )
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(warehouse(&store, "8oz-bottle"), 3_000);
        assert_eq!(warehouse(&store, "16oz-bottle"), 150);
    }

    #[test]
    fn unresolved_sku_writes_nothing() {
        let store = store();
        let sync = InventorySync::new(store.clone());

        let err = sync
            .apply_receipt(&[received("8oz-bottle", 600), received("lid", 5)], Utc::now())
            .unwrap_err();

        match err {
            ServiceError::Domain(DomainError::Unresolved(name)) => assert_eq!(name, "lid"),
            other => panic!("expected unresolved sku, got {other:?}"),
        }
        assert_eq!(warehouse(&store, "8oz-bottle"), 2_000);
    }

    #[test]
    fn warehouse_overwrite_needs_confirmation() {
        let store = store();
        let sync = InventorySync::new(store.clone());

        let err = sync.apply_manual_edit(edit(Some(1_500), None, false)).unwrap_err();
        assert!(err.is_confirmation_required());
        assert_eq!(warehouse(&store, "8oz-bottle"), 2_000);

        sync.apply_manual_edit(edit(Some(1_500), None, true)).unwrap();
        assert_eq!(warehouse(&store, "8oz-bottle"), 1_500);
    }

    #[test]
    fn supplier_edit_needs_no_confirmation() {
        let store = store();
        let sync = InventorySync::new(store.clone());

        let events = sync.apply_manual_edit(edit(Some(2_000), Some(35_000), false)).unwrap();

        assert_eq!(events.len(), 1);
        let item = store.get_item(&sku("8oz-bottle")).unwrap().unwrap();
        assert_eq!(item.supplier_quantity(), 35_000);
        assert_eq!(item.warehouse_quantity(), 2_000);
    }

    #[test]
    fn negative_and_unknown_edits_are_rejected() {
        let sync = InventorySync::new(store());

        let err = sync.apply_manual_edit(edit(None, Some(-1), true)).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        let mut unknown = edit(Some(1), None, true);
        unknown.sku = sku("ghost");
        let err = sync.apply_manual_edit(unknown).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Unresolved(_))));
    }
}

//! Replenishment service: recommendation -> draft -> order -> receipt.
//!
//! Each operation loads state from the collaborator stores, lets the domain
//! aggregate decide, then issues the resulting writes one at a time:
//!
//! ```text
//! load snapshot -> rehydrate -> handle (reject = nothing written)
//!   -> resolve every SKU -> write order lines -> write inventory counters
//! ```
//!
//! There is no cross-write atomicity. If a write fails after earlier ones landed,
//! the caller gets [`ServiceError::PartialCommit`] with the count that landed.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use packflow_core::{Aggregate, AggregateId, DomainError};
use packflow_events::Event;
use packflow_forecasting::RecommendationSet;
use packflow_inventory::{EditCounts, InventoryEvent};
use packflow_purchasing::{
    Archive, DraftLine, EditLineQuantity, GroupStatus, LineReceived, OrderDraft, OrderLineId,
    OrderSnapshot, PurchaseOrder, PurchaseOrderCommand, PurchaseOrderEvent, PurchaseOrderId,
    ReceiptPass, ReceiveGoods,
};

use crate::config::EngineConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::inventory_sync::InventorySync;
use crate::store::{ForecastSource, InventoryStore, LineUpdate, OrderStore};

/// Result of a committed receipt pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptOutcome {
    pub order: OrderSnapshot,
    pub group_status: GroupStatus,
    pub line_events: Vec<PurchaseOrderEvent>,
    pub inventory_events: Vec<InventoryEvent>,
}

#[derive(Debug)]
pub struct ReplenishmentService<I, F, O> {
    sync: InventorySync<I>,
    forecast: F,
    orders: O,
    config: EngineConfig,
}

impl<I, F, O> ReplenishmentService<I, F, O> {
    pub fn new(inventory: I, forecast: F, orders: O) -> Self {
        Self {
            sync: InventorySync::new(inventory),
            forecast,
            orders,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }
}

impl<I, F, O> ReplenishmentService<I, F, O>
where
    I: InventoryStore,
    F: ForecastSource,
    O: OrderStore,
{
    /// Ranked recommendations for the configured DOI goal and safety buffer.
    pub fn recommend(&self) -> ServiceResult<RecommendationSet> {
        let inventory = self.sync.inventory().get_inventory()?;
        let forecast = self
            .forecast
            .get_forecast_requirements(self.config.doi_goal, self.config.safety_buffer)?;

        let set = self.config.recommender().recommend(&inventory, &forecast);
        info!(
            skus = set.recommendations.len(),
            doi_goal = self.config.doi_goal.days(),
            safety_buffer = self.config.safety_buffer.value(),
            "recommendations computed"
        );
        Ok(set)
    }

    /// Default draft for one supplier: one line per SKU in rank order, with every
    /// positive recommendation already added.
    pub fn draft_for_supplier(&self, supplier: &str) -> ServiceResult<OrderDraft> {
        let set = self.recommend()?;
        let inventory = self.sync.inventory().get_inventory()?;

        let mut draft = OrderDraft::new(supplier);
        for rec in set.for_supplier(supplier) {
            let Some(item) = inventory.iter().find(|i| i.sku() == &rec.sku) else {
                continue;
            };
            let (mut line, mut clamp) = DraftLine::new(item, rec.recommended_order_qty);
            if rec.recommended_order_qty > 0 {
                clamp = line.set_added(true).or(clamp);
            }
            if let Some(clamp) = clamp {
                warn!(%clamp, "draft quantity clamped");
            }
            draft.push(line);
        }

        if draft.lines().is_empty() {
            let err = DomainError::validation(format!("no inventory items supplied by {supplier}"));
            return Err(err.into());
        }
        debug!(supplier, lines = draft.lines().len(), "draft built");
        Ok(draft)
    }

    /// Validate the draft and persist it as a new submitted order.
    #[instrument(skip_all, fields(supplier = draft.supplier(), order_number = %order_number))]
    pub fn submit(
        &self,
        draft: &OrderDraft,
        order_number: &str,
        order_date: NaiveDate,
    ) -> ServiceResult<OrderSnapshot> {
        let order_id = PurchaseOrderId::new(AggregateId::new());
        let cmd = draft.submit(order_id, order_number, order_date, Utc::now())?;

        let mut order = PurchaseOrder::empty(order_id);
        order.execute(&PurchaseOrderCommand::CreatePurchaseOrder(cmd))?;
        let snapshot = order
            .snapshot()
            .ok_or_else(|| DomainError::invariant("created order has no snapshot"))?;

        self.orders.create_order(snapshot.clone())?;
        info!(order_id = %order_id, lines = snapshot.lines.len(), "purchase order submitted");
        Ok(snapshot)
    }

    pub fn get_order(&self, order_id: PurchaseOrderId) -> ServiceResult<PurchaseOrder> {
        Ok(PurchaseOrder::from_snapshot(self.orders.get_order(order_id)?))
    }

    /// Open a receipt pass proposing every open line at its outstanding quantity.
    pub fn open_receipt(&self, order_id: PurchaseOrderId) -> ServiceResult<ReceiptPass> {
        let order = self.get_order(order_id)?;
        Ok(ReceiptPass::open(&order))
    }

    /// Commit a receipt pass: order lines first, then warehouse counters.
    ///
    /// Rejections (validation, unconfirmed warnings, unresolved SKUs) happen
    /// before any write.
    #[instrument(skip_all, fields(order_id = %cmd.order_id, lines = cmd.lines.len()))]
    pub fn receive(&self, cmd: ReceiveGoods) -> ServiceResult<ReceiptOutcome> {
        let mut order = self.get_order(cmd.order_id)?;
        let command = PurchaseOrderCommand::ReceiveGoods(cmd);
        let line_events = order.handle(&command)?;

        let received: Vec<LineReceived> = line_events
            .iter()
            .filter_map(|e| match e {
                PurchaseOrderEvent::LineReceived(r) => Some(r.clone()),
                _ => None,
            })
            .collect();
        let inventory_writes = self.sync.plan_receipt(&received, Utc::now())?;

        for event in &line_events {
            debug!(
                event_type = event.event_type(),
                subject = %event.subject(),
                "applying order event"
            );
            order.apply(event);
        }

        let line_writes = line_updates(&order, &line_events, None);
        let planned = line_writes.len() + inventory_writes.len();
        self.write_lines(order.order_id(), &line_writes, planned)?;
        self.sync.write_all(&inventory_writes, line_writes.len(), planned)?;

        let snapshot = order
            .snapshot()
            .ok_or_else(|| DomainError::invariant("received order has no snapshot"))?;
        let group_status = snapshot.group_status();
        info!(
            received = received.len(),
            writes = planned,
            group_status = ?group_status,
            "receipt pass committed"
        );

        Ok(ReceiptOutcome {
            order: snapshot,
            group_status,
            line_events,
            inventory_events: inventory_writes.into_iter().flat_map(|w| w.events).collect(),
        })
    }

    /// Manual correction of a line's quantity outside the receipt flow.
    #[instrument(skip_all, fields(order_id = %cmd.order_id, line_id = %cmd.line_id))]
    pub fn edit_line_quantity(&self, cmd: EditLineQuantity) -> ServiceResult<OrderSnapshot> {
        let mut order = self.get_order(cmd.order_id)?;
        let events = order.execute(&PurchaseOrderCommand::EditLineQuantity(cmd))?;

        let writes = line_updates(&order, &events, Some(true));
        self.write_lines(order.order_id(), &writes, writes.len())?;
        if !events.is_empty() {
            info!("order line quantity edited");
        }

        order
            .snapshot()
            .ok_or_else(|| DomainError::invariant("edited order has no snapshot").into())
    }

    /// Archive an order whose lines are all received.
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub fn archive(&self, order_id: PurchaseOrderId) -> ServiceResult<OrderSnapshot> {
        let mut order = self.get_order(order_id)?;
        let events = order.execute(&PurchaseOrderCommand::Archive(Archive {
            order_id,
            occurred_at: Utc::now(),
        }))?;

        let writes = line_updates(&order, &events, None);
        self.write_lines(order_id, &writes, writes.len())?;
        info!(lines = writes.len(), "purchase order archived");

        order
            .snapshot()
            .ok_or_else(|| DomainError::invariant("archived order has no snapshot").into())
    }

    /// Manual inventory count correction.
    pub fn edit_inventory(&self, cmd: EditCounts) -> ServiceResult<Vec<InventoryEvent>> {
        self.sync.apply_manual_edit(cmd)
    }

    fn write_lines(
        &self,
        order_id: PurchaseOrderId,
        writes: &[(OrderLineId, LineUpdate)],
        planned: usize,
    ) -> ServiceResult<()> {
        for (i, (line_id, update)) in writes.iter().enumerate() {
            debug!(
                line_id = %line_id,
                status = %update.status,
                received = update.quantity_received,
                "writing order line"
            );
            self.orders
                .update_order(order_id, *line_id, *update)
                .map_err(|e| ServiceError::write_failed(i, planned, e))?;
        }
        Ok(())
    }
}

/// One write per touched line, in event order, from the post-event line state.
fn line_updates(
    order: &PurchaseOrder,
    events: &[PurchaseOrderEvent],
    edited: Option<bool>,
) -> Vec<(OrderLineId, LineUpdate)> {
    let mut writes: Vec<(OrderLineId, LineUpdate)> = Vec::new();
    for line_id in events.iter().filter_map(PurchaseOrderEvent::line_id) {
        if writes.iter().any(|(id, _)| *id == line_id) {
            continue;
        }
        let Some(line) = order.line(line_id) else {
            continue;
        };
        writes.push((
            line_id,
            LineUpdate {
                status: line.status,
                quantity_received: line.received_qty,
                actual_delivery_date: line.actual_delivery_date,
                qty: Some(line.qty),
                edited,
            },
        ));
    }
    writes
}

//! End-to-end flows through the replenishment service and in-memory stores.
//!
//! Verifies:
//! - Multi-pass receipts roll up and unlock archival
//! - Rejected passes write nothing (order lines or inventory)
//! - A failing order store surfaces the partial-commit gap

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, Utc};

use packflow_core::{AggregateId, DomainError};
use packflow_forecasting::ProductDemand;
use packflow_infra::{
    InMemoryInventoryStore, InMemoryOrderStore, InventoryStore, LineUpdate, OrderStore,
    PlannedForecastSource, ReplenishmentService, ServiceError, StoreError,
};
use packflow_inventory::{EditCounts, InventoryItem, SkuName};
use packflow_purchasing::{
    DraftLine, EditLineQuantity, GroupStatus, LineStatus, OrderDraft, OrderLine, OrderLineId,
    OrderSnapshot, PurchaseOrderId,
};

type Service<O> = ReplenishmentService<
    Arc<InMemoryInventoryStore>,
    PlannedForecastSource<Arc<InMemoryInventoryStore>>,
    O,
>;

fn sku(name: &str) -> SkuName {
    SkuName::new(name).unwrap()
}

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn bottles() -> Vec<InventoryItem> {
    vec![
        InventoryItem::new(sku("8oz-bottle"), "Acme Glass", 500)
            .unwrap()
            .with_max_capacity(10_000)
            .with_warehouse_quantity(2_000),
        InventoryItem::new(sku("16oz-bottle"), "Acme Glass", 250)
            .unwrap()
            .with_warehouse_quantity(300),
        InventoryItem::new(sku("label-roll"), "Printworks", 50)
            .unwrap()
            .with_warehouse_quantity(10),
    ]
}

fn setup_with<O: OrderStore>(orders: O) -> (Service<O>, Arc<InMemoryInventoryStore>) {
    let inventory = Arc::new(InMemoryInventoryStore::with_items(bottles()));
    let demand = vec![
        ProductDemand {
            product: "cold brew".to_string(),
            sku: sku("8oz-bottle"),
            daily_sales_rate: 40.0,
        },
        ProductDemand {
            product: "shampoo".to_string(),
            sku: sku("16oz-bottle"),
            daily_sales_rate: 30.0,
        },
    ];
    let forecast = PlannedForecastSource::new(inventory.clone(), demand);
    (ReplenishmentService::new(inventory.clone(), forecast, orders), inventory)
}

type Wired = (
    Service<Arc<InMemoryOrderStore>>,
    Arc<InMemoryInventoryStore>,
    Arc<InMemoryOrderStore>,
);

fn setup() -> Wired {
    let orders = Arc::new(InMemoryOrderStore::new());
    let (service, inventory) = setup_with(orders.clone());
    (service, inventory, orders)
}

fn draft(inventory: &InMemoryInventoryStore, supplier: &str, lines: &[(&str, i64)]) -> OrderDraft {
    let mut draft = OrderDraft::new(supplier);
    for (name, qty) in lines {
        let item = inventory.get_item(&sku(name)).unwrap().unwrap();
        draft.push(DraftLine::new(&item, *qty).0);
        draft.set_added(&sku(name), true).unwrap();
    }
    draft
}

fn warehouse(inventory: &InMemoryInventoryStore, name: &str) -> i64 {
    inventory.get_item(&sku(name)).unwrap().unwrap().warehouse_quantity()
}

fn line<'a>(order: &'a OrderSnapshot, name: &str) -> &'a OrderLine {
    order.lines.iter().find(|l| l.sku.as_str() == name).unwrap()
}

#[test]
fn po_100_two_passes_then_archive() {
    let (service, inventory, orders) = setup();
    let submitted = service
        .submit(
            &draft(&inventory, "Acme Glass", &[("8oz-bottle", 1_000), ("16oz-bottle", 500)]),
            "PO-100",
            test_date(),
        )
        .unwrap();
    let order_id = submitted.order_id;
    assert_eq!(submitted.group_status(), GroupStatus::Submitted);

    // Pass 1: only the 8oz bottles arrive.
    let mut pass = service.open_receipt(order_id).unwrap();
    pass.deselect(line(&submitted, "16oz-bottle").id).unwrap();
    assert_eq!(pass.warnings().len(), 1);

    let err = service
        .receive(pass.clone().into_command(false, test_date(), Utc::now()))
        .unwrap_err();
    assert!(err.is_confirmation_required());
    assert_eq!(warehouse(&inventory, "8oz-bottle"), 2_000);

    let outcome = service
        .receive(pass.into_command(true, test_date(), Utc::now()))
        .unwrap();
    assert_eq!(outcome.group_status, GroupStatus::Partial);
    assert_eq!(outcome.inventory_events.len(), 1);

    let stored = orders.get_order(order_id).unwrap();
    assert_eq!(line(&stored, "8oz-bottle").status, LineStatus::Received);
    assert_eq!(line(&stored, "8oz-bottle").actual_delivery_date, Some(test_date()));
    assert_eq!(line(&stored, "16oz-bottle").status, LineStatus::Partial);
    assert_eq!(line(&stored, "16oz-bottle").received_qty, 0);
    assert_eq!(warehouse(&inventory, "8oz-bottle"), 3_000);

    assert!(matches!(
        service.archive(order_id),
        Err(ServiceError::Domain(DomainError::InvalidLines(_)))
    ));

    // Pass 2: the rest, exactly as proposed.
    let pass = service.open_receipt(order_id).unwrap();
    assert_eq!(pass.proposals().len(), 1);
    assert!(pass.warnings().is_empty());
    let outcome = service
        .receive(pass.into_command(false, test_date(), Utc::now()))
        .unwrap();
    assert_eq!(outcome.group_status, GroupStatus::Received);
    assert_eq!(warehouse(&inventory, "16oz-bottle"), 800);

    let archived = service.archive(order_id).unwrap();
    assert_eq!(archived.group_status(), GroupStatus::Archived);
    assert_eq!(orders.get_order(order_id).unwrap().group_status(), GroupStatus::Archived);
}

#[test]
fn over_receipt_writes_nothing() {
    let (service, inventory, orders) = setup();
    let order = service
        .submit(&draft(&inventory, "Printworks", &[("label-roll", 200)]), "PO-7", test_date())
        .unwrap();
    let line_id = order.lines[0].id;

    let mut pass = service.open_receipt(order.order_id).unwrap();
    pass.set_qty(line_id, 150).unwrap();
    service
        .receive(pass.into_command(true, test_date(), Utc::now()))
        .unwrap();
    let before = orders.get_order(order.order_id).unwrap();

    let mut pass = service.open_receipt(order.order_id).unwrap();
    pass.set_qty(line_id, 60).unwrap();
    let err = service
        .receive(pass.into_command(true, test_date(), Utc::now()))
        .unwrap_err();

    match err {
        ServiceError::Domain(e) => assert_eq!(e.offending_lines(), vec!["label-roll"]),
        other => panic!("expected line validation, got {other:?}"),
    }
    assert_eq!(orders.get_order(order.order_id).unwrap(), before);
    assert_eq!(line(&before, "label-roll").received_qty, 150);
    assert_eq!(warehouse(&inventory, "label-roll"), 160);
}

#[test]
fn unresolved_sku_fails_before_any_write() {
    let (service, inventory, orders) = setup();
    let order_id = PurchaseOrderId::new(AggregateId::new());
    let known = OrderLine::submitted(OrderLineId::generate(), sku("8oz-bottle"), 500, 500);
    let ghost = OrderLine::submitted(OrderLineId::generate(), sku("retired-cap"), 100, 100);
    orders
        .create_order(OrderSnapshot {
            order_id,
            order_number: "PO-9".to_string(),
            supplier: "Acme Glass".to_string(),
            order_date: test_date(),
            lines: vec![known, ghost],
        })
        .unwrap();
    let before = orders.get_order(order_id).unwrap();

    let pass = service.open_receipt(order_id).unwrap();
    let err = service
        .receive(pass.into_command(false, test_date(), Utc::now()))
        .unwrap_err();

    match err {
        ServiceError::Domain(DomainError::Unresolved(name)) => assert_eq!(name, "retired-cap"),
        other => panic!("expected unresolved sku, got {other:?}"),
    }
    assert_eq!(orders.get_order(order_id).unwrap(), before);
    assert_eq!(warehouse(&inventory, "8oz-bottle"), 2_000);
}

/// Order store whose line updates start failing after `allowed` successes.
struct FlakyOrderStore {
    inner: InMemoryOrderStore,
    allowed: usize,
    calls: AtomicUsize,
}

impl FlakyOrderStore {
    fn new(allowed: usize) -> Self {
        Self {
            inner: InMemoryOrderStore::new(),
            allowed,
            calls: AtomicUsize::new(0),
        }
    }
}

impl OrderStore for FlakyOrderStore {
    fn create_order(&self, order: OrderSnapshot) -> Result<(), StoreError> {
        self.inner.create_order(order)
    }

    fn get_order(&self, order_id: PurchaseOrderId) -> Result<OrderSnapshot, StoreError> {
        self.inner.get_order(order_id)
    }

    fn update_order(
        &self,
        order_id: PurchaseOrderId,
        line_id: OrderLineId,
        update: LineUpdate,
    ) -> Result<(), StoreError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.update_order(order_id, line_id, update)
    }
}

#[test]
fn failing_second_line_write_reports_partial_commit() {
    let (service, inventory) = setup_with(FlakyOrderStore::new(1));
    let order = service
        .submit(
            &draft(&inventory, "Acme Glass", &[("8oz-bottle", 1_000), ("16oz-bottle", 500)]),
            "PO-200",
            test_date(),
        )
        .unwrap();

    let pass = service.open_receipt(order.order_id).unwrap();
    let err = service
        .receive(pass.into_command(false, test_date(), Utc::now()))
        .unwrap_err();

    match err {
        ServiceError::PartialCommit {
            committed,
            attempted,
            ..
        } => {
            assert_eq!(committed, 1);
            assert_eq!(attempted, 4);
        }
        other => panic!("expected partial commit, got {other:?}"),
    }

    let stored = service.orders().get_order(order.order_id).unwrap();
    assert_eq!(line(&stored, "8oz-bottle").status, LineStatus::Received);
    assert_eq!(line(&stored, "16oz-bottle").status, LineStatus::Submitted);
    assert_eq!(warehouse(&inventory, "8oz-bottle"), 2_000);
}

#[test]
fn failing_first_write_is_a_plain_store_error() {
    let (service, inventory) = setup_with(FlakyOrderStore::new(0));
    let order = service
        .submit(&draft(&inventory, "Printworks", &[("label-roll", 50)]), "PO-201", test_date())
        .unwrap();

    let pass = service.open_receipt(order.order_id).unwrap();
    let err = service
        .receive(pass.into_command(false, test_date(), Utc::now()))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Store(StoreError::Unavailable(_))));
    assert_eq!(warehouse(&inventory, "label-roll"), 10);
}

#[test]
fn manual_line_edit_is_flagged_in_store() {
    let (service, inventory, orders) = setup();
    let order = service
        .submit(&draft(&inventory, "Acme Glass", &[("8oz-bottle", 1_000)]), "PO-300", test_date())
        .unwrap();
    let line_id = order.lines[0].id;

    service
        .edit_line_quantity(EditLineQuantity {
            order_id: order.order_id,
            line_id,
            qty: 900,
            occurred_at: Utc::now(),
        })
        .unwrap();

    let stored = orders.get_order(order.order_id).unwrap();
    assert!(stored.lines[0].edited);
    assert_eq!(stored.lines[0].qty, 900);
    assert_eq!(stored.lines[0].pallets, 2);
    assert_eq!(stored.lines[0].original_qty, 1_000);
    assert_eq!(stored.lines[0].received_qty, 0);

    let pass = service.open_receipt(order.order_id).unwrap();
    assert_eq!(pass.proposals()[0].qty, 900);
    assert!(pass.warnings().is_empty());
}

#[test]
fn supplier_draft_follows_recommendations() {
    let (service, _inventory, _orders) = setup();

    let draft = service.draft_for_supplier("Acme Glass").unwrap();

    // 16oz: 300 on hand at 30/day ranks before 8oz: 2000 at 40/day.
    let names: Vec<&str> = draft.lines().iter().map(|l| l.sku().as_str()).collect();
    assert_eq!(names, vec!["16oz-bottle", "8oz-bottle"]);
    assert!(draft.lines().iter().all(DraftLine::is_added));
    // 16oz: 30 * 120 = 3600 needed, 3300 short -> 14 pallets of 250.
    assert_eq!(draft.lines()[0].qty(), 3_500);
    assert!(draft.validate().is_ok());

    assert!(service.draft_for_supplier("Nobody").is_err());
}

#[test]
fn inventory_override_requires_confirmation() {
    let (service, inventory, _orders) = setup();
    let edit = |confirmed| EditCounts {
        sku: sku("16oz-bottle"),
        warehouse_quantity: Some(275),
        supplier_quantity: None,
        overwrite_confirmed: confirmed,
        occurred_at: Utc::now(),
    };

    assert!(service.edit_inventory(edit(false)).unwrap_err().is_confirmation_required());
    assert_eq!(warehouse(&inventory, "16oz-bottle"), 300);

    service.edit_inventory(edit(true)).unwrap();
    assert_eq!(warehouse(&inventory, "16oz-bottle"), 275);
}

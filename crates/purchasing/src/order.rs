use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use packflow_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Entity, LineViolation};
use packflow_events::Event;
use packflow_inventory::SkuName;

use crate::line::{LineStatus, OrderLine, OrderLineId};
use crate::receipt::ReceiptWarning;

/// Purchase order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(pub AggregateId);

impl PurchaseOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PurchaseOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order-group status, rolled up from the line statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Submitted,
    Partial,
    Received,
    Archived,
}

/// Roll-up rule: `received` only if every line is received (`archived` once every
/// line is archived); otherwise `partial` if any line is partial; else `submitted`.
pub fn roll_up(lines: &[OrderLine]) -> GroupStatus {
    if !lines.is_empty() && lines.iter().all(|l| l.status == LineStatus::Archived) {
        return GroupStatus::Archived;
    }
    if !lines.is_empty() && lines.iter().all(|l| l.status.is_settled()) {
        return GroupStatus::Received;
    }
    if lines.iter().any(|l| l.status == LineStatus::Partial) {
        return GroupStatus::Partial;
    }
    GroupStatus::Submitted
}

/// Persisted shape of an order (what the order store holds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order_id: PurchaseOrderId,
    pub order_number: String,
    pub supplier: String,
    pub order_date: NaiveDate,
    pub lines: Vec<OrderLine>,
}

impl OrderSnapshot {
    pub fn group_status(&self) -> GroupStatus {
        roll_up(&self.lines)
    }

    pub fn line(&self, line_id: OrderLineId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }
}

/// Aggregate root: PurchaseOrder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    order_number: String,
    supplier: String,
    order_date: Option<NaiveDate>,
    lines: Vec<OrderLine>,
    version: u64,
    created: bool,
}

impl PurchaseOrder {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: PurchaseOrderId) -> Self {
        Self {
            id,
            order_number: String::new(),
            supplier: String::new(),
            order_date: None,
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    /// Rehydrate from a stored snapshot.
    pub fn from_snapshot(snapshot: OrderSnapshot) -> Self {
        Self {
            id: snapshot.order_id,
            order_number: snapshot.order_number,
            supplier: snapshot.supplier,
            order_date: Some(snapshot.order_date),
            lines: snapshot.lines,
            version: 0,
            created: true,
        }
    }

    /// Current state as a snapshot; `None` before creation.
    pub fn snapshot(&self) -> Option<OrderSnapshot> {
        Some(OrderSnapshot {
            order_id: self.id,
            order_number: self.order_number.clone(),
            supplier: self.supplier.clone(),
            order_date: self.order_date.filter(|_| self.created)?,
            lines: self.lines.clone(),
        })
    }

    pub fn order_id(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn order_date(&self) -> Option<NaiveDate> {
        self.order_date
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, line_id: OrderLineId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    pub fn group_status(&self) -> GroupStatus {
        roll_up(&self.lines)
    }

    /// Soft warnings a receipt of `receipts` would raise.
    ///
    /// - `QuantityChanged` when a line's quantity differs from what was expected
    ///   when the pass was opened.
    /// - `PartialOrder` when some open lines are left out of the pass.
    pub fn receipt_warnings(&self, receipts: &[LineReceipt]) -> Vec<ReceiptWarning> {
        let mut warnings = Vec::new();

        for r in receipts {
            if let Some(line) = self.line(r.line_id) {
                if r.qty != line.expected_qty() {
                    warnings.push(ReceiptWarning::QuantityChanged {
                        sku: line.sku.clone(),
                        initial_qty: line.expected_qty(),
                        qty: r.qty,
                    });
                }
            }
        }

        let unselected = self.unselected_open_lines(receipts);
        if !receipts.is_empty() && !unselected.is_empty() {
            warnings.push(ReceiptWarning::PartialOrder {
                unselected: unselected.into_iter().map(|l| l.sku.clone()).collect(),
            });
        }

        warnings
    }

    fn unselected_open_lines(&self, receipts: &[LineReceipt]) -> Vec<&OrderLine> {
        let selected: HashSet<OrderLineId> = receipts.iter().map(|r| r.line_id).collect();
        self.lines
            .iter()
            .filter(|l| l.status.is_open() && !selected.contains(&l.id))
            .collect()
    }
}

impl AggregateRoot for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Line to include in a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub line_id: OrderLineId,
    pub sku: SkuName,
    pub qty: i64,
    pub units_per_pallet: i64,
}

/// Units of one line received in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReceipt {
    pub line_id: OrderLineId,
    pub qty: i64,
}

/// Command: CreatePurchaseOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub order_id: PurchaseOrderId,
    pub order_number: String,
    pub supplier: String,
    pub order_date: NaiveDate,
    pub lines: Vec<NewOrderLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveGoods (one receipt pass over the selected lines).
///
/// `confirmed` acknowledges the pass's soft warnings (see
/// [`PurchaseOrder::receipt_warnings`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveGoods {
    pub order_id: PurchaseOrderId,
    pub lines: Vec<LineReceipt>,
    pub confirmed: bool,
    pub delivered_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditLineQuantity (manual correction outside the receipt flow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLineQuantity {
    pub order_id: PurchaseOrderId,
    pub line_id: OrderLineId,
    pub qty: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub order_id: PurchaseOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderCommand {
    CreatePurchaseOrder(CreatePurchaseOrder),
    ReceiveGoods(ReceiveGoods),
    EditLineQuantity(EditLineQuantity),
    Archive(Archive),
}

/// Event: PurchaseOrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderCreated {
    pub order_id: PurchaseOrderId,
    pub order_number: String,
    pub supplier: String,
    pub order_date: NaiveDate,
    pub lines: Vec<OrderLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineReceived.
///
/// Carries the SKU and quantity so inventory can be credited from the event alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReceived {
    pub order_id: PurchaseOrderId,
    pub line_id: OrderLineId,
    pub sku: SkuName,
    pub qty: i64,
    pub received_qty: i64,
    pub status: LineStatus,
    pub delivered_on: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineMarkedPartial (line left out of a partial receipt pass).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMarkedPartial {
    pub order_id: PurchaseOrderId,
    pub line_id: OrderLineId,
    pub sku: SkuName,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineQuantityEdited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineQuantityEdited {
    pub order_id: PurchaseOrderId,
    pub line_id: OrderLineId,
    pub sku: SkuName,
    pub qty: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineArchived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineArchived {
    pub order_id: PurchaseOrderId,
    pub line_id: OrderLineId,
    pub sku: SkuName,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderEvent {
    PurchaseOrderCreated(PurchaseOrderCreated),
    LineReceived(LineReceived),
    LineMarkedPartial(LineMarkedPartial),
    LineQuantityEdited(LineQuantityEdited),
    LineArchived(LineArchived),
}

impl PurchaseOrderEvent {
    /// Line touched by this event (`None` for order-level events).
    pub fn line_id(&self) -> Option<OrderLineId> {
        match self {
            PurchaseOrderEvent::PurchaseOrderCreated(_) => None,
            PurchaseOrderEvent::LineReceived(e) => Some(e.line_id),
            PurchaseOrderEvent::LineMarkedPartial(e) => Some(e.line_id),
            PurchaseOrderEvent::LineQuantityEdited(e) => Some(e.line_id),
            PurchaseOrderEvent::LineArchived(e) => Some(e.line_id),
        }
    }
}

impl Event for PurchaseOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseOrderEvent::PurchaseOrderCreated(_) => "purchasing.order.created",
            PurchaseOrderEvent::LineReceived(_) => "purchasing.order.line_received",
            PurchaseOrderEvent::LineMarkedPartial(_) => "purchasing.order.line_marked_partial",
            PurchaseOrderEvent::LineQuantityEdited(_) => "purchasing.order.line_quantity_edited",
            PurchaseOrderEvent::LineArchived(_) => "purchasing.order.line_archived",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PurchaseOrderEvent::PurchaseOrderCreated(e) => e.occurred_at,
            PurchaseOrderEvent::LineReceived(e) => e.occurred_at,
            PurchaseOrderEvent::LineMarkedPartial(e) => e.occurred_at,
            PurchaseOrderEvent::LineQuantityEdited(e) => e.occurred_at,
            PurchaseOrderEvent::LineArchived(e) => e.occurred_at,
        }
    }

    fn subject(&self) -> String {
        match self {
            PurchaseOrderEvent::PurchaseOrderCreated(e) => format!("order {}", e.order_number),
            PurchaseOrderEvent::LineReceived(e) => format!("line {} ({})", e.line_id, e.sku),
            PurchaseOrderEvent::LineMarkedPartial(e) => format!("line {} ({})", e.line_id, e.sku),
            PurchaseOrderEvent::LineQuantityEdited(e) => format!("line {} ({})", e.line_id, e.sku),
            PurchaseOrderEvent::LineArchived(e) => format!("line {} ({})", e.line_id, e.sku),
        }
    }
}

impl Aggregate for PurchaseOrder {
    type Command = PurchaseOrderCommand;
    type Event = PurchaseOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PurchaseOrderEvent::PurchaseOrderCreated(e) => {
                self.id = e.order_id;
                self.order_number = e.order_number.clone();
                self.supplier = e.supplier.clone();
                self.order_date = Some(e.order_date);
                self.lines = e.lines.clone();
                self.created = true;
            }
            PurchaseOrderEvent::LineReceived(e) => {
                if let Some(line) = self.line_mut(e.line_id) {
                    line.set_qty(e.qty);
                    line.received_qty = e.received_qty;
                    line.status = e.status;
                    line.actual_delivery_date = Some(e.delivered_on);
                }
            }
            PurchaseOrderEvent::LineMarkedPartial(e) => {
                if let Some(line) = self.line_mut(e.line_id) {
                    line.status = LineStatus::Partial;
                }
            }
            PurchaseOrderEvent::LineQuantityEdited(e) => {
                if let Some(line) = self.line_mut(e.line_id) {
                    line.set_qty(e.qty);
                    line.edited = true;
                }
            }
            PurchaseOrderEvent::LineArchived(e) => {
                if let Some(line) = self.line_mut(e.line_id) {
                    line.status = LineStatus::Archived;
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PurchaseOrderCommand::CreatePurchaseOrder(cmd) => self.handle_create(cmd),
            PurchaseOrderCommand::ReceiveGoods(cmd) => self.handle_receive(cmd),
            PurchaseOrderCommand::EditLineQuantity(cmd) => self.handle_edit(cmd),
            PurchaseOrderCommand::Archive(cmd) => self.handle_archive(cmd),
        }
    }
}

impl PurchaseOrder {
    fn line_mut(&mut self, line_id: OrderLineId) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| l.id == line_id)
    }

    fn ensure_created(&self, order_id: PurchaseOrderId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        if self.group_status() == GroupStatus::Archived {
            return Err(DomainError::invariant("archived purchase orders are immutable"));
        }
        Ok(())
    }

    fn handle_create(
        &self,
        cmd: &CreatePurchaseOrder,
    ) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("purchase order already exists"));
        }
        if cmd.order_number.trim().is_empty() {
            return Err(DomainError::validation("order number cannot be empty"));
        }
        if cmd.lines.is_empty() {
            return Err(DomainError::validation(
                "cannot create purchase order without lines",
            ));
        }

        let violations: Vec<LineViolation> = cmd
            .lines
            .iter()
            .filter(|l| l.qty <= 0)
            .map(|l| LineViolation::new(l.sku.as_str(), "quantity must be positive"))
            .collect();
        if !violations.is_empty() {
            return Err(DomainError::invalid_lines(violations));
        }

        let ids: HashSet<OrderLineId> = cmd.lines.iter().map(|l| l.line_id).collect();
        if ids.len() != cmd.lines.len() {
            return Err(DomainError::invariant("duplicate line ids in purchase order"));
        }

        Ok(vec![PurchaseOrderEvent::PurchaseOrderCreated(
            PurchaseOrderCreated {
                order_id: cmd.order_id,
                order_number: cmd.order_number.trim().to_string(),
                supplier: cmd.supplier.clone(),
                order_date: cmd.order_date,
                lines: cmd
                    .lines
                    .iter()
                    .map(|l| {
                        OrderLine::submitted(l.line_id, l.sku.clone(), l.qty, l.units_per_pallet)
                    })
                    .collect(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_receive(&self, cmd: &ReceiveGoods) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        self.ensure_created(cmd.order_id)?;

        if cmd.lines.is_empty() {
            return Err(DomainError::validation("no lines selected for receipt"));
        }

        // Reject the whole pass if any selected line is invalid.
        let mut violations = Vec::new();
        let mut seen = HashSet::new();
        for r in &cmd.lines {
            let Some(line) = self.line(r.line_id) else {
                violations.push(LineViolation::new(
                    r.line_id.to_string(),
                    "line is not part of this order",
                ));
                continue;
            };
            let label = line.label();
            if !seen.insert(r.line_id) {
                violations.push(LineViolation::new(label, "line selected more than once"));
            } else if !line.status.is_open() {
                violations.push(LineViolation::new(
                    label,
                    format!("line is {} and cannot receive goods", line.status),
                ));
            } else if r.qty <= 0 {
                violations.push(LineViolation::new(label, "received quantity must be positive"));
            } else if r.qty > line.remaining() {
                violations.push(LineViolation::new(
                    label,
                    format!(
                        "receiving {} would exceed ordered quantity ({} of {} already received)",
                        r.qty, line.received_qty, line.original_qty
                    ),
                ));
            }
        }
        if !violations.is_empty() {
            return Err(DomainError::invalid_lines(violations));
        }

        let warnings = self.receipt_warnings(&cmd.lines);
        if !warnings.is_empty() && !cmd.confirmed {
            return Err(DomainError::confirmation_required(
                warnings.iter().map(ToString::to_string).collect(),
            ));
        }

        // Events follow line order so writes are issued in a stable sequence.
        let mut events = Vec::new();
        for line in &self.lines {
            let Some(r) = cmd.lines.iter().find(|r| r.line_id == line.id) else {
                continue;
            };
            let received_qty = line.received_qty + r.qty;
            let status = if received_qty == line.original_qty {
                LineStatus::Received
            } else {
                LineStatus::Partial
            };
            events.push(PurchaseOrderEvent::LineReceived(LineReceived {
                order_id: cmd.order_id,
                line_id: line.id,
                sku: line.sku.clone(),
                qty: r.qty,
                received_qty,
                status,
                delivered_on: cmd.delivered_on,
                occurred_at: cmd.occurred_at,
            }));
        }

        for line in self.unselected_open_lines(&cmd.lines) {
            if line.status == LineStatus::Submitted {
                events.push(PurchaseOrderEvent::LineMarkedPartial(LineMarkedPartial {
                    order_id: cmd.order_id,
                    line_id: line.id,
                    sku: line.sku.clone(),
                    occurred_at: cmd.occurred_at,
                }));
            }
        }

        Ok(events)
    }

    fn handle_edit(&self, cmd: &EditLineQuantity) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        self.ensure_created(cmd.order_id)?;

        let line = self.line(cmd.line_id).ok_or_else(|| {
            DomainError::validation(format!("line {} is not part of this order", cmd.line_id))
        })?;

        if !line.status.is_open() {
            return Err(DomainError::invariant(format!(
                "{}: line is {} and can no longer be edited",
                line.sku, line.status
            )));
        }
        if cmd.qty <= 0 {
            return Err(DomainError::invalid_lines(vec![LineViolation::new(
                line.label(),
                "quantity must be positive",
            )]));
        }
        if cmd.qty > line.remaining() {
            return Err(DomainError::invalid_lines(vec![LineViolation::new(
                line.label(),
                format!(
                    "quantity {} exceeds the {} still outstanding",
                    cmd.qty,
                    line.remaining()
                ),
            )]));
        }
        if cmd.qty == line.qty {
            return Ok(vec![]);
        }

        Ok(vec![PurchaseOrderEvent::LineQuantityEdited(LineQuantityEdited {
            order_id: cmd.order_id,
            line_id: line.id,
            sku: line.sku.clone(),
            qty: cmd.qty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &Archive) -> Result<Vec<PurchaseOrderEvent>, DomainError> {
        if self.created && self.group_status() == GroupStatus::Archived {
            return Err(DomainError::conflict("purchase order already archived"));
        }
        self.ensure_created(cmd.order_id)?;

        let blocking: Vec<LineViolation> = self
            .lines
            .iter()
            .filter(|l| !l.status.is_settled())
            .map(|l| {
                LineViolation::new(
                    l.label(),
                    format!("line is {}; only fully received lines can be archived", l.status),
                )
            })
            .collect();
        if !blocking.is_empty() {
            return Err(DomainError::invalid_lines(blocking));
        }

        Ok(self
            .lines
            .iter()
            .filter(|l| l.status == LineStatus::Received)
            .map(|l| {
                PurchaseOrderEvent::LineArchived(LineArchived {
                    order_id: cmd.order_id,
                    line_id: l.id,
                    sku: l.sku.clone(),
                    occurred_at: cmd.occurred_at,
                })
            })
            .collect())
    }
}

//! Order drafts: recommended lines the user adjusts before submitting.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use packflow_core::{DomainError, LineViolation};
use packflow_inventory::{CapacityUsage, InventoryItem, SkuName, capacity, pallet};

use crate::line::OrderLineId;
use crate::order::{CreatePurchaseOrder, NewOrderLine, PurchaseOrderId};

/// Notice that a requested quantity was reduced to fit warehouse capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityClamp {
    pub sku: SkuName,
    pub requested: i64,
    pub allowed: i64,
}

impl core::fmt::Display for QuantityClamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}: quantity reduced from {} to {} to stay within warehouse capacity",
            self.sku, self.requested, self.allowed
        )
    }
}

/// A not-yet-submitted line (implicitly `pending`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    sku: SkuName,
    units_per_pallet: i64,
    warehouse_quantity: i64,
    max_warehouse_capacity: i64,
    supplier_quantity: i64,
    recommended_qty: i64,
    qty: i64,
    pallets: i64,
    added: bool,
}

impl DraftLine {
    /// Line seeded with the recommended quantity, not yet added to the order.
    ///
    /// A recommendation larger than the warehouse headroom is clamped right away
    /// and the clamp is returned alongside the line.
    pub fn new(item: &InventoryItem, recommended_qty: i64) -> (Self, Option<QuantityClamp>) {
        let mut line = Self {
            sku: item.sku().clone(),
            units_per_pallet: item.units_per_pallet(),
            warehouse_quantity: item.warehouse_quantity(),
            max_warehouse_capacity: item.max_warehouse_capacity(),
            supplier_quantity: item.supplier_quantity(),
            recommended_qty: recommended_qty.max(0),
            qty: 0,
            pallets: 0,
            added: false,
        };
        let clamp = line.set_qty(line.recommended_qty);
        (line, clamp)
    }

    pub fn sku(&self) -> &SkuName {
        &self.sku
    }

    pub fn qty(&self) -> i64 {
        self.qty
    }

    pub fn pallets(&self) -> i64 {
        self.pallets
    }

    pub fn units_per_pallet(&self) -> i64 {
        self.units_per_pallet
    }

    pub fn recommended_qty(&self) -> i64 {
        self.recommended_qty
    }

    pub fn supplier_quantity(&self) -> i64 {
        self.supplier_quantity
    }

    pub fn is_added(&self) -> bool {
        self.added
    }

    pub fn inventory_percentage(&self) -> CapacityUsage {
        CapacityUsage::after_order(self.warehouse_quantity, self.qty, self.max_warehouse_capacity)
    }

    pub fn is_over_capacity(&self) -> bool {
        self.inventory_percentage().exceeds_capacity()
    }

    /// Set the order quantity, clamping to the warehouse headroom when capacity is bounded.
    ///
    /// Pallets are always derived from the stored (possibly clamped) quantity.
    pub fn set_qty(&mut self, qty: i64) -> Option<QuantityClamp> {
        let requested = qty.max(0);
        let headroom = capacity::headroom(self.warehouse_quantity, self.max_warehouse_capacity);
        let allowed = match headroom {
            Some(room) => requested.min(room),
            None => requested,
        };

        self.qty = allowed;
        self.pallets = pallet::pallets(allowed, self.units_per_pallet);

        (allowed < requested).then(|| QuantityClamp {
            sku: self.sku.clone(),
            requested,
            allowed,
        })
    }

    /// Add the line to (or remove it from) the order.
    ///
    /// Adding uses the first non-zero of: recommended quantity, prior quantity,
    /// one pallet. Removing resets to the recommended baseline; the line stays in
    /// the draft either way.
    pub fn set_added(&mut self, added: bool) -> Option<QuantityClamp> {
        self.added = added;
        let qty = if added {
            [self.recommended_qty, self.qty, self.units_per_pallet]
                .into_iter()
                .find(|q| *q > 0)
                .unwrap_or(0)
        } else {
            self.recommended_qty
        };
        self.set_qty(qty)
    }

    pub fn toggle(&mut self) -> Option<QuantityClamp> {
        self.set_added(!self.added)
    }

    fn violations(&self) -> Vec<LineViolation> {
        let mut out = Vec::new();
        if self.qty == 0 {
            out.push(LineViolation::new(self.sku.as_str(), "quantity is zero"));
        }
        if let CapacityUsage::Percent(p) = self.inventory_percentage() {
            if p > 100 {
                out.push(LineViolation::new(
                    self.sku.as_str(),
                    format!("post-order inventory at {p}% exceeds warehouse capacity"),
                ));
            }
        }
        out
    }
}

/// Draft purchase order for one supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    supplier: String,
    lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new(supplier: impl Into<String>) -> Self {
        Self {
            supplier: supplier.into(),
            lines: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: DraftLine) -> Self {
        self.push(line);
        self
    }

    /// Adds a line; a second line for the same SKU replaces the first.
    pub fn push(&mut self, line: DraftLine) {
        match self.lines.iter_mut().find(|l| l.sku == line.sku) {
            Some(existing) => *existing = line,
            None => self.lines.push(line),
        }
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn line(&self, sku: &SkuName) -> Option<&DraftLine> {
        self.lines.iter().find(|l| &l.sku == sku)
    }

    pub fn added_lines(&self) -> impl Iterator<Item = &DraftLine> {
        self.lines.iter().filter(|l| l.added)
    }

    fn line_mut(&mut self, sku: &SkuName) -> Result<&mut DraftLine, DomainError> {
        self.lines
            .iter_mut()
            .find(|l| &l.sku == sku)
            .ok_or_else(|| DomainError::validation(format!("{sku} is not part of this draft")))
    }

    pub fn set_qty(
        &mut self,
        sku: &SkuName,
        qty: i64,
    ) -> Result<Option<QuantityClamp>, DomainError> {
        Ok(self.line_mut(sku)?.set_qty(qty))
    }

    pub fn set_added(
        &mut self,
        sku: &SkuName,
        added: bool,
    ) -> Result<Option<QuantityClamp>, DomainError> {
        Ok(self.line_mut(sku)?.set_added(added))
    }

    pub fn toggle(&mut self, sku: &SkuName) -> Result<Option<QuantityClamp>, DomainError> {
        Ok(self.line_mut(sku)?.toggle())
    }

    /// Check every added line; all offending lines are reported together.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.added_lines().next().is_none() {
            return Err(DomainError::validation("no lines added to the order"));
        }

        let violations: Vec<LineViolation> = self
            .added_lines()
            .flat_map(DraftLine::violations)
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::invalid_lines(violations))
        }
    }

    /// Validate and build the create command for the added lines.
    pub fn submit(
        &self,
        order_id: PurchaseOrderId,
        order_number: impl Into<String>,
        order_date: NaiveDate,
        occurred_at: DateTime<Utc>,
    ) -> Result<CreatePurchaseOrder, DomainError> {
        self.validate()?;

        Ok(CreatePurchaseOrder {
            order_id,
            order_number: order_number.into(),
            supplier: self.supplier.clone(),
            order_date,
            lines: self
                .added_lines()
                .map(|l| NewOrderLine {
                    line_id: OrderLineId::generate(),
                    sku: l.sku.clone(),
                    qty: l.qty,
                    units_per_pallet: l.units_per_pallet,
                })
                .collect(),
            occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packflow_core::AggregateId;

    fn sku(name: &str) -> SkuName {
        SkuName::new(name).unwrap()
    }

    fn order_id() -> PurchaseOrderId {
        PurchaseOrderId::new(AggregateId::new())
    }

    fn item(name: &str, on_hand: i64, max: i64) -> InventoryItem {
        InventoryItem::new(sku(name), "Acme Glass", 10)
            .unwrap()
            .with_warehouse_quantity(on_hand)
            .with_max_capacity(max)
    }

    #[test]
    fn quantity_clamped_to_capacity_and_pallets_follow_clamp() {
        let mut line = DraftLine::new(&item("8oz-bottle", 80, 100), 0).0;
        let clamp = line.set_qty(50).unwrap();

        assert_eq!(clamp.requested, 50);
        assert_eq!(clamp.allowed, 20);
        assert_eq!(line.qty(), 20);
        assert_eq!(line.pallets(), 2);
        assert_eq!(line.inventory_percentage(), CapacityUsage::Percent(100));
    }

    #[test]
    fn oversized_recommendation_reports_clamp_on_construction() {
        let (line, clamp) = DraftLine::new(&item("8oz-bottle", 80, 100), 50);

        assert_eq!(
            clamp,
            Some(QuantityClamp {
                sku: sku("8oz-bottle"),
                requested: 50,
                allowed: 20,
            })
        );
        assert_eq!(line.recommended_qty(), 50);
        assert_eq!(line.qty(), 20);
        assert!(DraftLine::new(&item("lid", 0, 100), 50).1.is_none());
    }

    #[test]
    fn unbounded_capacity_never_clamps() {
        let mut line = DraftLine::new(&item("lid", 5_000, 0), 0).0;
        assert!(line.set_qty(1_000_000).is_none());
        assert_eq!(line.qty(), 1_000_000);
    }

    #[test]
    fn negative_quantity_becomes_zero() {
        let mut line = DraftLine::new(&item("lid", 0, 0), 0).0;
        assert!(line.set_qty(-5).is_none());
        assert_eq!(line.qty(), 0);
        assert_eq!(line.pallets(), 0);
    }

    #[test]
    fn adding_uses_first_non_zero_quantity() {
        let mut recommended = DraftLine::new(&item("a", 0, 0), 40).0;
        recommended.set_added(true);
        assert_eq!(recommended.qty(), 40);

        let mut prior = DraftLine::new(&item("b", 0, 0), 0).0;
        prior.set_qty(7);
        prior.set_added(true);
        assert_eq!(prior.qty(), 7);

        let mut pallet_default = DraftLine::new(&item("c", 0, 0), 0).0;
        pallet_default.set_added(true);
        assert_eq!(pallet_default.qty(), 10);
        assert_eq!(pallet_default.pallets(), 1);
    }

    #[test]
    fn removing_resets_to_recommended_baseline() {
        let mut line = DraftLine::new(&item("a", 0, 0), 40).0;
        line.toggle();
        line.set_qty(95);
        assert_eq!(line.pallets(), 10);

        line.toggle();
        assert!(!line.is_added());
        assert_eq!(line.qty(), 40);
        assert_eq!(line.pallets(), 4);
    }

    #[test]
    fn validation_lists_every_offending_line() {
        let mut draft = OrderDraft::new("Acme Glass")
            .with_line(DraftLine::new(&item("zero", 0, 0), 0).0)
            .with_line(DraftLine::new(&item("full", 150, 100), 0).0)
            .with_line(DraftLine::new(&item("fine", 0, 100), 50).0)
            .with_line(DraftLine::new(&item("ignored", 0, 0), 0).0);

        draft.set_added(&sku("zero"), true).unwrap();
        draft.set_qty(&sku("zero"), 0).unwrap();
        draft.set_added(&sku("full"), true).unwrap();
        draft.set_added(&sku("fine"), true).unwrap();

        let err = draft.validate().unwrap_err();
        let offending = err.offending_lines();
        // "full" is already over capacity, so its quantity clamps to zero too.
        assert_eq!(offending, vec!["zero", "full", "full"]);
        assert!(err.to_string().contains("150% exceeds warehouse capacity"));
    }

    #[test]
    fn empty_draft_cannot_submit() {
        let draft =
            OrderDraft::new("Acme Glass").with_line(DraftLine::new(&item("a", 0, 0), 40).0);
        let err = draft
            .submit(order_id(), "PO-1", Utc::now().date_naive(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn submit_builds_command_for_added_lines_only() {
        let mut draft = OrderDraft::new("Acme Glass")
            .with_line(DraftLine::new(&item("a", 0, 0), 40).0)
            .with_line(DraftLine::new(&item("b", 0, 0), 15).0);
        draft.toggle(&sku("b")).unwrap();

        let cmd = draft
            .submit(order_id(), "PO-7", Utc::now().date_naive(), Utc::now())
            .unwrap();

        assert_eq!(cmd.supplier, "Acme Glass");
        assert_eq!(cmd.lines.len(), 1);
        assert_eq!(cmd.lines[0].sku, sku("b"));
        assert_eq!(cmd.lines[0].qty, 15);
    }

    #[test]
    fn unknown_sku_is_rejected() {
        let mut draft = OrderDraft::new("Acme Glass");
        assert!(draft.set_qty(&sku("ghost"), 5).is_err());
    }
}

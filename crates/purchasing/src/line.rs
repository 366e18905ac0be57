use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use packflow_core::{Entity, EntityId};
use packflow_inventory::{SkuName, pallet};

/// Order line identifier (unique within the whole order store).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLineId(pub EntityId);

impl OrderLineId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(EntityId::new())
    }
}

impl core::fmt::Display for OrderLineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Line status lifecycle: `pending -> submitted -> {partial, received} -> archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Pending,
    Submitted,
    Partial,
    Received,
    Archived,
}

impl LineStatus {
    /// Submitted or partially received: still accepts receipts and manual edits.
    pub fn is_open(self) -> bool {
        matches!(self, LineStatus::Submitted | LineStatus::Partial)
    }

    /// Fully received or archived; nothing more can arrive.
    pub fn is_settled(self) -> bool {
        matches!(self, LineStatus::Received | LineStatus::Archived)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineStatus::Pending => "pending",
            LineStatus::Submitted => "submitted",
            LineStatus::Partial => "partial",
            LineStatus::Received => "received",
            LineStatus::Archived => "archived",
        }
    }
}

impl core::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SKU's entry within a submitted purchase order.
///
/// `qty` is the working quantity: what was ordered until the first receipt,
/// then the quantity received in the most recent pass (or a manual correction).
/// Invariant: `received_qty <= original_qty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub sku: SkuName,
    pub qty: i64,
    pub pallets: i64,
    pub units_per_pallet: i64,
    pub original_qty: i64,
    pub received_qty: i64,
    pub status: LineStatus,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub actual_delivery_date: Option<NaiveDate>,
}

impl OrderLine {
    /// A freshly submitted line: nothing received yet.
    pub fn submitted(id: OrderLineId, sku: SkuName, qty: i64, units_per_pallet: i64) -> Self {
        Self {
            id,
            sku,
            qty,
            pallets: pallet::pallets(qty, units_per_pallet),
            units_per_pallet,
            original_qty: qty,
            received_qty: 0,
            status: LineStatus::Submitted,
            edited: false,
            actual_delivery_date: None,
        }
    }

    /// Units still outstanding.
    pub fn remaining(&self) -> i64 {
        (self.original_qty - self.received_qty).max(0)
    }

    /// Units a receipt pass should expect: the outstanding quantity, or the
    /// manually corrected `qty` when the line was edited (never above what is
    /// outstanding).
    pub fn expected_qty(&self) -> i64 {
        if self.edited {
            self.qty.clamp(0, self.remaining())
        } else {
            self.remaining()
        }
    }

    pub(crate) fn set_qty(&mut self, qty: i64) {
        self.qty = qty;
        self.pallets = pallet::pallets(qty, self.units_per_pallet);
    }
}

impl Entity for OrderLine {
    type Id = OrderLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn label(&self) -> &str {
        self.sku.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_line_starts_unreceived() {
        let line = OrderLine::submitted(
            OrderLineId::generate(),
            SkuName::new("8oz-bottle").unwrap(),
            1_200,
            500,
        );
        assert_eq!(line.status, LineStatus::Submitted);
        assert_eq!(line.original_qty, 1_200);
        assert_eq!(line.received_qty, 0);
        assert_eq!(line.pallets, 3);
        assert_eq!(line.remaining(), 1_200);
        assert_eq!(line.expected_qty(), 1_200);
    }

    #[test]
    fn edited_quantity_is_expected_up_to_remaining() {
        let mut line = OrderLine::submitted(
            OrderLineId::generate(),
            SkuName::new("lid").unwrap(),
            1_000,
            500,
        );
        line.received_qty = 700;
        line.set_qty(500);
        assert_eq!(line.expected_qty(), 300);

        line.edited = true;
        assert_eq!(line.expected_qty(), 300);
        line.set_qty(200);
        assert_eq!(line.expected_qty(), 200);
    }

    #[test]
    fn status_predicates() {
        assert!(LineStatus::Partial.is_open());
        assert!(!LineStatus::Pending.is_open());
        assert!(LineStatus::Archived.is_settled());
        assert!(!LineStatus::Submitted.is_settled());
        assert_eq!(LineStatus::Received.to_string(), "received");
    }
}

//! Receipt pass: the per-line proposals a receiver edits before committing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use packflow_core::DomainError;
use packflow_inventory::SkuName;

use crate::line::OrderLineId;
use crate::order::{LineReceipt, PurchaseOrder, ReceiveGoods};

/// Soft warning raised by a receipt pass. Needs confirmation, not correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReceiptWarning {
    /// A line's receipt quantity differs from what was expected.
    QuantityChanged {
        sku: SkuName,
        initial_qty: i64,
        qty: i64,
    },
    /// Open lines left out of the pass will be marked partial.
    PartialOrder { unselected: Vec<SkuName> },
}

impl core::fmt::Display for ReceiptWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReceiptWarning::QuantityChanged {
                sku,
                initial_qty,
                qty,
            } => write!(f, "{sku}: receiving {qty} instead of the {initial_qty} expected"),
            ReceiptWarning::PartialOrder { unselected } => {
                let names: Vec<&str> = unselected.iter().map(SkuName::as_str).collect();
                write!(f, "lines not received will be marked partial: {}", names.join(", "))
            }
        }
    }
}

/// One open line as proposed for receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptProposal {
    pub line_id: OrderLineId,
    pub sku: SkuName,
    /// Expected quantity when the pass was opened.
    pub initial_qty: i64,
    pub qty: i64,
    pub selected: bool,
}

impl ReceiptProposal {
    pub fn is_changed(&self) -> bool {
        self.qty != self.initial_qty
    }
}

/// Working state for one receipt pass over an order.
///
/// Opening a pass proposes every open line at its expected quantity (see
/// [`OrderLine::expected_qty`](crate::OrderLine::expected_qty)), all selected.
/// Nothing is validated here; the order re-checks everything when the resulting
/// [`ReceiveGoods`] command is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPass {
    order: PurchaseOrder,
    proposals: Vec<ReceiptProposal>,
}

impl ReceiptPass {
    pub fn open(order: &PurchaseOrder) -> Self {
        let proposals = order
            .lines()
            .iter()
            .filter(|l| l.status.is_open())
            .map(|l| ReceiptProposal {
                line_id: l.id,
                sku: l.sku.clone(),
                initial_qty: l.expected_qty(),
                qty: l.expected_qty(),
                selected: true,
            })
            .collect();

        Self {
            order: order.clone(),
            proposals,
        }
    }

    pub fn proposals(&self) -> &[ReceiptProposal] {
        &self.proposals
    }

    pub fn select(&mut self, line_id: OrderLineId) -> Result<(), DomainError> {
        self.proposal_mut(line_id)?.selected = true;
        Ok(())
    }

    pub fn deselect(&mut self, line_id: OrderLineId) -> Result<(), DomainError> {
        self.proposal_mut(line_id)?.selected = false;
        Ok(())
    }

    /// Set the units arriving for a line in this pass.
    pub fn set_qty(&mut self, line_id: OrderLineId, qty: i64) -> Result<(), DomainError> {
        self.proposal_mut(line_id)?.qty = qty;
        Ok(())
    }

    pub fn selected(&self) -> Vec<LineReceipt> {
        self.proposals
            .iter()
            .filter(|p| p.selected)
            .map(|p| LineReceipt {
                line_id: p.line_id,
                qty: p.qty,
            })
            .collect()
    }

    /// Warnings the caller must confirm before committing.
    pub fn warnings(&self) -> Vec<ReceiptWarning> {
        self.order.receipt_warnings(&self.selected())
    }

    pub fn into_command(
        self,
        confirmed: bool,
        delivered_on: NaiveDate,
        occurred_at: DateTime<Utc>,
    ) -> ReceiveGoods {
        ReceiveGoods {
            order_id: self.order.order_id(),
            lines: self.selected(),
            confirmed,
            delivered_on,
            occurred_at,
        }
    }

    fn proposal_mut(&mut self, line_id: OrderLineId) -> Result<&mut ReceiptProposal, DomainError> {
        self.proposals
            .iter_mut()
            .find(|p| p.line_id == line_id)
            .ok_or_else(|| {
                DomainError::validation(format!("line {line_id} is not open for receipt"))
            })
    }
}

//! Purchasing domain module (order drafts, purchase orders, receipt passes).
//!
//! This crate contains business rules for purchase orders, implemented purely as
//! deterministic domain logic (no IO, no storage).

pub mod draft;
pub mod line;
pub mod order;
pub mod receipt;

pub use draft::{DraftLine, OrderDraft, QuantityClamp};
pub use line::{LineStatus, OrderLine, OrderLineId};
pub use order::{
    Archive, CreatePurchaseOrder, EditLineQuantity, GroupStatus, LineArchived, LineMarkedPartial,
    LineQuantityEdited, LineReceipt, LineReceived, NewOrderLine, OrderSnapshot, PurchaseOrder,
    PurchaseOrderCommand, PurchaseOrderCreated, PurchaseOrderEvent, PurchaseOrderId, ReceiveGoods,
    roll_up,
};
pub use receipt::{ReceiptPass, ReceiptProposal, ReceiptWarning};

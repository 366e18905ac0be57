use chrono::{DateTime, Utc};

/// A recorded domain fact (inventory counter change, order line transition).
///
/// Aggregates emit events from `handle` and evolve only by applying them, so the
/// event list of a command is exactly what the stores must persist.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name, e.g. `"purchasing.order.line_received"`.
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;

    /// What the event is about (a SKU, an order, an order line), for logs.
    fn subject(&self) -> String;
}

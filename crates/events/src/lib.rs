//! Domain events emitted by the purchasing and inventory aggregates.

pub mod event;

pub use event::Event;

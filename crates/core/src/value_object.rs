//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values.
/// `SkuName` and `CapacityUsage` are the main ones in this workspace: two
/// SKU names with the same text are the same SKU, regardless of where they
/// were read from.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

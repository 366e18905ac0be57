//! Entity trait: identity inside an aggregate.

/// An object with its own identity nested inside an aggregate (order lines).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Human-facing name used when reporting problems with this entity.
    fn label(&self) -> &str;
}

//! Structural addressing for live component instances
//!
//! A [`Selection`] is the stable identity of one mounted component instance:
//! its declared id, the replication-key path that produced it (for
//! list-repeated children), and the chain of composite roots it was
//! instantiated under. Selections key the registry and the override maps, so
//! the UID derived here must stay injective over structurally distinct
//! selections.

mod equality;
mod selection;

pub use equality::selections_equal;
pub use selection::{ReplicationKey, Selection};

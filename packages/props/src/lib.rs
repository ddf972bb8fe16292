//! Property model for the viewbridge runtime
//!
//! Components rendered inside the canvas never read their props directly
//! from source: every instance's effective props are the deterministic
//! composition of its private defaults, the override chain addressed at its
//! selection, and its declared props. This crate owns that composition:
//!
//! - [`value`]: the `PropValue` data model (plain JSON scalars,
//!   style-bearing values, late-bound functions) and the `PropsBundle`
//!   threaded parent to child at instantiation
//! - [`merge`]: the pure merge engine (`merge_value`, `merge_variant_set`,
//!   `merge_props`, `merge_override_maps`)
//! - [`overrides`]: override-chain resolution and the effective-props fold
//! - [`factory`]: child selection derivation and bundle construction
//! - [`flow`]: flow-prop (children) composition and variant helpers
//! - [`classnames`]: the per-context unique class-name allocator

pub mod classnames;
pub mod factory;
pub mod flow;
pub mod merge;
pub mod overrides;
pub mod value;

pub use classnames::ClassNameAllocator;
pub use factory::{build_props_bundle, next_child_selection, ChildInstantiation};
pub use flow::{has_variant, resolve_children, variant_list, ChildrenValue};
pub use merge::{merge_override_maps, merge_props, merge_value, merge_variant_set};
pub use overrides::{compute_effective_props, resolve_overrides_for};
pub use value::{
    BindScope, FlowProps, FuncValue, OverrideContribution, OverrideFn, Overrides, PropValue,
    Props, PropsBundle, StyleValue, VariantMap,
};

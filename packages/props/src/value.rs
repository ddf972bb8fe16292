//! Prop value data model
//!
//! Prop values are dynamic: most are plain JSON scalars, style props carry a
//! class name plus a style map and compose instead of replacing each other,
//! and function-valued props stay late-bound so they can resolve data-flow
//! references at call time against the instance's `{masterProps, flowProps}`
//! scope.

use crate::merge;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use viewbridge_selection::Selection;

/// Ambient data-flow values threaded alongside props.
pub type FlowProps = serde_json::Map<String, Value>;

/// Call-time scope handed to late-bound prop functions and bind resolution.
#[derive(Debug, Clone, Default)]
pub struct BindScope {
    pub master_props: Value,
    pub flow_props: Value,
}

impl BindScope {
    pub fn new(master_props: Value, flow_props: Value) -> Self {
        Self {
            master_props,
            flow_props,
        }
    }
}

/// A style-bearing value: a class-name list plus a shallow style map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleValue {
    pub class_name: String,
    pub style: serde_json::Map<String, Value>,
}

impl StyleValue {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            style: serde_json::Map::new(),
        }
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }
}

/// Late-bound prop function. Invoked with the instance's bind scope when the
/// prop is actually read, never during merging.
pub type PropFn = Rc<dyn Fn(&BindScope) -> Value>;

/// A function-valued prop together with its source label. The label stands
/// in for the function body when the value crosses the wire.
#[derive(Clone)]
pub struct FuncValue {
    pub source: String,
    func: PropFn,
}

impl FuncValue {
    pub fn new(source: impl Into<String>, func: PropFn) -> Self {
        Self {
            source: source.into(),
            func,
        }
    }

    pub fn call(&self, scope: &BindScope) -> Value {
        (self.func)(scope)
    }
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncValue")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FuncValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

/// One prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Plain JSON value; merging is last-write-wins.
    Scalar(Value),
    /// Style-bearing value; merging composes class names and style maps.
    Style(StyleValue),
    /// Late-bound function of the instance's bind scope.
    Func(FuncValue),
}

impl PropValue {
    pub fn scalar(value: impl Into<Value>) -> Self {
        PropValue::Scalar(value.into())
    }

    /// Resolves the value for reading: scalars pass through, style values
    /// stay structured, functions are invoked against the scope.
    pub fn resolve(&self, scope: &BindScope) -> Value {
        match self {
            PropValue::Scalar(v) => v.clone(),
            PropValue::Style(style) => {
                let mut obj = serde_json::Map::new();
                obj.insert("className".into(), Value::String(style.class_name.clone()));
                obj.insert("style".into(), Value::Object(style.style.clone()));
                Value::Object(obj)
            }
            PropValue::Func(func) => func.call(scope),
        }
    }
}

/// Ordered variant map: variant name → truthy flag, preserving first
/// insertion order so merged output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantMap {
    entries: Vec<(String, bool)>,
}

impl VariantMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a flag, keeping the name's original position when it was
    /// already present.
    pub fn set(&mut self, name: impl Into<String>, on: bool) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = on,
            None => self.entries.push((name, on)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, on: bool) -> Self {
        self.set(name, on);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(n, on)| (n.as_str(), *on))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An override-prop function: receives the accumulated props so far and
/// returns the contribution to merge on top.
pub type OverrideFn = Rc<dyn Fn(&Props) -> Props>;

/// One layer of an override chain.
#[derive(Clone)]
pub enum OverrideContribution {
    /// A plain props object merged on top of the accumulator.
    Props(Rc<Props>),
    /// A function of the accumulator; its result is merged on top.
    Func(OverrideFn),
}

impl OverrideContribution {
    pub fn props(props: Props) -> Self {
        OverrideContribution::Props(Rc::new(props))
    }

    pub fn func(f: OverrideFn) -> Self {
        OverrideContribution::Func(f)
    }

    /// Applies this contribution to the accumulated props.
    pub fn apply(&self, acc: &Props) -> Props {
        match self {
            OverrideContribution::Props(props) => merge::merge_props(acc, [props.as_ref()]),
            OverrideContribution::Func(f) => {
                let produced = f(acc);
                merge::merge_props(acc, [&produced])
            }
        }
    }
}

impl fmt::Debug for OverrideContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideContribution::Props(props) => f.debug_tuple("Props").field(props).finish(),
            OverrideContribution::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Override map: dotted path id → ordered override chain for the matching
/// instance, outermost-declared first.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: BTreeMap<String, Vec<OverrideContribution>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path_id: impl Into<String>, contribution: OverrideContribution) {
        self.entries
            .entry(path_id.into())
            .or_default()
            .push(contribution);
    }

    pub fn with(mut self, path_id: impl Into<String>, contribution: OverrideContribution) -> Self {
        self.insert(path_id, contribution);
        self
    }

    pub fn get(&self, path_id: &str) -> Option<&[OverrideContribution]> {
        self.entries.get(path_id).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[OverrideContribution])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn append(&mut self, path_id: &str, contributions: &[OverrideContribution]) {
        self.entries
            .entry(path_id.to_string())
            .or_default()
            .extend(contributions.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-keys every bare path under the given root-instance prefix. Used by
    /// the factory so overrides declared several composite boundaries up
    /// still address the right descendant unambiguously.
    pub fn qualified_under(&self, root_instances: &[String]) -> Overrides {
        if root_instances.is_empty() {
            return self.clone();
        }

        let prefix = root_instances.join(".");
        let entries = self
            .entries
            .iter()
            .map(|(path, chain)| (format!("{}.{}", prefix, path), chain.clone()))
            .collect();
        Overrides { entries }
    }
}

/// The data threaded parent→child at instantiation. Created fresh by the
/// factory per child; never mutated afterwards, and ancestors keep no
/// reference to it.
#[derive(Debug, Clone)]
pub struct PropsBundle {
    /// The child's structural address.
    pub selection: Selection,

    /// Marks a composite/entry boundary: children of an entry bundle start
    /// a fresh root-instance path.
    pub entry: bool,

    /// Ambient top-of-tree props snapshot.
    pub master_props: Value,

    /// Ambient data-flow values.
    pub flow_props: FlowProps,

    /// Override map inherited down the ancestor chain.
    pub overrides: Overrides,
}

impl PropsBundle {
    /// Bundle for a composite/entry root. Its children start a fresh
    /// root-instance path.
    pub fn entry_root(selection: Selection) -> Self {
        Self {
            selection,
            entry: true,
            master_props: Value::Null,
            flow_props: FlowProps::new(),
            overrides: Overrides::new(),
        }
    }

    pub fn with_master_props(mut self, master_props: Value) -> Self {
        self.master_props = master_props;
        self
    }

    pub fn with_flow_props(mut self, flow_props: FlowProps) -> Self {
        self.flow_props = flow_props;
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// The call-time scope for this bundle's late-bound functions.
    pub fn bind_scope(&self) -> BindScope {
        BindScope::new(
            self.master_props.clone(),
            Value::Object(self.flow_props.clone()),
        )
    }
}

/// A partial prop set. `variants` and the nested bundle get type-aware merge
/// treatment; everything else lives in `values` and merges per key.
#[derive(Debug, Clone, Default)]
pub struct Props {
    /// Resolved variant names, in declaration order.
    pub variants: Vec<String>,

    /// The nested props bundle (selection/overrides linkage), when present.
    pub bundle: Option<PropsBundle>,

    /// All remaining props by name.
    pub values: BTreeMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: PropValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with_variants(mut self, variants: Vec<String>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_bundle(mut self, bundle: PropsBundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Resolves a prop for reading, late-binding functions to the scope.
    pub fn resolve(&self, name: &str, scope: &BindScope) -> Option<Value> {
        self.values.get(name).map(|v| v.resolve(scope))
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty() && self.bundle.is_none() && self.values.is_empty()
    }
}

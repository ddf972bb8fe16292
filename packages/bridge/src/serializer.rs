//! Reference-safe payload serialization
//!
//! Prop graphs can share override contributions through the bundle chain,
//! and function-valued props have no JSON form. The walker here turns a
//! prop set into a plain `serde_json::Value`: repeated shared references are
//! emitted once and omitted afterwards, functions serialize as their source
//! label, and host element handles are replaced by a short tag string.

use crate::geometry::ElementRef;
use serde_json::Value;
use std::collections::HashSet;
use std::rc::Rc;
use viewbridge_props::{OverrideContribution, Overrides, PropValue, Props, PropsBundle};

/// Walks prop graphs into JSON, deduplicating shared references within one
/// walk.
#[derive(Default)]
pub struct PayloadSerializer {
    seen: HashSet<usize>,
}

impl PayloadSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a full prop set.
    pub fn props(&mut self, props: &Props) -> Value {
        let mut obj = serde_json::Map::new();

        if !props.variants.is_empty() {
            obj.insert(
                "variants".into(),
                Value::Array(
                    props
                        .variants
                        .iter()
                        .map(|v| Value::String(v.clone()))
                        .collect(),
                ),
            );
        }

        if let Some(bundle) = &props.bundle {
            obj.insert("bundle".into(), self.bundle(bundle));
        }

        for (name, value) in &props.values {
            obj.insert(name.clone(), self.prop_value(value));
        }

        Value::Object(obj)
    }

    fn prop_value(&mut self, value: &PropValue) -> Value {
        match value {
            PropValue::Scalar(v) => v.clone(),
            PropValue::Style(style) => {
                let mut obj = serde_json::Map::new();
                obj.insert("className".into(), Value::String(style.class_name.clone()));
                obj.insert("style".into(), Value::Object(style.style.clone()));
                Value::Object(obj)
            }
            // no JSON form; the source label stands in for the body
            PropValue::Func(func) => Value::String(func.source.clone()),
        }
    }

    fn bundle(&mut self, bundle: &PropsBundle) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "selection".into(),
            serde_json::to_value(&bundle.selection).unwrap_or(Value::Null),
        );
        obj.insert("entry".into(), Value::Bool(bundle.entry));
        obj.insert("masterProps".into(), bundle.master_props.clone());
        obj.insert("flowProps".into(), Value::Object(bundle.flow_props.clone()));
        obj.insert("overrides".into(), self.overrides(&bundle.overrides));
        Value::Object(obj)
    }

    fn overrides(&mut self, overrides: &Overrides) -> Value {
        let mut obj = serde_json::Map::new();

        for (path_id, chain) in overrides.iter() {
            let serialized: Vec<Value> = chain
                .iter()
                .map(|contribution| self.contribution(contribution))
                .collect();
            obj.insert(path_id.to_string(), Value::Array(serialized));
        }

        Value::Object(obj)
    }

    fn contribution(&mut self, contribution: &OverrideContribution) -> Value {
        match contribution {
            OverrideContribution::Props(shared) => {
                let address = Rc::as_ptr(shared) as usize;
                if !self.seen.insert(address) {
                    // already emitted in this walk
                    return Value::Null;
                }
                self.props(shared)
            }
            OverrideContribution::Func(_) => Value::String("[override fn]".into()),
        }
    }
}

/// Wire replacement for a host element handle.
pub fn element_tag(element: &dyn ElementRef) -> Value {
    Value::String(format!("<{}>", element.tag()))
}

//! Flow-prop composition and variant helpers
//!
//! Children-valued props are late-bound: the parent hands the child a
//! function of `(flow_props, key, selection)` so repeated children can see
//! their own flow values. Resolving merges any new flow props over the
//! inherited ones (incoming wins) before invoking.

use crate::value::{FlowProps, VariantMap};
use serde_json::Value;
use std::rc::Rc;
use viewbridge_selection::Selection;

/// Render callback for a children-valued prop.
pub type ChildrenFn = Rc<dyn Fn(&FlowProps, Option<&str>, &Selection) -> Value>;

/// A children-valued prop: either static content or a render callback.
#[derive(Clone)]
pub enum ChildrenValue {
    Static(Value),
    Render(ChildrenFn),
}

impl std::fmt::Debug for ChildrenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildrenValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ChildrenValue::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// Resolves a children-valued prop. Missing values resolve to `null`,
/// static values pass through, and render callbacks are invoked with the
/// merged flow props.
pub fn resolve_children(
    value: Option<&ChildrenValue>,
    selection: &Selection,
    flow_props: &FlowProps,
    new_flow_props: Option<&FlowProps>,
    key: Option<&str>,
) -> Value {
    let merged;
    let effective = match new_flow_props {
        Some(incoming) => {
            let mut map = flow_props.clone();
            for (name, val) in incoming {
                map.insert(name.clone(), val.clone());
            }
            merged = map;
            &merged
        }
        None => flow_props,
    };

    match value {
        None => Value::Null,
        Some(ChildrenValue::Static(v)) => v.clone(),
        Some(ChildrenValue::Render(render)) => render(effective, key, selection),
    }
}

/// Extracts the truthy variant names of a map, in insertion order.
pub fn variant_list(map: &VariantMap) -> Vec<String> {
    map.iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Whether a resolved variant list contains the given variant.
pub fn has_variant(variants: &[String], variant: &str) -> bool {
    variants.iter().any(|v| v == variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_children_resolve_to_null() {
        let selection = Selection::entry("list");
        let result = resolve_children(None, &selection, &FlowProps::new(), None, None);
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_static_children_pass_through() {
        let selection = Selection::entry("list");
        let value = ChildrenValue::Static(json!("hello"));
        let result = resolve_children(Some(&value), &selection, &FlowProps::new(), None, None);
        assert_eq!(result, json!("hello"));
    }

    #[test]
    fn test_render_sees_merged_flow_props() {
        let selection = Selection::entry("list");

        let mut inherited = FlowProps::new();
        inherited.insert("user".into(), json!("ada"));
        inherited.insert("row".into(), json!(0));

        let mut incoming = FlowProps::new();
        incoming.insert("row".into(), json!(3));

        let value = ChildrenValue::Render(Rc::new(|flow, key, sel| {
            json!({
                "user": flow["user"],
                "row": flow["row"],
                "key": key,
                "id": sel.id,
            })
        }));

        let result = resolve_children(
            Some(&value),
            &selection,
            &inherited,
            Some(&incoming),
            Some("row-3"),
        );
        assert_eq!(
            result,
            json!({"user": "ada", "row": 3, "key": "row-3", "id": "list"})
        );
    }

    #[test]
    fn test_variant_helpers() {
        let map = VariantMap::new()
            .with("hover", true)
            .with("disabled", false)
            .with("active", true);
        let list = variant_list(&map);
        assert_eq!(list, vec!["hover", "active"]);
        assert!(has_variant(&list, "hover"));
        assert!(!has_variant(&list, "disabled"));
    }
}

//! Property merge engine
//!
//! Pure, total functions. Merging is a left-to-right fold where absent
//! inputs retain the prior value, style-bearing values compose, `variants`
//! union-append, nested bundles deep-merge their override maps, and
//! everything else is last-write-wins. Colliding override-map entries always
//! resolve incoming-wins: the later map's chain is appended after the
//! existing one, so it lands later in the effective-props fold.

use crate::value::{Overrides, PropValue, Props, PropsBundle, StyleValue, VariantMap};

/// Left-to-right value fold. `None` inputs are skipped (the prior value is
/// retained); when both the current and the incoming values are
/// style-bearing the two compose; otherwise the last defined value wins.
pub fn merge_value<I>(first: Option<PropValue>, rest: I) -> Option<PropValue>
where
    I: IntoIterator<Item = Option<PropValue>>,
{
    let mut result = first;

    for next in rest {
        let Some(next) = next else {
            continue;
        };

        result = Some(match (result.take(), next) {
            (Some(PropValue::Style(prev)), PropValue::Style(incoming)) => {
                PropValue::Style(compose_styles(&prev, &incoming))
            }
            (_, incoming) => incoming,
        });
    }

    result
}

/// Class-name concatenation with de-duplication plus shallow style-map
/// union, incoming wins per style key.
fn compose_styles(prev: &StyleValue, incoming: &StyleValue) -> StyleValue {
    let mut class_names: Vec<&str> = Vec::new();
    for token in prev
        .class_name
        .split_whitespace()
        .chain(incoming.class_name.split_whitespace())
    {
        if !class_names.contains(&token) {
            class_names.push(token);
        }
    }

    let mut style = prev.style.clone();
    for (property, value) in &incoming.style {
        style.insert(property.clone(), value.clone());
    }

    StyleValue {
        class_name: class_names.join(" "),
        style,
    }
}

/// Merges variant maps, later maps overriding earlier per key, and returns
/// the names whose final flag is truthy in merged key-insertion order.
pub fn merge_variant_set<'a, I>(maps: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a VariantMap>,
{
    let mut merged = VariantMap::new();
    for map in maps {
        for (name, on) in map.iter() {
            merged.set(name, on);
        }
    }

    merged
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Merges prop sets left to right. See the module docs for the per-key
/// rules.
pub fn merge_props<'a, I>(first: &Props, rest: I) -> Props
where
    I: IntoIterator<Item = &'a Props>,
{
    let mut result = first.clone();
    for next in rest {
        merge_into(&mut result, next);
    }
    result
}

fn merge_into(result: &mut Props, next: &Props) {
    // variants: union-append, prior order first
    for name in &next.variants {
        if !result.variants.contains(name) {
            result.variants.push(name.clone());
        }
    }

    // nested bundle: deep-merge with override-map sub-merge
    result.bundle = match (result.bundle.take(), next.bundle.as_ref()) {
        (Some(prev), Some(incoming)) => Some(merge_bundles(prev, incoming)),
        (prev, incoming) => incoming.cloned().or(prev),
    };

    // everything else
    for (name, value) in &next.values {
        let prev = result.values.remove(name);
        if let Some(merged) = merge_value(prev, [Some(value.clone())]) {
            result.values.insert(name.clone(), merged);
        }
    }
}

/// Incoming wins per field; override maps merge per path key.
fn merge_bundles(prev: PropsBundle, incoming: &PropsBundle) -> PropsBundle {
    PropsBundle {
        selection: incoming.selection.clone(),
        entry: incoming.entry,
        master_props: incoming.master_props.clone(),
        flow_props: incoming.flow_props.clone(),
        overrides: merge_override_maps(&prev.overrides, [&incoming.overrides]),
    }
}

/// Merges override maps. Colliding path ids append the incoming chain after
/// the existing one (canonical incoming-wins precedence).
pub fn merge_override_maps<'a, I>(first: &Overrides, rest: I) -> Overrides
where
    I: IntoIterator<Item = &'a Overrides>,
{
    let mut result = first.clone();
    for next in rest {
        for (path_id, chain) in next.iter() {
            result.append(path_id, chain);
        }
    }
    result
}

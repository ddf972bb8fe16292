//! Override-chain resolution and the effective-props fold
//!
//! Overrides are addressed by a selection's dotted path id
//! (`rootInstances.join('.') + '.' + id`, bare id at the root). The fold
//! order is deliberate: overrides are *base* layers and the instance's
//! directly declared props are applied last, so an explicit local prop still
//! wins over an IDE-pushed override unless the override function itself
//! forwards or augments the declared value.

use crate::merge::merge_props;
use crate::value::{OverrideContribution, Overrides, Props};
use viewbridge_selection::Selection;

/// Looks up the override chain applicable to a selection. Returns `None`
/// when no entry is addressed at its path id.
pub fn resolve_overrides_for<'a>(
    selection: &Selection,
    overrides: &'a Overrides,
) -> Option<&'a [OverrideContribution]> {
    overrides.get(&selection.path_id())
}

/// Folds `[private_defaults, ...resolved, declared]` through the merge
/// engine against an empty accumulator.
pub fn compute_effective_props(
    private_defaults: &Props,
    declared: &Props,
    resolved: Option<&[OverrideContribution]>,
) -> Props {
    let mut acc = merge_props(&Props::new(), [private_defaults]);

    if let Some(chain) = resolved {
        for contribution in chain {
            acc = contribution.apply(&acc);
        }
    }

    merge_props(&acc, [declared])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BindScope, FuncValue, PropValue};
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    fn labeled(label: &str) -> Props {
        Props::new().with_value("label", PropValue::scalar(label))
    }

    #[test]
    fn test_path_id_qualification() {
        let rooted = Selection::new("Y", vec!["X".to_string()], vec![]);
        let overrides = Overrides::new()
            .with("X.Y", OverrideContribution::props(labeled("qualified")))
            .with("Y", OverrideContribution::props(labeled("bare")));

        let chain = resolve_overrides_for(&rooted, &overrides).unwrap();
        let folded = chain
            .iter()
            .fold(Props::new(), |acc, c| c.apply(&acc));
        assert_eq!(folded.get("label"), Some(&PropValue::scalar("qualified")));

        let bare = Selection::entry("Y");
        let chain = resolve_overrides_for(&bare, &overrides).unwrap();
        let folded = chain
            .iter()
            .fold(Props::new(), |acc, c| c.apply(&acc));
        assert_eq!(folded.get("label"), Some(&PropValue::scalar("bare")));
    }

    #[test]
    fn test_no_entry_resolves_to_none() {
        let selection = Selection::entry("missing");
        assert!(resolve_overrides_for(&selection, &Overrides::new()).is_none());
    }

    #[test]
    fn test_declared_props_win_over_overrides() {
        let defaults = labeled("default");
        let declared = labeled("declared");
        let chain = vec![OverrideContribution::props(labeled("override"))];

        let effective = compute_effective_props(&defaults, &declared, Some(&chain));
        assert_eq!(effective.get("label"), Some(&PropValue::scalar("declared")));
    }

    #[test]
    fn test_override_fills_gaps_in_declared() {
        let defaults = Props::new();
        let declared = labeled("declared");
        let chain = vec![OverrideContribution::props(
            Props::new().with_value("tooltip", PropValue::scalar("from override")),
        )];

        let effective = compute_effective_props(&defaults, &declared, Some(&chain));
        assert_eq!(effective.get("label"), Some(&PropValue::scalar("declared")));
        assert_eq!(
            effective.get("tooltip"),
            Some(&PropValue::scalar("from override"))
        );
    }

    #[test]
    fn test_override_fn_runs_before_declared_fold() {
        let invoked = Rc::new(Cell::new(false));
        let invoked_probe = invoked.clone();

        let chain = vec![OverrideContribution::func(Rc::new(move |acc: &Props| {
            invoked_probe.set(true);
            // the accumulator has not seen declared props yet
            assert!(acc.get("on_click").is_none());
            Props::new().with_value("badge", PropValue::scalar("new"))
        }))];

        let on_click = FuncValue::new(
            "handle_click",
            Rc::new(|_: &BindScope| Value::Null),
        );
        let declared = Props::new().with_value("on_click", PropValue::Func(on_click));

        let effective = compute_effective_props(&Props::new(), &declared, Some(&chain));

        assert!(invoked.get());
        // declared on_click is still reachable in the final props
        assert!(matches!(
            effective.get("on_click"),
            Some(PropValue::Func(_))
        ));
        assert_eq!(effective.get("badge"), Some(&PropValue::scalar("new")));
    }

    #[test]
    fn test_function_props_stay_late_bound() {
        let func = FuncValue::new(
            "flowProps.count",
            Rc::new(|scope: &BindScope| scope.flow_props["count"].clone()),
        );
        let declared = Props::new().with_value("count", PropValue::Func(func));

        let effective = compute_effective_props(&Props::new(), &declared, None);

        let scope = BindScope::new(Value::Null, json!({"count": 7}));
        assert_eq!(effective.resolve("count", &scope), Some(json!(7)));
    }
}

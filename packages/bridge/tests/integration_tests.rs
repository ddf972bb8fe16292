//! End-to-end tests across the selection, props, and bridge crates:
//! instantiation of a small composite tree, override resolution against
//! IDE-pushed contributions, and the full registry/transport loop.

use anyhow::Result;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use viewbridge_bridge::{
    Bridge, BridgeOptions, ElementBoxes, ElementRef, GeometryError, InboundMessage, Interactions,
    MessageTransport, Rect,
};
use viewbridge_props::{
    build_props_bundle, compute_effective_props, resolve_overrides_for, BindScope,
    ChildInstantiation, FlowProps, FuncValue, OverrideContribution, Overrides, PropValue, Props,
    PropsBundle,
};
use viewbridge_selection::{ReplicationKey, Selection};

#[derive(Default)]
struct RecordingTransport {
    payloads: RefCell<Vec<Value>>,
}

impl RecordingTransport {
    fn of_type(&self, message_type: &str) -> Vec<Value> {
        self.payloads
            .borrow()
            .iter()
            .filter(|p| p["type"] == json!(message_type))
            .cloned()
            .collect()
    }
}

impl MessageTransport for RecordingTransport {
    fn post(&self, payload: &str) {
        self.payloads
            .borrow_mut()
            .push(serde_json::from_str(payload).unwrap());
    }
}

struct StaticElement {
    rect: RefCell<Rect>,
}

impl StaticElement {
    fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: RefCell::new(rect),
        })
    }
}

impl ElementRef for StaticElement {
    fn boxes(&self) -> Result<ElementBoxes, GeometryError> {
        Ok(ElementBoxes {
            rect: *self.rect.borrow(),
            ..Default::default()
        })
    }
}

fn dev_bridge() -> (Bridge, Rc<RecordingTransport>) {
    let transport = Rc::new(RecordingTransport::default());
    let bridge = Bridge::new(
        BridgeOptions { dev_mode: true },
        Some(transport.clone()),
        None,
    );
    (bridge, transport)
}

/// A list item replicated under `card1` produces a child selection that
/// carries the repetition key but no composite roots, and its overrides are
/// addressed at the bare path id.
#[test]
fn test_replicated_child_instantiation() {
    let master = PropsBundle::entry_root(Selection::entry("card1"));
    let parent = Selection::entry("card1");

    let bundle = build_props_bundle(ChildInstantiation {
        instance_id: "btn1",
        master: &master,
        parent_selection: Some(&parent),
        replication_key: Some("row-3"),
        master_props: Value::Null,
        flow_props: FlowProps::new(),
        overrides: None,
    });

    assert_eq!(bundle.selection.id, "btn1");
    assert!(bundle.selection.root_instances.is_empty());
    assert_eq!(
        bundle.selection.keys,
        vec![ReplicationKey::new("card1", "row-3")]
    );
    assert_eq!(bundle.selection.uid(), "btn1.row-3");
}

/// Overrides passed down across a composite boundary address descendants by
/// root-qualified path, and declared props still win the final fold while a
/// declared function prop stays invocable.
#[test]
fn test_override_resolution_through_composite() {
    let card_selection = Selection::entry("card1");
    let card_bundle = PropsBundle {
        selection: card_selection.clone(),
        entry: false,
        master_props: Value::Null,
        flow_props: FlowProps::new(),
        overrides: Overrides::new(),
    };

    // the IDE pushes a label override addressed at the bare child id
    let pushed = Overrides::new().with(
        "btn1",
        OverrideContribution::props(
            Props::new()
                .with_value("label", PropValue::scalar("from ide"))
                .with_value("badge", PropValue::scalar(3)),
        ),
    );

    let child_bundle = build_props_bundle(ChildInstantiation {
        instance_id: "btn1",
        master: &card_bundle,
        parent_selection: Some(&card_selection),
        replication_key: None,
        master_props: Value::Null,
        flow_props: FlowProps::new(),
        overrides: Some(&pushed),
    });

    assert_eq!(child_bundle.selection.path_id(), "card1.btn1");

    let chain = resolve_overrides_for(&child_bundle.selection, &child_bundle.overrides)
        .expect("override chain addressed at the child");

    let clicked = Rc::new(RefCell::new(0));
    let clicked_probe = clicked.clone();
    let on_click = FuncValue::new(
        "handle_click",
        Rc::new(move |_: &BindScope| {
            *clicked_probe.borrow_mut() += 1;
            Value::Null
        }),
    );

    let declared = Props::new()
        .with_value("label", PropValue::scalar("declared"))
        .with_value("on_click", PropValue::Func(on_click));

    let effective = compute_effective_props(&Props::new(), &declared, Some(chain));

    // declared label wins; the pushed badge fills the gap
    assert_eq!(effective.get("label"), Some(&PropValue::scalar("declared")));
    assert_eq!(effective.get("badge"), Some(&PropValue::scalar(3)));

    // the declared handler is still reachable after the fold
    effective.resolve("on_click", &BindScope::default());
    assert_eq!(*clicked.borrow(), 1);
}

/// A tree move re-registers an equal selection before the old instance
/// unregisters; after both calls exactly the new entry remains.
#[test]
fn test_registry_survives_remount_race() {
    let (mut bridge, transport) = dev_bridge();
    let selection = Selection::entry("hero");

    bridge.register(
        selection.clone(),
        None,
        Props::new().with_value("generation", PropValue::scalar(1)),
    );
    bridge.register(
        selection.clone(),
        None,
        Props::new().with_value("generation", PropValue::scalar(2)),
    );
    bridge.unregister(&selection);

    assert_eq!(bridge.len(), 1);
    let survivor = bridge.find_by_selection(&selection, false).unwrap();
    assert_eq!(
        survivor.master_props.get("generation"),
        Some(&PropValue::scalar(2))
    );

    // the stale unregister never reached the wire
    assert!(transport.of_type("unregisterComponent").is_empty());
}

/// Rect updates are change-driven: repeated frames with stable geometry
/// produce one notification, and a move produces exactly one more.
#[test]
fn test_rect_tracking_notifies_once_per_change() {
    let (mut bridge, transport) = dev_bridge();
    let selection = Selection::entry("panel");
    bridge.register(selection.clone(), None, Props::new());

    let element = StaticElement::new(Rect::new(10.0, 10.0, 200.0, 80.0));
    bridge.set_reference(&selection, element.clone());

    for _ in 0..5 {
        bridge.frame_tick();
    }
    assert_eq!(transport.of_type("updateComponentRect").len(), 1);

    *element.rect.borrow_mut() = Rect::new(10.0, 90.0, 200.0, 80.0);
    for _ in 0..3 {
        bridge.frame_tick();
    }
    let updates = transport.of_type("updateComponentRect");
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1]["rect"]["rect"]["top"], json!(90.0));
}

/// The full bind-resolution loop: an inbound request batch resolves prop,
/// expression, and module binds against the instance's live scope and the
/// reply carries the selection uid.
#[test]
fn test_binds_resolve_loop() -> Result<()> {
    let (mut bridge, transport) = dev_bridge();
    let selection = Selection::new("item", vec![], vec![ReplicationKey::new("list", "7")]);
    bridge.register(selection.clone(), None, Props::new());
    bridge.update_inbound_props(&selection, json!({"price": 12, "currency": "EUR"}));
    bridge.register_module(
        "formatters/currency",
        Rc::new(|scope: &BindScope| {
            let price = scope.flow_props["price"].as_f64().unwrap_or_default();
            let currency = scope.flow_props["currency"].as_str().unwrap_or_default();
            Ok(json!(format!("{price} {currency}")))
        }),
    );

    let request = json!({
        "type": "request-binds-resolve",
        "selection": {"id": "item", "keys": [{"componentId": "list", "key": "7"}]},
        "binds": [
            {"type": "PROP", "path": "flowProps.price", "suffix": "!"},
            {"type": "EXPRESSION", "value": "flowProps.price > 10 ? 'premium' : 'basic'"},
            {"type": "MODULE", "path": "formatters/currency"},
            {"type": "MODULE", "path": "missing/module"},
        ],
    });
    bridge.handle_message(&request.to_string())?;

    let replies = transport.of_type("return-binds-resolve");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["selection"], json!("item.7"));

    let values = replies[0]["values"].as_array().unwrap();
    assert_eq!(values[0], json!("12!"));
    assert_eq!(values[1], json!("premium"));
    assert_eq!(values[2], json!("12 EUR"));
    assert_eq!(values[3]["kind"], json!("bind-error"));
    Ok(())
}

/// Editing mode arrives over the wire and gates pointer interactions; state
/// pushed from the IDE lands on the matching instance and is observable.
#[test]
fn test_editing_and_state_push() {
    struct Seen(RefCell<Vec<(String, Value)>>);
    impl viewbridge_bridge::StateListener for Seen {
        fn component_state_changed(&self, selection: &Selection, state: &Value) {
            self.0.borrow_mut().push((selection.uid(), state.clone()));
        }
    }

    let (mut bridge, transport) = dev_bridge();
    let seen = Rc::new(Seen(RefCell::new(Vec::new())));
    bridge.set_state_listener(seen.clone());

    let selection = Selection::entry("counter");
    bridge.register(selection.clone(), None, Props::new());

    assert!(!bridge.select(&selection));
    bridge.dispatch(InboundMessage::SetEditing { editing: true });
    assert!(bridge.select(&selection));
    assert_eq!(transport.of_type("selectComponent").len(), 1);

    bridge.dispatch(InboundMessage::SetComponentState {
        selection: selection.clone(),
        state: json!({"count": 9}),
    });
    assert_eq!(
        *seen.0.borrow(),
        vec![("counter".to_string(), json!({"count": 9}))]
    );
    assert_eq!(
        bridge.find_by_selection(&selection, false).unwrap().state,
        Some(json!({"count": 9}))
    );
}

/// Registration payloads survive the wire as plain JSON even when props
/// carry function values and a nested bundle.
#[test]
fn test_register_payload_serialization() {
    let (mut bridge, transport) = dev_bridge();

    let bundle = PropsBundle::entry_root(Selection::entry("app"))
        .with_master_props(json!({"theme": "dark"}));
    let props = Props::new()
        .with_value("label", PropValue::scalar("save"))
        .with_value(
            "on_click",
            PropValue::Func(FuncValue::new(
                "handle_save",
                Rc::new(|_: &BindScope| Value::Null),
            )),
        )
        .with_bundle(bundle);

    bridge.register(Selection::entry("btn1"), None, props);

    let registered = transport.of_type("registerComponent");
    assert_eq!(registered.len(), 1);
    let master_props = &registered[0]["masterProps"];
    assert_eq!(master_props["label"], json!("save"));
    assert_eq!(master_props["on_click"], json!("handle_save"));
    assert_eq!(master_props["bundle"]["entry"], json!(true));
    assert_eq!(master_props["bundle"]["masterProps"]["theme"], json!("dark"));
}

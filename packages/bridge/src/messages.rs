//! Message protocol between the canvas and the IDE
//!
//! Envelopes are JSON objects discriminated by a `type` field. Outbound
//! envelopes travel to the opener/parent frame through the host's
//! transport; inbound envelopes arrive on the same channel and are
//! dispatched by the bridge.

use crate::geometry::ElementBoxes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use viewbridge_selection::Selection;

/// Envelope sent canvas → IDE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    #[serde(rename_all = "camelCase")]
    RegisterComponent {
        selection: Selection,
        #[serde(skip_serializing_if = "Option::is_none")]
        parent_selection: Option<Selection>,
        master_props: Value,
    },

    UnregisterComponent {
        selection: Selection,
    },

    #[serde(rename_all = "camelCase")]
    ChangeComponentProp {
        selection: Selection,
        prop_name: String,
        value: Value,
    },

    OverComponent {
        selection: Selection,
    },

    OutComponent {
        selection: Selection,
    },

    SelectComponent {
        selection: Selection,
    },

    UnlockComponent {
        selection: Selection,
    },

    #[serde(rename_all = "camelCase")]
    OpenComponentContextMenu {
        selection: Selection,
        client_x: f64,
        client_y: f64,
    },

    #[serde(rename_all = "camelCase")]
    UpdateComponentOutboundProps {
        selection: Selection,
        prop_name: String,
        flow_props: Value,
    },

    #[serde(rename_all = "camelCase")]
    UpdateComponentInboundProps {
        selection: Selection,
        flow_props: Value,
    },

    UpdateComponentState {
        selection: Selection,
        state: Value,
    },

    UpdateComponentRect {
        selection: Selection,
        rect: ElementBoxes,
    },

    SetCanvasError {
        message: String,
    },

    /// Sent once at startup to ask the IDE for the current editing flag.
    GetEditing,

    /// Reply to a `request-binds-resolve`.
    #[serde(rename = "return-binds-resolve")]
    ReturnBindsResolve {
        selection: String,
        values: Vec<Value>,
    },
}

/// Envelope received IDE → canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    SetComponentState {
        selection: Selection,
        state: Value,
    },

    SetEditing {
        editing: bool,
    },

    #[serde(rename = "request-binds-resolve")]
    RequestBindsResolve {
        selection: Selection,
        binds: Vec<Bind>,
    },
}

/// A deferred, externally-resolvable reference evaluated against an
/// instance's `{flowProps, masterProps}` scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Bind {
    /// Dotted-path read, with an optional string suffix appended.
    #[serde(rename = "PROP")]
    Prop {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },

    /// Expression over the bind scope, evaluated by the sandboxed
    /// interpreter.
    #[serde(rename = "EXPRESSION")]
    Expression { value: String },

    /// Host-registered resolver looked up by path.
    #[serde(rename = "MODULE")]
    Module { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outbound_type_discriminators() {
        let msg = OutboundMessage::RegisterComponent {
            selection: Selection::entry("btn1"),
            parent_selection: None,
            master_props: Value::Null,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], json!("registerComponent"));
        assert_eq!(value["selection"]["id"], json!("btn1"));
        assert!(value.get("parentSelection").is_none());

        let msg = OutboundMessage::GetEditing;
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "getEditing"})
        );

        let msg = OutboundMessage::ReturnBindsResolve {
            selection: "btn1.row-3".into(),
            values: vec![json!(1)],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], json!("return-binds-resolve"));
    }

    #[test]
    fn test_context_menu_carries_client_coordinates() {
        let msg = OutboundMessage::OpenComponentContextMenu {
            selection: Selection::entry("btn1"),
            client_x: 120.5,
            client_y: 48.0,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["clientX"], json!(120.5));
        assert_eq!(value["clientY"], json!(48.0));
    }

    #[test]
    fn test_inbound_parses_wire_names() {
        let msg: InboundMessage = serde_json::from_value(json!({
            "type": "setEditing",
            "editing": true,
        }))
        .unwrap();
        assert!(matches!(msg, InboundMessage::SetEditing { editing: true }));

        let msg: InboundMessage = serde_json::from_value(json!({
            "type": "request-binds-resolve",
            "selection": {"id": "btn1"},
            "binds": [
                {"type": "PROP", "path": "flowProps.user.name", "suffix": "!"},
                {"type": "EXPRESSION", "value": "1 + 2"},
                {"type": "MODULE", "path": "formatters/currency"},
            ],
        }))
        .unwrap();

        let InboundMessage::RequestBindsResolve { binds, .. } = msg else {
            panic!("expected a binds-resolve request");
        };
        assert_eq!(binds.len(), 3);
        assert!(matches!(&binds[0], Bind::Prop { suffix: Some(s), .. } if s == "!"));
    }
}

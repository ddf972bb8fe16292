//! Component registry and IDE bridge
//!
//! One `Bridge` per canvas, owned by the host application and driven
//! synchronously: registration on mount, unregistration on unmount, one
//! `frame_tick` per animation frame, and inbound envelope dispatch. The
//! registry tolerates the mount/unmount ordering of tree moves: a
//! component that re-registers under an equal selection before its
//! predecessor unregisters supersedes it, and the stale unregister is
//! swallowed exactly once.

use crate::binds::{resolve_binds, ModuleRegistry, ModuleResolver};
use crate::geometry::{union_boxes, ElementBoxes, ElementRef};
use crate::inspector::{DebugChannel, Inspector};
use crate::messages::{InboundMessage, OutboundMessage};
use crate::serializer::PayloadSerializer;
use crate::transport::MessageTransport;
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, error};
use viewbridge_props::{BindScope, Props};
use viewbridge_selection::{selections_equal, Selection};

/// Pointer-interaction capability. Implemented by the bridge; the host
/// attaches these when it wires DOM listeners for a referenced element and
/// suppresses default handling whenever a hook reports the event consumed.
pub trait Interactions {
    fn hover_enter(&self, selection: &Selection) -> bool;
    fn hover_exit(&self, selection: &Selection) -> bool;
    fn select(&self, selection: &Selection) -> bool;
    fn unlock(&self, selection: &Selection) -> bool;
    fn open_context_menu(&self, selection: &Selection, client_x: f64, client_y: f64) -> bool;
}

/// Host hook observing externally-pushed component state.
pub trait StateListener {
    fn component_state_changed(&self, selection: &Selection, state: &Value);
}

/// One tracked instance.
pub struct RegisteredComponent {
    pub selection: Selection,
    pub parent_selection: Option<Selection>,
    pub master_props: Props,

    /// Flow props flowing out per named area.
    pub outbound_props: BTreeMap<String, Value>,

    /// Flow props flowing into this instance.
    pub inbound_props: Value,

    /// Externally-pushed local state, when any.
    pub state: Option<Value>,

    element: Option<Rc<dyn ElementRef>>,

    /// Named child references, for composites whose bounding box aggregates
    /// over fragments without a shared root node.
    child_refs: Vec<(String, Rc<dyn ElementRef>)>,

    last_boxes: Option<ElementBoxes>,

    /// Set when this entry superseded an equal-selection predecessor whose
    /// unregister call has not arrived yet.
    supersedes_pending_unregister: bool,
}

impl RegisteredComponent {
    fn new(selection: Selection, parent_selection: Option<Selection>, master_props: Props) -> Self {
        Self {
            selection,
            parent_selection,
            master_props,
            outbound_props: BTreeMap::new(),
            inbound_props: Value::Object(serde_json::Map::new()),
            state: None,
            element: None,
            child_refs: Vec::new(),
            last_boxes: None,
            supersedes_pending_unregister: false,
        }
    }

    pub fn has_element(&self) -> bool {
        self.element.is_some()
    }

    pub fn last_boxes(&self) -> Option<&ElementBoxes> {
        self.last_boxes.as_ref()
    }

    fn current_boxes(&self) -> Option<ElementBoxes> {
        if let Some(element) = &self.element {
            // a failed direct read contributes nothing this pass
            element.boxes().ok()
        } else if !self.child_refs.is_empty() {
            union_boxes(self.child_refs.iter().map(|(_, element)| element.boxes()))
        } else {
            None
        }
    }
}

/// Bridge construction options.
#[derive(Debug, Clone, Default)]
pub struct BridgeOptions {
    /// Messages are only ever sent in development mode.
    pub dev_mode: bool,
}

/// The canvas-side registry and message bridge.
pub struct Bridge {
    options: BridgeOptions,
    editing: bool,
    transport: Option<Rc<dyn MessageTransport>>,
    entries: Vec<RegisteredComponent>,
    modules: ModuleRegistry,
    debug: DebugChannel,
    state_listener: Option<Rc<dyn StateListener>>,
}

impl Bridge {
    /// Creates the bridge and asks the IDE for the current editing flag.
    pub fn new(
        options: BridgeOptions,
        transport: Option<Rc<dyn MessageTransport>>,
        inspector: Option<Rc<dyn Inspector>>,
    ) -> Self {
        let bridge = Self {
            options,
            editing: false,
            transport,
            entries: Vec::new(),
            modules: ModuleRegistry::new(),
            debug: DebugChannel::new(inspector),
            state_listener: None,
        };
        bridge.send(&OutboundMessage::GetEditing);
        bridge
    }

    pub fn set_state_listener(&mut self, listener: Rc<dyn StateListener>) {
        self.state_listener = Some(listener);
    }

    pub fn register_module(&mut self, path: impl Into<String>, resolver: ModuleResolver) {
        self.modules.register(path, resolver);
    }

    pub fn debug_channel(&mut self) -> &mut DebugChannel {
        &mut self.debug
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a mounted instance. An existing entry under an equal
    /// selection is removed first and the new entry marked as superseding
    /// it, so the predecessor's upcoming unregister is swallowed exactly
    /// once. New entries go to the front: traversal finds the freshest
    /// instance while duplicates transiently coexist.
    pub fn register(
        &mut self,
        selection: Selection,
        parent_selection: Option<Selection>,
        master_props: Props,
    ) {
        let superseded = match self.position(&selection, false) {
            Some(existing) => {
                self.entries.remove(existing);
                true
            }
            None => false,
        };

        let mut entry = RegisteredComponent::new(selection, parent_selection, master_props);
        entry.supersedes_pending_unregister = superseded;

        self.send(&OutboundMessage::RegisterComponent {
            selection: entry.selection.clone(),
            parent_selection: entry.parent_selection.clone(),
            master_props: PayloadSerializer::new().props(&entry.master_props),
        });

        self.entries.insert(0, entry);
    }

    /// Unregisters an instance. A superseding entry swallows the stale call
    /// for its predecessor and stays registered.
    pub fn unregister(&mut self, selection: &Selection) {
        let Some(index) = self.position(selection, false) else {
            return;
        };

        if self.entries[index].supersedes_pending_unregister {
            self.entries[index].supersedes_pending_unregister = false;
            debug!(uid = %selection.uid(), "swallowing stale unregister for superseded entry");
            return;
        }

        let entry = self.entries.remove(index);
        self.send(&OutboundMessage::UnregisterComponent {
            selection: entry.selection,
        });
    }

    pub fn find_by_selection(
        &self,
        selection: &Selection,
        ignore_keys: bool,
    ) -> Option<&RegisteredComponent> {
        self.entries
            .iter()
            .find(|entry| selections_equal(Some(&entry.selection), Some(selection), ignore_keys))
    }

    pub fn find_all_by_selection(
        &self,
        selection: &Selection,
        ignore_keys: bool,
    ) -> Vec<&RegisteredComponent> {
        self.entries
            .iter()
            .filter(|entry| {
                selections_equal(Some(&entry.selection), Some(selection), ignore_keys)
            })
            .collect()
    }

    /// Stores the element reference for an instance and records it as a
    /// named child reference on its parent entry.
    pub fn set_reference(&mut self, selection: &Selection, element: Rc<dyn ElementRef>) {
        let Some(index) = self.position(selection, false) else {
            return;
        };

        let child_uid = self.entries[index].selection.uid();
        self.entries[index].element = Some(element.clone());

        if let Some(parent_selection) = self.entries[index].parent_selection.clone() {
            if let Some(parent) = self.position(&parent_selection, false) {
                let refs = &mut self.entries[parent].child_refs;
                match refs.iter_mut().find(|(uid, _)| *uid == child_uid) {
                    Some(slot) => slot.1 = element,
                    None => refs.push((child_uid, element)),
                }
            }
        }
    }

    /// Clears the element reference and the parent's record of it.
    pub fn clear_reference(&mut self, selection: &Selection) {
        let Some(index) = self.position(selection, false) else {
            return;
        };

        let child_uid = self.entries[index].selection.uid();
        self.entries[index].element = None;

        if let Some(parent_selection) = self.entries[index].parent_selection.clone() {
            if let Some(parent) = self.position(&parent_selection, false) {
                self.entries[parent]
                    .child_refs
                    .retain(|(uid, _)| *uid != child_uid);
            }
        }
    }

    /// Rechecks one instance's geometry; emits `updateComponentRect` only
    /// when the shallow-compared box changed since the last pass.
    pub fn update_rect(&mut self, selection: &Selection) {
        if let Some(index) = self.position(selection, false) {
            if let Some(message) = self.recheck_rect(index) {
                self.send(&message);
            }
        }
    }

    /// Per-animation-frame pass: rechecks every registered instance's rect
    /// and commits pending debug-scope drops. Idempotent and O(entries).
    pub fn frame_tick(&mut self) {
        let mut outgoing = Vec::new();
        for index in 0..self.entries.len() {
            if let Some(message) = self.recheck_rect(index) {
                outgoing.push(message);
            }
        }
        for message in &outgoing {
            self.send(message);
        }

        self.debug.commit_drops();
    }

    fn recheck_rect(&mut self, index: usize) -> Option<OutboundMessage> {
        let entry = &self.entries[index];
        let boxes = entry.current_boxes()?;

        if entry.last_boxes == Some(boxes) {
            return None;
        }

        self.entries[index].last_boxes = Some(boxes);
        Some(OutboundMessage::UpdateComponentRect {
            selection: self.entries[index].selection.clone(),
            rect: boxes,
        })
    }

    /// Parses and dispatches one inbound envelope.
    pub fn handle_message(&mut self, raw: &str) -> Result<(), serde_json::Error> {
        let message: InboundMessage = serde_json::from_str(raw)?;
        self.dispatch(message);
        Ok(())
    }

    pub fn dispatch(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::SetComponentState { selection, state } => {
                if let Some(index) = self.position(&selection, false) {
                    self.entries[index].state = Some(state.clone());
                    if let Some(listener) = &self.state_listener {
                        listener.component_state_changed(&selection, &state);
                    }
                }
            }
            InboundMessage::SetEditing { editing } => {
                self.editing = editing;
            }
            InboundMessage::RequestBindsResolve { selection, binds } => {
                let scope = self
                    .find_by_selection(&selection, false)
                    .map(|entry| {
                        BindScope::new(
                            PayloadSerializer::new().props(&entry.master_props),
                            entry.inbound_props.clone(),
                        )
                    })
                    .unwrap_or_default();

                let values = resolve_binds(&binds, &scope, &self.modules);
                self.send(&OutboundMessage::ReturnBindsResolve {
                    selection: selection.uid(),
                    values,
                });
            }
        }
    }

    /// Replaces an instance's master props after a re-render.
    pub fn update_master_props(&mut self, selection: &Selection, master_props: Props) {
        if let Some(index) = self.position(selection, false) {
            self.entries[index].master_props = master_props;
        }
    }

    pub fn update_outbound_props(
        &mut self,
        selection: &Selection,
        prop_name: &str,
        flow_props: Value,
    ) {
        if let Some(index) = self.position(selection, false) {
            self.entries[index]
                .outbound_props
                .insert(prop_name.to_string(), flow_props.clone());
            self.send(&OutboundMessage::UpdateComponentOutboundProps {
                selection: self.entries[index].selection.clone(),
                prop_name: prop_name.to_string(),
                flow_props,
            });
        }
    }

    pub fn update_inbound_props(&mut self, selection: &Selection, flow_props: Value) {
        if let Some(index) = self.position(selection, false) {
            self.entries[index].inbound_props = flow_props.clone();
            self.send(&OutboundMessage::UpdateComponentInboundProps {
                selection: self.entries[index].selection.clone(),
                flow_props,
            });
        }
    }

    /// Component-initiated state change, mirrored to the IDE.
    pub fn update_component_state(&mut self, selection: &Selection, state: Value) {
        if let Some(index) = self.position(selection, false) {
            self.entries[index].state = Some(state.clone());
            self.send(&OutboundMessage::UpdateComponentState {
                selection: self.entries[index].selection.clone(),
                state,
            });
        }
    }

    pub fn change_component_prop(&self, selection: &Selection, prop_name: &str, value: Value) {
        self.send(&OutboundMessage::ChangeComponentProp {
            selection: selection.clone(),
            prop_name: prop_name.to_string(),
            value,
        });
    }

    /// The one surfaced-fatal path.
    pub fn set_canvas_error(&self, message: &str) {
        error!(message, "canvas error");
        self.send(&OutboundMessage::SetCanvasError {
            message: message.to_string(),
        });
    }

    fn position(&self, selection: &Selection, ignore_keys: bool) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| selections_equal(Some(&entry.selection), Some(selection), ignore_keys))
    }

    fn send(&self, message: &OutboundMessage) {
        if !self.options.dev_mode {
            return;
        }
        let Some(transport) = &self.transport else {
            return;
        };
        match serde_json::to_string(message) {
            Ok(payload) => transport.post(&payload),
            Err(err) => error!(%err, "failed to serialize outbound envelope"),
        }
    }
}

impl Interactions for Bridge {
    fn hover_enter(&self, selection: &Selection) -> bool {
        self.notify_if_editing(OutboundMessage::OverComponent {
            selection: selection.clone(),
        })
    }

    fn hover_exit(&self, selection: &Selection) -> bool {
        self.notify_if_editing(OutboundMessage::OutComponent {
            selection: selection.clone(),
        })
    }

    fn select(&self, selection: &Selection) -> bool {
        self.notify_if_editing(OutboundMessage::SelectComponent {
            selection: selection.clone(),
        })
    }

    fn unlock(&self, selection: &Selection) -> bool {
        self.notify_if_editing(OutboundMessage::UnlockComponent {
            selection: selection.clone(),
        })
    }

    fn open_context_menu(&self, selection: &Selection, client_x: f64, client_y: f64) -> bool {
        self.notify_if_editing(OutboundMessage::OpenComponentContextMenu {
            selection: selection.clone(),
            client_x,
            client_y,
        })
    }
}

impl Bridge {
    fn notify_if_editing(&self, message: OutboundMessage) -> bool {
        if !self.editing {
            return false;
        }
        self.send(&message);
        true
    }
}

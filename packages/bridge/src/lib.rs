//! Canvas-side bridge to an external visual-editing IDE
//!
//! The bridge lets an IDE running in the opener/parent frame observe and
//! manipulate a live component tree: components register themselves on
//! mount, report their geometry once per frame, answer bind-resolution
//! requests, and receive state pushes and editing-mode toggles back. All
//! traffic is JSON envelopes over a host-supplied [`MessageTransport`];
//! nothing is sent outside development mode.
//!
//! - [`registry`]: the [`Bridge`] itself (registration lifecycle, rect
//!   tracking, inbound dispatch, pointer interactions)
//! - [`messages`]: the envelope protocol
//! - [`geometry`]: element geometry readings and box unions
//! - [`serializer`]: reference-safe payload serialization
//! - [`expr`] / [`binds`]: sandboxed bind resolution
//! - [`inspector`]: the debug/report channel

pub mod binds;
pub mod expr;
pub mod geometry;
pub mod inspector;
pub mod messages;
pub mod registry;
pub mod serializer;
pub mod transport;

pub use binds::{resolve_binds, BindError, ModuleRegistry, ModuleResolver};
pub use expr::{evaluate, ExprError};
pub use geometry::{union_boxes, Edges, ElementBoxes, ElementRef, GeometryError, Rect};
pub use inspector::{DebugChannel, DebugKey, Inspector, DEBUG_KEY_ATTR};
pub use messages::{Bind, InboundMessage, OutboundMessage};
pub use registry::{Bridge, BridgeOptions, Interactions, RegisteredComponent, StateListener};
pub use serializer::{element_tag, PayloadSerializer};
pub use transport::MessageTransport;

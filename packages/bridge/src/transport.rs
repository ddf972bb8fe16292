//! Outbound channel to the IDE
//!
//! The bridge never talks to a window directly; the host supplies a
//! transport that forwards serialized envelopes to the opener or parent
//! frame. Nothing is sent at all unless the bridge was built in development
//! mode.

/// Host-side channel for serialized outbound envelopes.
pub trait MessageTransport {
    fn post(&self, payload: &str);
}

//! Debug/report channel
//!
//! Components can report attribute/variable provenance to an external
//! inspector, scoped by owning mount. Scope ids are allocated once per mount
//! and survive re-renders; dropping a scope's reports is deferred to the
//! next frame so a strict double-invoked unmount/remount can cancel it.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Attribute name carrying the internal debug key. Stripped from report
/// payloads before they reach the inspector.
pub const DEBUG_KEY_ATTR: &str = "data-d";

/// External inspector sink.
pub trait Inspector {
    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        scope_id: u64,
        report_id: u64,
        instance_id: &str,
        prop_name: &str,
        attributes: &Value,
        variables: &Value,
    );

    fn drop_reports(&self, scope_id: u64);
}

/// Internal bookkeeping key attached to rendered attributes. Renders as an
/// empty string so it never leaks into visible markup.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugKey {
    pub id: String,
    pub root_instances: Vec<String>,
    pub owner_scope: u64,
    pub reports: Vec<u64>,
}

impl DebugKey {
    pub fn new(id: impl Into<String>, root_instances: Vec<String>, owner_scope: u64) -> Self {
        Self {
            id: id.into(),
            root_instances,
            owner_scope,
            reports: Vec::new(),
        }
    }

    /// The root-instance path this key's children inherit: its own path
    /// plus its own id.
    pub fn child_root_instances(&self) -> Vec<String> {
        let mut roots = self.root_instances.clone();
        roots.push(self.id.clone());
        roots
    }
}

impl fmt::Display for DebugKey {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

struct ScopeState {
    next_report: u64,
}

/// Per-context debug channel. All methods are no-ops without an attached
/// sink, except scope-id allocation which stays monotonic either way.
pub struct DebugChannel {
    sink: Option<Rc<dyn Inspector>>,
    next_scope: u64,
    scopes: HashMap<u64, ScopeState>,
    pending_drops: Vec<u64>,
}

impl DebugChannel {
    pub fn new(sink: Option<Rc<dyn Inspector>>) -> Self {
        Self {
            sink,
            next_scope: 0,
            scopes: HashMap::new(),
            pending_drops: Vec::new(),
        }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Allocates a scope for a new mount. Callers store the id in
    /// mount-stable storage; it is not re-allocated per render.
    pub fn open_scope(&mut self) -> u64 {
        let scope_id = self.next_scope;
        self.next_scope += 1;
        self.scopes.insert(scope_id, ScopeState { next_report: 0 });
        scope_id
    }

    /// Cancels a pending drop for a scope that is being reused (strict
    /// double-invoked remount). Returns whether the scope was still live.
    pub fn reopen_scope(&mut self, scope_id: u64) -> bool {
        self.pending_drops.retain(|pending| *pending != scope_id);
        self.scopes.contains_key(&scope_id)
    }

    /// Forwards a report to the sink, if any. Allocates a per-scope report
    /// id and strips the internal debug-key attribute from the payload.
    pub fn report(
        &mut self,
        scope_id: u64,
        instance_id: &str,
        prop_name: &str,
        attributes: &Value,
        variables: &Value,
    ) -> Option<u64> {
        let sink = self.sink.as_ref()?;
        let scope = self.scopes.get_mut(&scope_id)?;

        let report_id = scope.next_report;
        scope.next_report += 1;

        let attributes = strip_debug_key(attributes);
        sink.report(
            scope_id,
            report_id,
            instance_id,
            prop_name,
            &attributes,
            variables,
        );

        Some(report_id)
    }

    /// Schedules a drop of the scope's reports, committed on the next
    /// frame. A remount before the commit cancels it via
    /// [`reopen_scope`](Self::reopen_scope).
    pub fn close_scope(&mut self, scope_id: u64) {
        if self.scopes.contains_key(&scope_id) && !self.pending_drops.contains(&scope_id) {
            self.pending_drops.push(scope_id);
        }
    }

    /// Executes pending drops. Called by the bridge once per frame.
    pub fn commit_drops(&mut self) {
        for scope_id in std::mem::take(&mut self.pending_drops) {
            self.scopes.remove(&scope_id);
            if let Some(sink) = &self.sink {
                sink.drop_reports(scope_id);
            }
        }
    }
}

fn strip_debug_key(attributes: &Value) -> Value {
    match attributes {
        Value::Object(map) => {
            let mut stripped = map.clone();
            stripped.remove(DEBUG_KEY_ATTR);
            Value::Object(stripped)
        }
        other => other.clone(),
    }
}

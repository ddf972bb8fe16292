//! Bind resolution
//!
//! The IDE batches bind requests against a selection; every bind resolves
//! independently and a failure fills that bind's slot with a structured
//! error value instead of aborting the batch.

use crate::expr;
use crate::messages::Bind;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use viewbridge_props::BindScope;

#[derive(Error, Debug)]
pub enum BindError {
    #[error("expression error: {0}")]
    Expression(#[from] expr::ExprError),

    #[error("no module resolver registered for '{0}'")]
    UnknownModule(String),

    #[error("module resolver failed: {0}")]
    ModuleFailed(String),
}

/// Host-registered resolver standing in for a dynamically loaded module's
/// default export.
pub type ModuleResolver = Rc<dyn Fn(&BindScope) -> Result<Value, String>>;

/// Lookup table for MODULE binds, keyed by the bind's path.
#[derive(Default)]
pub struct ModuleRegistry {
    resolvers: HashMap<String, ModuleResolver>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<String>, resolver: ModuleResolver) {
        self.resolvers.insert(path.into(), resolver);
    }

    fn resolve(&self, path: &str, scope: &BindScope) -> Result<Value, BindError> {
        let resolver = self
            .resolvers
            .get(path)
            .ok_or_else(|| BindError::UnknownModule(path.to_string()))?;
        resolver(scope).map_err(BindError::ModuleFailed)
    }
}

/// Resolves a batch of binds. Each slot holds the resolved value or a
/// `{kind: "bind-error", message}` object.
pub fn resolve_binds(binds: &[Bind], scope: &BindScope, modules: &ModuleRegistry) -> Vec<Value> {
    binds
        .iter()
        .map(|bind| match resolve_bind(bind, scope, modules) {
            Ok(value) => value,
            Err(error) => json!({"kind": "bind-error", "message": error.to_string()}),
        })
        .collect()
}

fn resolve_bind(bind: &Bind, scope: &BindScope, modules: &ModuleRegistry) -> Result<Value, BindError> {
    let root = scope_root(scope);

    match bind {
        Bind::Prop { path, suffix } => {
            let mut value = lookup_path(&root, path);
            if let Some(suffix) = suffix {
                if !value.is_null() {
                    value = Value::String(format!("{}{}", coerce_string(&value), suffix));
                }
            }
            Ok(value)
        }
        Bind::Expression { value } => Ok(expr::evaluate(value, &root)?),
        Bind::Module { path } => modules.resolve(path, scope),
    }
}

fn scope_root(scope: &BindScope) -> Value {
    json!({
        "flowProps": scope.flow_props,
        "masterProps": scope.master_props,
    })
}

/// Dotted-path read; numeric segments index arrays; anything missing along
/// the way resolves to `null`.
fn lookup_path(root: &Value, path: &str) -> Value {
    let mut current = root;

    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(next) => next,
                None => return Value::Null,
            },
            Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i))
            {
                Some(next) => next,
                None => return Value::Null,
            },
            _ => return Value::Null,
        };
    }

    current.clone()
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

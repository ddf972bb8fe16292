//! Selection/props factory
//!
//! When a parent instantiates a child it derives the child's selection (id,
//! replication path, composite-root path) and builds the immutable props
//! bundle the child will thread further down. The master bundle is the
//! bundle of the enclosing composite's instantiation, not the immediate
//! parent's.

use crate::merge::merge_override_maps;
use crate::value::{FlowProps, Overrides, PropsBundle};
use serde_json::Value;
use tracing::warn;
use viewbridge_selection::{ReplicationKey, Selection};

/// Everything the factory needs to instantiate one child.
pub struct ChildInstantiation<'a> {
    /// The child's declared component id.
    pub instance_id: &'a str,

    /// Bundle of the enclosing composite instantiation.
    pub master: &'a PropsBundle,

    /// The immediate parent's selection, when one exists.
    pub parent_selection: Option<&'a Selection>,

    /// Repetition key when the parent replicates this child from a list.
    pub replication_key: Option<&'a str>,

    /// Ambient top-of-tree props for the child.
    pub master_props: Value,

    /// Ambient data-flow values for the child.
    pub flow_props: FlowProps,

    /// Overrides the parent passes down, keyed by bare instance id.
    pub overrides: Option<&'a Overrides>,
}

/// Derives the child's selection.
///
/// The replication path extends the parent's with one `{component_id,
/// key}` entry iff a replication key and a parent selection both exist.
/// Children of an entry bundle start a fresh root-instance path; otherwise
/// the master's path is propagated with the master's own id appended.
pub fn next_child_selection(
    instance_id: &str,
    master: &PropsBundle,
    parent_selection: Option<&Selection>,
    replication_key: Option<&str>,
) -> Selection {
    let mut keys = parent_selection
        .map(|parent| parent.keys.clone())
        .unwrap_or_default();

    if let (Some(key), Some(parent)) = (replication_key, parent_selection) {
        keys.push(ReplicationKey::new(parent.id.clone(), key));
    }

    let root_instances = if master.entry {
        Vec::new()
    } else {
        let mut roots = master.selection.root_instances.clone();
        roots.push(master.selection.id.clone());
        roots
    };

    Selection::new(instance_id, root_instances, keys)
}

/// Builds the child's props bundle.
///
/// Overrides the parent passes down are re-keyed from bare instance ids
/// into fully root-qualified path ids, then merged over the inherited map
/// with the canonical incoming-wins precedence.
pub fn build_props_bundle(child: ChildInstantiation<'_>) -> PropsBundle {
    if child.parent_selection.is_none() {
        warn!(
            instance_id = child.instance_id,
            "missing parent selection context; path qualification and replication keys degrade \
             to root-level defaults"
        );
    }

    let selection = next_child_selection(
        child.instance_id,
        child.master,
        child.parent_selection,
        child.replication_key,
    );

    let overrides = match child.overrides {
        Some(incoming) => {
            let qualified = incoming.qualified_under(&selection.root_instances);
            merge_override_maps(&child.master.overrides, [&qualified])
        }
        None => child.master.overrides.clone(),
    };

    PropsBundle {
        selection,
        entry: false,
        master_props: child.master_props,
        flow_props: child.flow_props,
        overrides,
    }
}

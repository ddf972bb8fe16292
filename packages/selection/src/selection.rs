use serde::{Deserialize, Serialize};
use std::fmt;

/// One hop in the list-replication path: which ancestor produced a repeated
/// child, and under which repetition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationKey {
    /// Id of the ancestor component that replicated its children.
    pub component_id: String,

    /// The repetition key that ancestor used for this branch.
    pub key: String,
}

impl ReplicationKey {
    pub fn new(component_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            key: key.into(),
        }
    }
}

/// Structural address of one component instance in the live tree.
///
/// Two selections denote the same instance iff their ids are equal, their
/// root-instance paths are equal element-wise, and their replication key
/// *values* are equal in order (unless a key-insensitive comparison is
/// requested, see [`selections_equal`](crate::selections_equal)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Author-assigned component identifier. Not unique across the app on
    /// its own; uniqueness comes from the full selection.
    pub id: String,

    /// Ids of the ancestor instances that introduced a new override root,
    /// outermost first. Empty for entry/top-level instances.
    #[serde(default)]
    pub root_instances: Vec<String>,

    /// Replication path, outer to inner.
    #[serde(default)]
    pub keys: Vec<ReplicationKey>,
}

impl Selection {
    /// A selection with no replication path and no composite roots.
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            root_instances: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn new(
        id: impl Into<String>,
        root_instances: Vec<String>,
        keys: Vec<ReplicationKey>,
    ) -> Self {
        Self {
            id: id.into(),
            root_instances,
            keys,
        }
    }

    /// Derived registry/override key.
    ///
    /// Format: `id`, then the dot-joined key values when the replication
    /// path is non-empty, then the dot-joined root instance ids when the
    /// root path is non-empty. The root section opens with `#` instead of
    /// `.` so a selection with keys and a selection with root instances can
    /// never render to the same uid. Stable across serialization and
    /// independent of field declaration order.
    pub fn uid(&self) -> String {
        let mut uid = self.id.clone();

        if !self.keys.is_empty() {
            uid.push('.');
            uid.push_str(
                &self
                    .keys
                    .iter()
                    .map(|k| k.key.as_str())
                    .collect::<Vec<_>>()
                    .join("."),
            );
        }

        if !self.root_instances.is_empty() {
            uid.push('#');
            uid.push_str(&self.root_instances.join("."));
        }

        uid
    }

    /// Dotted override path id: root instance ids joined by `.` followed by
    /// the component id, or the bare id when there are no roots.
    pub fn path_id(&self) -> String {
        if self.root_instances.is_empty() {
            self.id.clone()
        } else {
            format!("{}.{}", self.root_instances.join("."), self.id)
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uid())
    }
}

use crate::Selection;

/// Compares two optional selections.
///
/// Fails closed: a missing selection never matches anything, including
/// another missing selection, unless both sides are literally the same
/// reference. Otherwise ids must match, root-instance paths must match
/// element-wise, and the replication key *values* must match in order
/// (key producers are not compared). `ignore_keys` skips the replication
/// path entirely, which the registry uses for aggregate lookups.
pub fn selections_equal(
    a: Option<&Selection>,
    b: Option<&Selection>,
    ignore_keys: bool,
) -> bool {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };

    if std::ptr::eq(a, b) {
        return true;
    }

    a.id == b.id
        && a.root_instances == b.root_instances
        && (ignore_keys || keys_equal(a, b))
}

fn keys_equal(a: &Selection, b: &Selection) -> bool {
    a.keys.len() == b.keys.len()
        && a.keys
            .iter()
            .zip(b.keys.iter())
            .all(|(ka, kb)| ka.key == kb.key)
}

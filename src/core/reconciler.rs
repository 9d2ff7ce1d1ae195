/// Snapshot reconciliation
///
/// Compares the snapshot saved by the last refresh with the one just observed.
/// Only the user's `enabled` flag carries over; every other field comes from
/// the fresh observation.

use crate::db::ItemRecord;
use std::collections::{HashMap, HashSet};

/// Every suffix a shared file list has shipped with, newest first
///
/// Bucket ids end in one of these. Ids that differ only in the suffix name the
/// same list.
pub const LIST_FILE_SUFFIXES: &[&str] = &["sfl3", "sfl2", "sfl"];

/// Outcome of comparing two snapshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Observed records with `enabled` carried over, in observed order
    pub merged: Vec<ItemRecord>,
    /// Newly seen applications (never buckets)
    pub added: Vec<ItemRecord>,
    /// Previous records nothing observed accounts for
    pub removed: Vec<ItemRecord>,
    /// `(old id, new id)` for buckets found under a legacy suffix
    pub migrated: Vec<(String, String)>,
}

impl Reconciliation {
    pub fn removed_ids(&self) -> Vec<String> {
        self.removed.iter().map(|item| item.id.clone()).collect()
    }
}

/// Merge `observed` against `previous`
///
/// `observed` must already be free of duplicate ids.
pub fn reconcile(previous: &[ItemRecord], observed: Vec<ItemRecord>) -> Reconciliation {
    let previous_by_id: HashMap<&str, &ItemRecord> =
        previous.iter().map(|item| (item.id.as_str(), item)).collect();

    let mut covered: HashSet<String> = HashSet::with_capacity(observed.len());
    let mut merged = Vec::with_capacity(observed.len());
    let mut added = Vec::new();
    let mut migrated = Vec::new();

    for mut item in observed {
        let prior = if item.is_bucket {
            let keys = equivalent_ids(&item.id);
            let found = keys
                .iter()
                .find_map(|key| previous_by_id.get(key.as_str()).copied());
            covered.extend(keys);
            found
        } else {
            covered.insert(item.id.clone());
            previous_by_id.get(item.id.as_str()).copied()
        };

        match prior {
            Some(prior) => {
                item.enabled = prior.enabled;
                if prior.id != item.id {
                    tracing::debug!(from = %prior.id, to = %item.id, "bucket id migrated");
                    migrated.push((prior.id.clone(), item.id.clone()));
                }
            }
            None if !item.is_bucket => added.push(item.clone()),
            None => {}
        }

        merged.push(item);
    }

    let removed: Vec<ItemRecord> = previous
        .iter()
        .filter(|item| !covered.contains(&item.id))
        .cloned()
        .collect();

    // A legacy key shadowed by a better match is still a stale registration
    for item in previous {
        if item.is_bucket
            && covered.contains(&item.id)
            && !merged.iter().any(|m| m.id == item.id)
            && !migrated.iter().any(|(old, _)| old == &item.id)
        {
            if let Some(current) = merged
                .iter()
                .find(|m| m.is_bucket && equivalent_ids(&m.id).contains(&item.id))
            {
                migrated.push((item.id.clone(), current.id.clone()));
            }
        }
    }

    tracing::debug!(
        merged = merged.len(),
        added = added.len(),
        removed = removed.len(),
        migrated = migrated.len(),
        "reconciled snapshot"
    );

    Reconciliation {
        merged,
        added,
        removed,
        migrated,
    }
}

/// `id` itself first, then the same list under every other known suffix
pub fn equivalent_ids(id: &str) -> Vec<String> {
    let mut ids = vec![id.to_string()];

    let Some((stem, suffix)) = id.rsplit_once('.') else {
        return ids;
    };
    if !LIST_FILE_SUFFIXES.contains(&suffix) {
        return ids;
    }

    ids.extend(
        LIST_FILE_SUFFIXES
            .iter()
            .filter(|other| **other != suffix)
            .map(|other| format!("{}.{}", stem, other)),
    );
    ids
}

//! Dependency classification, ancestor resolution, and build ordering.
//!
//! All functions operate on the batch as loaded: whether a parent reference
//! counts as internal depends solely on the keys actually present, so an
//! image whose parent was excluded via the ignore list is external here.

use std::collections::{BTreeMap, BTreeSet};

use dockwright_core::{BuildDescriptor, Error, Result};

use crate::loader::Batch;

/// The batch keys split into internal and external images.
///
/// Invariant: the two sides are disjoint and together cover every batch key.
/// Both are in batch (key) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPartition {
    pub internal: Vec<String>,
    pub external: Vec<String>,
}

/// Partition the batch by where each image's parent comes from.
///
/// An image is internal when its tag-stripped parent reference equals some
/// key in `batch`, external otherwise.
pub fn classify(batch: &Batch) -> BatchPartition {
    let mut internal = Vec::new();
    let mut external = Vec::new();
    for (key, descriptor) in batch {
        if batch.contains_key(descriptor.dependency_ref()) {
            internal.push(key.clone());
        } else {
            external.push(key.clone());
        }
    }
    BatchPartition { internal, external }
}

/// The internal (`want_external = false`) or external (`true`) subset of the
/// batch keys.
pub fn filter(batch: &Batch, want_external: bool) -> Vec<&str> {
    batch
        .iter()
        .filter(|(_, d)| batch.contains_key(d.dependency_ref()) != want_external)
        .map(|(key, _)| key.as_str())
        .collect()
}

/// Walk the parent chain of `descriptor` and collect its internal ancestors,
/// nearest parent first. The chain ends at the first reference that is not a
/// batch key; an image whose own parent is external has an empty chain.
///
/// A parent chain that revisits a key is a hard error; the batch can never
/// be ordered.
pub fn ancestors(batch: &Batch, descriptor: &BuildDescriptor) -> Result<Vec<String>> {
    let mut chain: Vec<String> = Vec::new();
    let mut current = descriptor;

    loop {
        let parent = current.dependency_ref();
        let Some(next) = batch.get(parent) else {
            return Ok(chain);
        };
        if parent == descriptor.key() || chain.iter().any(|seen| seen == parent) {
            let mut path = vec![descriptor.key().to_owned()];
            path.append(&mut chain);
            path.push(parent.to_owned());
            return Err(Error::CyclicDependency {
                key: parent.to_owned(),
                path,
            });
        }
        chain.push(parent.to_owned());
        current = next;
    }
}

/// Compute the build plan: external images first, in batch order, then the
/// internal images such that every ancestor precedes its descendants.
///
/// Internal ordering is a topological sort over the internal subgraph
/// (in-degree-zero queue, ties broken by ascending key). Each internal image
/// has exactly one parent edge, so the sort is total whenever the ancestor
/// walk succeeds.
pub fn order(batch: &Batch) -> Result<Vec<String>> {
    let partition = classify(batch);

    // The full chain walk doubles as the cycle guard for every member.
    for key in &partition.internal {
        ancestors(batch, &batch[key])?;
    }

    let internal: BTreeSet<&str> = partition.internal.iter().map(String::as_str).collect();
    let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &key in &internal {
        let parent = batch[key].dependency_ref();
        if internal.contains(parent) {
            children.entry(parent).or_default().push(key);
            indegree.insert(key, 1);
        } else {
            indegree.insert(key, 0);
        }
    }

    let mut plan = partition.external;
    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(key, _)| *key)
        .collect();

    while let Some(key) = ready.pop_first() {
        plan.push(key.to_owned());
        for &child in children.get(key).into_iter().flatten() {
            if let Some(degree) = indegree.get_mut(child) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(child);
                }
            }
        }
    }

    debug_assert_eq!(plan.len(), batch.len());
    Ok(plan)
}

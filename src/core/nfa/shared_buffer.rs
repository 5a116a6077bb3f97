// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned shared buffer for consumed events.
//!
//! Every event a branch consumes is stored once per `(stage, value,
//! timestamp, counter)` key; competing branches share the entry through
//! version-labelled edges pointing back to their predecessors. The graph is
//! a DAG by construction: edges only point backwards in time. Entries are
//! kept in an arena of integer-id slots with a free list; computation
//! states hold entry ids, never references.
//!
//! Reference counts track how many computation states and successor edges
//! keep an entry reachable. Releasing the last reference removes the entry
//! and cascades into its predecessors. Internal inconsistencies (vacant
//! slot access, ref-count underflow) are engine bugs and panic.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Deserializer, Serialize};

use super::dewey::DeweyNumber;

/// Index of an entry slot in the buffer arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub(crate) usize);

/// Identity of a consumed event occurrence within a stage.
///
/// The counter disambiguates consecutive arrivals of the same value at the
/// same timestamp under the same stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey<V> {
    pub stage: String,
    pub value: V,
    pub timestamp: i64,
    pub counter: u32,
}

/// Version-labelled pointer to a predecessor entry. `None` marks a lineage
/// root (the first event taken by a branch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedBufferEdge {
    pub target: Option<EntryId>,
    pub version: DeweyNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedBufferEntry<V> {
    pub key: EntryKey<V>,
    pub edges: Vec<SharedBufferEdge>,
    pub ref_count: u32,
}

/// Arena-backed shared buffer. See the module docs.
#[derive(Debug, Clone, Serialize)]
pub struct SharedBuffer<V> {
    entries: Vec<Option<SharedBufferEntry<V>>>,
    free_slots: Vec<usize>,
    occupied: usize,
    #[serde(skip)]
    index: HashMap<EntryKey<V>, EntryId>,
}

impl<V> SharedBuffer<V>
where
    V: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_slots: Vec::new(),
            occupied: 0,
            index: HashMap::new(),
        }
    }

    /// Record `value` consumed under `stage`, linked back to `previous`.
    ///
    /// If an entry with the same key already exists, only a new edge is
    /// added, which is what lets branches share prefixes. Returns the id of
    /// the entry written to; the caller decides how many computation-state
    /// references to take out via [`lock`](Self::lock).
    pub fn put(
        &mut self,
        stage: &str,
        value: &V,
        timestamp: i64,
        previous: Option<EntryId>,
        version: &DeweyNumber,
    ) -> EntryId {
        let counter = match previous {
            Some(prev_id) => {
                let prev = self.entry(prev_id);
                if prev.key.value == *value && prev.key.timestamp == timestamp {
                    prev.key.counter + 1
                } else {
                    0
                }
            }
            None => 0,
        };

        let key = EntryKey {
            stage: stage.to_string(),
            value: value.clone(),
            timestamp,
            counter,
        };

        let existing = self.index.get(&key).copied();
        let id = match existing {
            Some(id) => id,
            None => self.insert_entry(key),
        };

        if let Some(prev_id) = previous {
            self.entry_mut(prev_id).ref_count += 1;
        }
        self.entry_mut(id).edges.push(SharedBufferEdge {
            target: previous,
            version: version.clone(),
        });

        id
    }

    /// Take out one computation-state reference on `id`.
    pub fn lock(&mut self, id: EntryId) {
        self.entry_mut(id).ref_count += 1;
    }

    /// Drop one reference on `id`, removing the entry and cascading into
    /// its predecessors once nothing references it anymore.
    pub fn release(&mut self, id: EntryId) {
        let mut to_release = vec![id];
        while let Some(current) = to_release.pop() {
            let entry = self.entry_mut(current);
            assert!(
                entry.ref_count > 0,
                "shared buffer ref-count underflow at slot {}",
                current.0
            );
            entry.ref_count -= 1;
            if entry.ref_count == 0 {
                let removed = self.remove_entry(current);
                for edge in removed.edges {
                    if let Some(target) = edge.target {
                        to_release.push(target);
                    }
                }
            }
        }
    }

    /// Enumerate every distinct version-compatible path from `start` back
    /// to a lineage root, as one stage-name → events map per path. Events
    /// within a stage keep the order they were taken in.
    pub fn extract_patterns(
        &self,
        start: EntryId,
        version: &DeweyNumber,
    ) -> Vec<BTreeMap<String, Vec<V>>> {
        struct Extraction {
            entry: Option<EntryId>,
            version: DeweyNumber,
            path: Vec<EntryId>,
        }

        let mut results = Vec::new();
        let mut stack = vec![Extraction {
            entry: Some(start),
            version: version.clone(),
            path: Vec::new(),
        }];

        while let Some(extraction) = stack.pop() {
            match extraction.entry {
                None => {
                    // Reached a root edge; the path holds the match newest
                    // first.
                    let mut sequence: BTreeMap<String, Vec<V>> = BTreeMap::new();
                    for &id in extraction.path.iter().rev() {
                        let entry = self.entry(id);
                        sequence
                            .entry(entry.key.stage.clone())
                            .or_default()
                            .push(entry.key.value.clone());
                    }
                    results.push(sequence);
                }
                Some(id) => {
                    let mut path = extraction.path;
                    path.push(id);
                    let entry = self.entry(id);
                    let compatible: Vec<&SharedBufferEdge> = entry
                        .edges
                        .iter()
                        .filter(|edge| extraction.version.is_compatible_with(&edge.version))
                        .collect();
                    for (i, edge) in compatible.iter().enumerate() {
                        let branch_path = if i + 1 == compatible.len() {
                            std::mem::take(&mut path)
                        } else {
                            path.clone()
                        };
                        stack.push(Extraction {
                            entry: edge.target,
                            version: edge.version.clone(),
                            path: branch_path,
                        });
                    }
                }
            }
        }

        results
    }

    /// Drop every entry timestamped at or before `cutoff` and strip edges
    /// left dangling by the removal. Returns whether anything was pruned.
    ///
    /// Window expiry guarantees no live branch still reaches the removed
    /// entries; predecessors are always older than their successors, so a
    /// time cut never splits a live path.
    pub fn prune(&mut self, cutoff: i64) -> bool {
        let mut removed = Vec::new();
        for slot in 0..self.entries.len() {
            if let Some(entry) = &self.entries[slot] {
                if entry.key.timestamp <= cutoff {
                    removed.push(EntryId(slot));
                }
            }
        }
        if removed.is_empty() {
            return false;
        }

        log::debug!(
            "pruning {} shared buffer entries at cutoff {}",
            removed.len(),
            cutoff
        );
        for &id in &removed {
            self.remove_entry(id);
        }
        for slot in self.entries.iter_mut().flatten() {
            slot.edges
                .retain(|edge| match edge.target {
                    Some(target) => !removed.contains(&target),
                    None => true,
                });
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn len(&self) -> usize {
        self.occupied
    }

    pub(crate) fn entry(&self, id: EntryId) -> &SharedBufferEntry<V> {
        self.entries
            .get(id.0)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("vacant shared buffer slot {} accessed", id.0))
    }

    fn entry_mut(&mut self, id: EntryId) -> &mut SharedBufferEntry<V> {
        self.entries
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("vacant shared buffer slot {} accessed", id.0))
    }

    fn insert_entry(&mut self, key: EntryKey<V>) -> EntryId {
        let entry = SharedBufferEntry {
            key: key.clone(),
            edges: Vec::new(),
            ref_count: 0,
        };
        let id = match self.free_slots.pop() {
            Some(slot) => {
                self.entries[slot] = Some(entry);
                EntryId(slot)
            }
            None => {
                self.entries.push(Some(entry));
                EntryId(self.entries.len() - 1)
            }
        };
        self.occupied += 1;
        self.index.insert(key, id);
        id
    }

    fn remove_entry(&mut self, id: EntryId) -> SharedBufferEntry<V> {
        let entry = self.entries[id.0]
            .take()
            .unwrap_or_else(|| panic!("vacant shared buffer slot {} removed", id.0));
        self.index.remove(&entry.key);
        self.free_slots.push(id.0);
        self.occupied -= 1;
        entry
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| {
                entry
                    .as_ref()
                    .map(|e| (e.key.clone(), EntryId(slot)))
            })
            .collect();
    }
}

impl<V> Default for SharedBuffer<V>
where
    V: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

// The key index is a lookup structure rebuilt from the entries; equality is
// decided by the arena contents alone.
impl<V: PartialEq> PartialEq for SharedBuffer<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
            && self.free_slots == other.free_slots
            && self.occupied == other.occupied
    }
}

// The key index is derived data; deserialization rebuilds it from the
// entry slots instead of trusting the wire.
impl<'de, V> Deserialize<'de> for SharedBuffer<V>
where
    V: Deserialize<'de> + Clone + Eq + Hash,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw<V> {
            entries: Vec<Option<SharedBufferEntry<V>>>,
            free_slots: Vec<usize>,
            occupied: usize,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut buffer = SharedBuffer {
            entries: raw.entries,
            free_slots: raw.free_slots,
            occupied: raw.occupied,
            index: HashMap::new(),
        };
        buffer.rebuild_index();
        Ok(buffer)
    }
}

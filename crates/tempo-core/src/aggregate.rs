//! Duration rollup over the project/folder forest.
//!
//! [`build`] links flat parent pointers into trees, adds every record's
//! duration to its project and all ancestors, optionally prunes branches
//! with no time in them, and exposes the result both as a navigable forest
//! and as a flat row projection for presentation layers.
//!
//! Traversal state (child lists, parent links, per-type sums) lives in an
//! arena indexed by position, not on the domain nodes, so the input nodes
//! are never mutated.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::{DISCONNECTED, Node, NodeId, NodeKind, ROOT};

/// Label of the synthetic root that collects disconnected nodes.
pub const MISSING_PARENTS_LABEL: &str = "__missing_parents__";

/// One record's contribution to the rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTally {
    pub project: NodeId,
    pub type_name: String,
    pub seconds: i64,
}

impl RecordTally {
    /// Tally for a record spanning `start_time..end_time`.
    #[must_use]
    pub fn from_span(project: NodeId, type_name: &str, start_time: i64, end_time: i64) -> Self {
        Self {
            project,
            type_name: type_name.to_string(),
            seconds: end_time - start_time,
        }
    }
}

/// One line of the flattened hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierRow {
    /// Nesting level; roots are 0, the missing-parents bucket's members are 1.
    pub depth: usize,
    /// `None` for the synthetic missing-parents row.
    pub id: Option<NodeId>,
    pub label: String,
    pub kind: Option<NodeKind>,
    /// Summed seconds per record-type name.
    pub sums: BTreeMap<String, i64>,
}

/// Per-node traversal overlay.
#[derive(Debug, Clone, Default)]
struct Slot {
    children: Vec<usize>,
    parent: Option<usize>,
    sums: BTreeMap<String, i64>,
    /// Parent id after linking: the declared one, or [`DISCONNECTED`] when
    /// the declared parent is not in the node set.
    effective_parent: NodeId,
}

/// Decorated forest produced by [`build`].
#[derive(Debug)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    slots: Vec<Slot>,
    index: HashMap<NodeId, usize>,
    any_disconnected: bool,
    prune_empty: bool,
}

/// Builds the rollup forest.
///
/// `nodes` is the merged folder/project collection; its order is kept as
/// sibling order unless `sort` asks for ascending ids. Records referencing
/// a project id outside `nodes` are a caller error and are ignored here.
/// The forest must be acyclic; that is the repository's contract.
#[must_use]
pub fn build(mut nodes: Vec<Node>, records: &[RecordTally], prune_empty: bool, sort: bool) -> Hierarchy {
    if sort {
        nodes.sort_by_key(|n| n.id);
    }

    let index: HashMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id, i))
        .collect();
    let mut slots: Vec<Slot> = nodes
        .iter()
        .map(|n| Slot {
            effective_parent: n.parent_id,
            ..Slot::default()
        })
        .collect();

    // Link children to parents; parents outside the visible set mark the
    // child as disconnected instead of failing.
    let mut any_disconnected = false;
    for i in 0..nodes.len() {
        let parent_id = nodes[i].parent_id;
        if parent_id == ROOT {
            continue;
        }
        if let Some(&p) = index.get(&parent_id) {
            slots[i].parent = Some(p);
            slots[p].children.push(i);
        } else {
            slots[i].effective_parent = DISCONNECTED;
            any_disconnected = true;
        }
    }

    // Add each record to its project and every ancestor up the chain.
    for record in records {
        let Some(&start) = index.get(&record.project) else {
            debug_assert!(false, "record references unknown project {}", record.project);
            continue;
        };
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            *slots[i].sums.entry(record.type_name.clone()).or_insert(0) += record.seconds;
            cursor = slots[i].parent;
        }
    }

    if prune_empty {
        // Detach zero-time nodes from their parent's child list. The nodes
        // stay in the arena; sums computed above are not revisited.
        for i in 0..slots.len() {
            if slots[i].sums.values().all(|&v| v <= 0) {
                if let Some(p) = slots[i].parent {
                    slots[p].children.retain(|&c| c != i);
                }
            }
        }
    }

    Hierarchy {
        nodes,
        slots,
        index,
        any_disconnected,
        prune_empty,
    }
}

impl Hierarchy {
    /// Ids of top-level nodes, in presentation order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.ids_with_effective_parent(ROOT)
    }

    /// Ids of nodes whose declared parent was not visible.
    #[must_use]
    pub fn disconnected(&self) -> Vec<NodeId> {
        self.ids_with_effective_parent(DISCONNECTED)
    }

    /// Child ids of a node, in presentation order. Pruned children are gone.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.index.get(&id).map_or_else(Vec::new, |&i| {
            self.slots[i]
                .children
                .iter()
                .map(|&c| self.nodes[c].id)
                .collect()
        })
    }

    /// Per-type duration sums rolled up for a node.
    #[must_use]
    pub fn sums(&self, id: NodeId) -> Option<&BTreeMap<String, i64>> {
        self.index.get(&id).map(|&i| &self.slots[i].sums)
    }

    fn ids_with_effective_parent(&self, parent: NodeId) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.effective_parent == parent)
            .map(|(i, _)| self.nodes[i].id)
            .collect()
    }

    /// Flattens the forest depth-first into presentation rows.
    ///
    /// When pruning, nodes with no positive sum are skipped along with their
    /// subtree, and the missing-parents bucket only appears if its members
    /// logged any time at all.
    #[must_use]
    pub fn rows(&self) -> Vec<HierRow> {
        let mut rows = Vec::new();
        for i in 0..self.slots.len() {
            if self.slots[i].effective_parent == ROOT {
                self.gather(i, 0, &mut rows);
            }
        }

        if self.any_disconnected {
            let disconnected_total: i64 = self
                .slots
                .iter()
                .filter(|slot| slot.effective_parent == DISCONNECTED)
                .flat_map(|slot| slot.sums.values())
                .sum();
            if !self.prune_empty || disconnected_total > 0 {
                rows.push(HierRow {
                    depth: 0,
                    id: None,
                    label: MISSING_PARENTS_LABEL.to_string(),
                    kind: None,
                    sums: BTreeMap::new(),
                });
                for i in 0..self.slots.len() {
                    if self.slots[i].effective_parent == DISCONNECTED {
                        self.gather(i, 1, &mut rows);
                    }
                }
            }
        }
        rows
    }

    fn gather(&self, i: usize, depth: usize, rows: &mut Vec<HierRow>) {
        let slot = &self.slots[i];
        if self.prune_empty && !slot.sums.values().any(|&v| v > 0) {
            return;
        }
        let node = &self.nodes[i];
        rows.push(HierRow {
            depth,
            id: Some(node.id),
            label: node.name.clone(),
            kind: Some(node.kind),
            sums: slot.sums.clone(),
        });
        for &child in &slot.children {
            self.gather(child, depth + 1, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Folder "A" (1) at root, project "B" (2) inside it, project "B" (3)
    /// at root.
    fn nodes() -> Vec<Node> {
        vec![
            Node::bare(1, "A", ROOT, NodeKind::Folder),
            Node::bare(2, "B", 1, NodeKind::Project),
            Node::bare(3, "B", ROOT, NodeKind::Project),
        ]
    }

    fn work(project: NodeId, seconds: i64) -> RecordTally {
        RecordTally {
            project,
            type_name: "work".to_string(),
            seconds,
        }
    }

    #[test]
    fn empty_records_with_pruning_yields_empty_forest() {
        let hier = build(nodes(), &[], true, true);
        assert!(hier.rows().is_empty());
    }

    #[test]
    fn empty_records_without_pruning_keeps_all_nodes() {
        let hier = build(nodes(), &[], false, true);
        let rows = hier.rows();
        assert_eq!(
            rows.iter()
                .map(|r| (r.depth, r.id.unwrap()))
                .collect::<Vec<_>>(),
            vec![(0, 1), (1, 2), (0, 3)]
        );
        assert_eq!(hier.roots(), vec![1, 3]);
        assert_eq!(hier.children(1), vec![2]);
    }

    #[test]
    fn durations_propagate_to_ancestors() {
        let hier = build(nodes(), &[work(2, 60)], false, true);
        assert_eq!(hier.sums(2).unwrap().get("work"), Some(&60));
        assert_eq!(hier.sums(1).unwrap().get("work"), Some(&60));
        assert!(hier.sums(3).unwrap().is_empty());
    }

    #[test]
    fn sums_accumulate_per_type() {
        let records = vec![
            work(2, 60),
            work(2, 30),
            RecordTally {
                project: 2,
                type_name: "phonecall".to_string(),
                seconds: 15,
            },
        ];
        let hier = build(nodes(), &records, false, true);
        let sums = hier.sums(1).unwrap();
        assert_eq!(sums.get("work"), Some(&90));
        assert_eq!(sums.get("phonecall"), Some(&15));
    }

    #[test]
    fn pruning_keeps_only_branches_with_time() {
        let hier = build(nodes(), &[work(2, 60)], true, true);
        let rows = hier.rows();
        assert_eq!(
            rows.iter().map(|r| r.id.unwrap()).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn zero_duration_counts_as_empty() {
        let hier = build(nodes(), &[work(3, 0)], true, true);
        assert!(hier.rows().is_empty());
    }

    #[test]
    fn missing_parent_goes_to_the_synthetic_bucket() {
        let mut all = nodes();
        all.push(Node::bare(9, "Orphan", 77, NodeKind::Project));
        let hier = build(all, &[], false, true);

        assert_eq!(hier.disconnected(), vec![9]);
        let rows = hier.rows();
        let bucket = rows
            .iter()
            .position(|r| r.label == MISSING_PARENTS_LABEL)
            .expect("bucket row");
        assert_eq!(rows[bucket].depth, 0);
        assert_eq!(rows[bucket].id, None);
        assert_eq!(rows[bucket + 1].id, Some(9));
        assert_eq!(rows[bucket + 1].depth, 1);
    }

    #[test]
    fn pruned_bucket_appears_only_with_time() {
        let mut all = nodes();
        all.push(Node::bare(9, "Orphan", 77, NodeKind::Project));

        let silent = build(all.clone(), &[], true, true);
        assert!(silent.rows().iter().all(|r| r.label != MISSING_PARENTS_LABEL));

        let busy = build(all, &[work(9, 120)], true, true);
        let rows = busy.rows();
        assert_eq!(rows[0].label, MISSING_PARENTS_LABEL);
        assert_eq!(rows[1].id, Some(9));
        assert_eq!(rows[1].sums.get("work"), Some(&120));
    }

    #[test]
    fn unsorted_build_keeps_input_order() {
        let shuffled = vec![
            Node::bare(3, "B", ROOT, NodeKind::Project),
            Node::bare(1, "A", ROOT, NodeKind::Folder),
            Node::bare(2, "B", 1, NodeKind::Project),
        ];
        let hier = build(shuffled, &[], false, false);
        assert_eq!(hier.roots(), vec![3, 1]);

        let sorted = build(
            vec![
                Node::bare(3, "B", ROOT, NodeKind::Project),
                Node::bare(1, "A", ROOT, NodeKind::Folder),
            ],
            &[],
            false,
            true,
        );
        assert_eq!(sorted.roots(), vec![1, 3]);
    }

    #[test]
    fn deep_chain_propagates_to_every_ancestor() {
        let chain = vec![
            Node::bare(1, "top", ROOT, NodeKind::Folder),
            Node::bare(2, "mid", 1, NodeKind::Folder),
            Node::bare(3, "leaf", 2, NodeKind::Project),
        ];
        let hier = build(chain, &[work(3, 45)], false, true);
        for id in [1, 2, 3] {
            assert_eq!(hier.sums(id).unwrap().get("work"), Some(&45), "node {id}");
        }
    }
}

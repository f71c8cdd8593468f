//! Child-set reconciliation
//!
//! The same three-way classification drives every collection write in the
//! system: an aggregate update carries the full intended child set, and the
//! engine decides per child whether to keep-and-update, insert-as-new, or
//! delete. Implemented once, parameterized by identity extraction, instead of
//! duplicating the classification per entity type.
//!
//! Two identity schemes exist:
//!
//! - [`diff_children`] matches on surrogate id. An incoming child with id <= 0
//!   is new; an existing child with no incoming match is removed.
//! - [`diff_by_natural_key`] matches on a business key (the country catalog
//!   uses the ISO code). Unmatched existing rows are left untouched, since
//!   catalog entries are never deleted by synchronization.

use std::collections::HashMap;
use std::hash::Hash;

/// Result of diffing an existing child set against an incoming one by
/// surrogate id.
///
/// The three sets are disjoint: every existing row lands in exactly one of
/// `remove` or `update`, and every incoming DTO in exactly one of `update` or
/// `insert`.
#[derive(Debug)]
pub struct ChildDiff<E, N> {
    /// Existing rows with no incoming counterpart
    pub remove: Vec<E>,
    /// Matched (existing, incoming) pairs; callers write only changed fields
    pub update: Vec<(E, N)>,
    /// Incoming DTOs with no persisted counterpart
    pub insert: Vec<N>,
    /// Positive incoming ids that matched nothing. These DTOs are already in
    /// `insert`; callers log them as a recoverable client inconsistency.
    pub unknown_ids: Vec<i32>,
}

impl<E, N> ChildDiff<E, N> {
    /// True when the diff would issue no writes at all
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }
}

/// Classifies each element of `incoming` against `existing` by surrogate id.
///
/// `existing_id` must return the stable persisted id; `incoming_id` returns
/// the client-supplied id, where anything <= 0 means "new". An incoming id
/// that is positive but unknown is treated as an insert, not an error, and is
/// reported through [`ChildDiff::unknown_ids`].
pub fn diff_children<E, N>(
    existing: Vec<E>,
    incoming: Vec<N>,
    existing_id: impl Fn(&E) -> i32,
    incoming_id: impl Fn(&N) -> i32,
) -> ChildDiff<E, N> {
    let mut by_id: HashMap<i32, usize> = HashMap::with_capacity(existing.len());
    let mut remaining: Vec<Option<E>> = Vec::with_capacity(existing.len());
    for (idx, row) in existing.into_iter().enumerate() {
        by_id.insert(existing_id(&row), idx);
        remaining.push(Some(row));
    }

    let mut update = Vec::new();
    let mut insert = Vec::new();
    let mut unknown_ids = Vec::new();

    for dto in incoming {
        let id = incoming_id(&dto);
        if id > 0 {
            match by_id.remove(&id).and_then(|idx| remaining[idx].take()) {
                Some(row) => update.push((row, dto)),
                None => {
                    unknown_ids.push(id);
                    insert.push(dto);
                }
            }
        } else {
            insert.push(dto);
        }
    }

    let remove = remaining.into_iter().flatten().collect();

    ChildDiff {
        remove,
        update,
        insert,
        unknown_ids,
    }
}

/// Result of diffing by natural key. There is no removal set: rows absent
/// from the incoming batch stay persisted.
#[derive(Debug)]
pub struct NaturalKeyDiff<E, N> {
    /// Matched (existing, incoming) pairs
    pub update: Vec<(E, N)>,
    /// Incoming records whose key is not persisted yet
    pub insert: Vec<N>,
}

/// Classifies `incoming` against `existing` by a business key.
///
/// Duplicate keys within `incoming` each pair with the same existing row,
/// matching the batch-loop semantics of catalog synchronization.
pub fn diff_by_natural_key<E: Clone, N, K: Eq + Hash>(
    existing: &[E],
    incoming: Vec<N>,
    existing_key: impl Fn(&E) -> K,
    incoming_key: impl Fn(&N) -> K,
) -> NaturalKeyDiff<E, N> {
    let by_key: HashMap<K, &E> = existing.iter().map(|row| (existing_key(row), row)).collect();

    let mut update = Vec::new();
    let mut insert = Vec::new();
    for record in incoming {
        match by_key.get(&incoming_key(&record)) {
            Some(row) => update.push(((*row).clone(), record)),
            None => insert.push(record),
        }
    }

    NaturalKeyDiff { update, insert }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        value: &'static str,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Dto {
        id: i32,
        value: &'static str,
    }

    fn row(id: i32, value: &'static str) -> Row {
        Row { id, value }
    }

    fn dto(id: i32, value: &'static str) -> Dto {
        Dto { id, value }
    }

    #[test]
    fn matched_ids_become_updates() {
        let diff = diff_children(
            vec![row(1, "a"), row(2, "b")],
            vec![dto(1, "a2"), dto(2, "b2")],
            |e| e.id,
            |n| n.id,
        );
        assert!(diff.remove.is_empty());
        assert!(diff.insert.is_empty());
        assert_eq!(diff.update.len(), 2);
        assert!(diff.unknown_ids.is_empty());
    }

    #[test]
    fn omitted_existing_rows_are_removed() {
        let diff = diff_children(
            vec![row(1, "a"), row(2, "b"), row(3, "c")],
            vec![dto(2, "b2")],
            |e| e.id,
            |n| n.id,
        );
        assert_eq!(
            diff.remove.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(diff.update.len(), 1);
        assert_eq!(diff.update[0].0.id, 2);
    }

    #[test]
    fn zero_and_negative_ids_are_inserts() {
        let diff = diff_children(
            vec![row(1, "a")],
            vec![dto(0, "new"), dto(-5, "also new"), dto(1, "kept")],
            |e| e.id,
            |n| n.id,
        );
        assert_eq!(diff.insert.len(), 2);
        assert_eq!(diff.update.len(), 1);
        assert!(diff.remove.is_empty());
        assert!(diff.unknown_ids.is_empty());
    }

    #[test]
    fn unknown_positive_id_is_inserted_and_reported() {
        let diff = diff_children(vec![row(1, "a")], vec![dto(99, "stray")], |e| e.id, |n| n.id);
        assert_eq!(diff.unknown_ids, vec![99]);
        assert_eq!(diff.insert.len(), 1);
        assert_eq!(diff.remove.len(), 1);
    }

    #[test]
    fn empty_incoming_removes_everything() {
        let diff: ChildDiff<Row, Dto> =
            diff_children(vec![row(1, "a"), row(2, "b")], vec![], |e| e.id, |n| n.id);
        assert_eq!(diff.remove.len(), 2);
        assert!(!diff.is_empty());
    }

    #[test]
    fn natural_key_never_removes() {
        let existing = vec![row(1, "COL"), row(2, "PER")];
        let diff = diff_by_natural_key(
            &existing,
            vec![dto(0, "COL"), dto(0, "ARG")],
            |e| e.value,
            |n| n.value,
        );
        assert_eq!(diff.update.len(), 1);
        assert_eq!(diff.update[0].0.id, 1);
        assert_eq!(diff.insert.len(), 1);
        assert_eq!(diff.insert[0].value, "ARG");
    }

    proptest! {
        /// Every existing id is accounted for exactly once (removed or
        /// updated) and every incoming element exactly once (updated or
        /// inserted); no id appears in two output sets.
        #[test]
        fn diff_partitions_both_sets(
            existing_ids in proptest::collection::hash_set(1i32..200, 0..30),
            incoming_ids in proptest::collection::vec(-5i32..200, 0..30),
        ) {
            let existing: Vec<Row> = existing_ids.iter().map(|&id| row(id, "e")).collect();
            let incoming: Vec<Dto> = incoming_ids.iter().map(|&id| dto(id, "n")).collect();
            let incoming_len = incoming.len();

            let diff = diff_children(existing, incoming, |e| e.id, |n| n.id);

            // Partition of N
            prop_assert_eq!(diff.update.len() + diff.insert.len(), incoming_len);
            // Partition of E
            prop_assert_eq!(diff.remove.len() + diff.update.len(), existing_ids.len());

            // No existing id in both remove and update
            for removed in &diff.remove {
                prop_assert!(diff.update.iter().all(|(e, _)| e.id != removed.id));
            }
            // Updated pairs agree on id and the id was persisted
            for (e, n) in &diff.update {
                prop_assert_eq!(e.id, n.id);
                prop_assert!(existing_ids.contains(&e.id));
            }
            // Unknown ids are exactly the positive inserts
            let positive_inserts: Vec<i32> = diff
                .insert
                .iter()
                .map(|n| n.id)
                .filter(|&id| id > 0)
                .collect();
            prop_assert_eq!(diff.unknown_ids, positive_inserts);
        }
    }
}

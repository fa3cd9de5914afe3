//! Unit tests for change_set.rs

use crate::task::{ChangeSet, VertexSnapshot};

// ============================================================================
// ChangeSet
// ============================================================================

#[test]
fn test_empty_indices_mean_full_rebuild() {
    assert_eq!(ChangeSet::from_indices(&[]), ChangeSet::Full);
    assert!(ChangeSet::from_indices(&[]).is_full());
}

#[test]
fn test_indices_become_covering_range() {
    assert_eq!(ChangeSet::from_indices(&[7, 2, 5]), ChangeSet::range(2, 7));
    assert_eq!(ChangeSet::from_indices(&[4]), ChangeSet::range(4, 4));
}

#[test]
fn test_merge() {
    let merged = ChangeSet::range(2, 4).merge(ChangeSet::range(8, 9));
    assert_eq!(merged, ChangeSet::range(2, 9));
    assert_eq!(ChangeSet::range(2, 4).merge(ChangeSet::Full), ChangeSet::Full);
    assert_eq!(ChangeSet::Full.merge(ChangeSet::range(0, 0)), ChangeSet::Full);
}

#[test]
fn test_bounded() {
    assert_eq!(ChangeSet::range(1, 3).bounded(4), Some((1, 3)));
    assert_eq!(ChangeSet::range(1, 4).bounded(4), None);
    assert_eq!(ChangeSet::Full.bounded(4), None);
    assert_eq!(ChangeSet::range(0, 0).bounded(0), None);
}

#[test]
#[should_panic(expected = "reversed change range")]
#[cfg(debug_assertions)]
fn test_reversed_range_asserts() {
    let _ = ChangeSet::range(5, 1);
}

// ============================================================================
// VertexSnapshot
// ============================================================================

#[test]
fn test_full_change_builds_every_vertex() {
    let snapshot = VertexSnapshot::build(ChangeSet::Full, 4, |i| i * 10);
    assert_eq!(snapshot, VertexSnapshot::Rebuild(vec![0, 10, 20, 30]));
    assert!(snapshot.is_rebuild());
    assert_eq!(snapshot.len(), 4);
}

#[test]
fn test_range_change_builds_only_the_range() {
    let mut visited = Vec::new();
    let snapshot = VertexSnapshot::build(ChangeSet::range(2, 3), 6, |i| {
        visited.push(i);
        i as u32
    });
    assert_eq!(
        snapshot,
        VertexSnapshot::Partial { first: 2, vertices: vec![2, 3], element_count: 6 }
    );
    assert_eq!(visited, vec![2, 3]);
}

#[test]
fn test_out_of_bounds_range_falls_back_to_rebuild() {
    let snapshot = VertexSnapshot::build(ChangeSet::range(2, 8), 3, |i| i);
    assert_eq!(snapshot, VertexSnapshot::Rebuild(vec![0, 1, 2]));
}

#[test]
fn test_zero_count_is_empty_rebuild() {
    let snapshot = VertexSnapshot::build(ChangeSet::Full, 0, |i| i);
    assert!(snapshot.is_rebuild());
    assert!(snapshot.is_empty());
}

//! Unit tests for resource_state.rs

use crate::resource::resource_state::{ResourceCategory, ResourceState, StateTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// ResourceState
// ============================================================================

#[test]
fn test_rebuild_dominates_update() {
    assert_eq!(ResourceState::NeedsUpdate.merge(ResourceState::NeedsRebuild), ResourceState::NeedsRebuild);
    assert_eq!(ResourceState::NeedsRebuild.merge(ResourceState::NeedsUpdate), ResourceState::NeedsRebuild);
    assert_eq!(ResourceState::Clean.merge(ResourceState::NeedsUpdate), ResourceState::NeedsUpdate);
    assert_eq!(ResourceState::NeedsUpdate.merge(ResourceState::Clean), ResourceState::NeedsUpdate);
}

#[test]
fn test_only_rebuild_to_update_is_illegal() {
    use ResourceState::*;
    for from in [Clean, NeedsUpdate, NeedsRebuild] {
        for to in [Clean, NeedsUpdate, NeedsRebuild] {
            let legal = from.can_transition_to(to);
            assert_eq!(legal, !(from == NeedsRebuild && to == NeedsUpdate), "{:?} -> {:?}", from, to);
        }
    }
}

// ============================================================================
// StateTable
// ============================================================================

#[test]
fn test_new_table_needs_rebuild_everywhere() {
    let table = StateTable::new("test", false);
    for category in ResourceCategory::ALL {
        assert_eq!(table.get(category), ResourceState::NeedsRebuild);
    }
    assert!(table.any_dirty());
    assert_eq!(table.dirty_categories(), ResourceCategory::ALL.to_vec());
}

#[test]
fn test_request_update_keeps_pending_rebuild() {
    let mut table = StateTable::new("test", false);
    table.request(ResourceCategory::VertexBuffer, ResourceState::NeedsUpdate);
    assert_eq!(table.get(ResourceCategory::VertexBuffer), ResourceState::NeedsRebuild);
}

#[test]
fn test_request_never_cleans() {
    let mut table = StateTable::new("test", false);
    table.request(ResourceCategory::Pipelines, ResourceState::Clean);
    assert_eq!(table.get(ResourceCategory::Pipelines), ResourceState::NeedsRebuild);
}

#[test]
fn test_update_cycle() {
    let mut table = StateTable::new("test", false);
    for category in ResourceCategory::ALL {
        table.mark_clean(category);
    }
    assert!(!table.any_dirty());

    table.request(ResourceCategory::GeometryUniform, ResourceState::NeedsUpdate);
    assert_eq!(table.dirty_categories(), vec![ResourceCategory::GeometryUniform]);

    table.request(ResourceCategory::GeometryUniform, ResourceState::NeedsRebuild);
    assert_eq!(table.get(ResourceCategory::GeometryUniform), ResourceState::NeedsRebuild);

    table.mark_clean(ResourceCategory::GeometryUniform);
    assert!(!table.any_dirty());
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "illegal transition")]
fn test_direct_rebuild_to_update_asserts_in_debug() {
    let mut table = StateTable::new("test", false);
    table.set(ResourceCategory::DescriptorSets, ResourceState::NeedsUpdate);
}

#[test]
fn test_random_requests_never_observe_rebuild_to_update() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut table = StateTable::new("random", false);

    for _ in 0..10_000 {
        let category = ResourceCategory::ALL[rng.random_range(0..ResourceCategory::ALL.len())];
        let before = table.get(category);
        match rng.random_range(0..3) {
            0 => table.request(category, ResourceState::NeedsUpdate),
            1 => table.request(category, ResourceState::NeedsRebuild),
            _ => table.mark_clean(category),
        }
        let after = table.get(category);
        assert!(
            !(before == ResourceState::NeedsRebuild && after == ResourceState::NeedsUpdate),
            "observed {:?} -> {:?} on {:?}",
            before, after, category
        );
    }
}

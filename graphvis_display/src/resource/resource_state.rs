/// Resource state machine
///
/// Each renderable tracks one [`ResourceState`] per [`ResourceCategory`].
/// Categories move `Clean -> NeedsUpdate -> Clean` for an in-place refresh or
/// `Clean -> NeedsRebuild -> Clean` for destroy + recreate. `NeedsRebuild`
/// never moves to `NeedsUpdate`: a rebuild has to complete first.

use std::fmt;
use std::panic::Location;

use crate::log::LogSeverity;
use crate::graphvis::Engine;

/// Disposition of one resource category
///
/// Ordered by dominance: a pending rebuild beats a pending update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceState {
    Clean,
    NeedsUpdate,
    NeedsRebuild,
}

impl ResourceState {
    /// Whether moving from `self` to `next` is allowed
    pub fn can_transition_to(self, next: ResourceState) -> bool {
        !(self == ResourceState::NeedsRebuild && next == ResourceState::NeedsUpdate)
    }

    /// Dominance merge of two requests
    pub fn merge(self, other: ResourceState) -> ResourceState {
        self.max(other)
    }

    pub fn is_dirty(self) -> bool {
        self != ResourceState::Clean
    }
}

/// Resource categories, in the order `display_update` processes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    VertexBuffer,
    VertexUniform,
    GeometryUniform,
    FragmentUniform,
    DescriptorSets,
    CommandBuffers,
    Pipelines,
}

impl ResourceCategory {
    /// Every category, in dependency order
    pub const ALL: [ResourceCategory; 7] = [
        ResourceCategory::VertexBuffer,
        ResourceCategory::VertexUniform,
        ResourceCategory::GeometryUniform,
        ResourceCategory::FragmentUniform,
        ResourceCategory::DescriptorSets,
        ResourceCategory::CommandBuffers,
        ResourceCategory::Pipelines,
    ];

    /// Categories holding one copy per swapchain image
    pub const PER_IMAGE: [ResourceCategory; 6] = [
        ResourceCategory::VertexUniform,
        ResourceCategory::GeometryUniform,
        ResourceCategory::FragmentUniform,
        ResourceCategory::DescriptorSets,
        ResourceCategory::CommandBuffers,
        ResourceCategory::Pipelines,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-renderable table of category states
///
/// Starts with every category `NeedsRebuild`: nothing exists yet.
#[derive(Debug, Clone)]
pub struct StateTable {
    owner: String,
    states: [ResourceState; 7],
    log_transitions: bool,
}

impl StateTable {
    pub fn new(owner: impl Into<String>, log_transitions: bool) -> Self {
        Self {
            owner: owner.into(),
            states: [ResourceState::NeedsRebuild; 7],
            log_transitions,
        }
    }

    pub fn get(&self, category: ResourceCategory) -> ResourceState {
        self.states[category.index()]
    }

    /// Turn transition tracing on or off
    pub fn set_log_transitions(&mut self, enabled: bool) {
        self.log_transitions = enabled;
    }

    /// Raw transition
    ///
    /// `NeedsRebuild -> NeedsUpdate` is a programming error: it asserts in
    /// debug builds and is ignored (the rebuild stays pending) in release.
    #[track_caller]
    pub fn set(&mut self, category: ResourceCategory, state: ResourceState) {
        let current = self.get(category);
        if !current.can_transition_to(state) {
            debug_assert!(
                false,
                "{}: illegal transition {:?} {:?} -> {:?}",
                self.owner, category, current, state
            );
            crate::engine_warn!(
                "graphvis::StateTable",
                "{}: ignored illegal transition {} {:?} -> {:?}",
                self.owner, category, current, state
            );
            return;
        }
        if current == state {
            return;
        }
        if self.log_transitions {
            let caller = Location::caller();
            Engine::log_detailed(
                LogSeverity::Trace,
                "graphvis::StateTable",
                format!("{}: {} {:?} -> {:?}", self.owner, category, current, state),
                caller.file(),
                caller.line(),
            );
        }
        self.states[category.index()] = state;
    }

    /// Request work on a category, merged by dominance
    ///
    /// Never lowers a state and never cleans: requesting `NeedsUpdate` on a
    /// category that already needs a rebuild leaves the rebuild pending.
    #[track_caller]
    pub fn request(&mut self, category: ResourceCategory, state: ResourceState) {
        let merged = self.get(category).merge(state);
        self.set(category, merged);
    }

    /// Mark a category clean after its create/update step succeeded
    #[track_caller]
    pub fn mark_clean(&mut self, category: ResourceCategory) {
        self.set(category, ResourceState::Clean);
    }

    /// True when any category is dirty
    pub fn any_dirty(&self) -> bool {
        self.states.iter().any(|s| s.is_dirty())
    }

    /// Dirty categories in dependency order
    pub fn dirty_categories(&self) -> Vec<ResourceCategory> {
        ResourceCategory::ALL
            .iter()
            .copied()
            .filter(|&c| self.get(c).is_dirty())
            .collect()
    }
}

#[cfg(test)]
#[path = "resource_state_tests.rs"]
mod tests;

/// Visual change notifications
///
/// The graph layer reports which visual property changed on which elements.
/// Related properties share one *master* property so that, for example, a
/// change to X and a change to Y produce a single position update. Some
/// masters *trump* others: a full vertex rebuild makes a pending colour
/// update redundant.

use crate::task::ChangeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualProperty {
    // Nodes
    VerticesRebuild,
    VerticesAdded,
    VerticesRemoved,
    VertexVisibility,
    VertexX,
    VertexY,
    VertexZ,
    VertexRadius,
    VertexColor,
    VertexSelected,
    VertexDim,
    VertexForegroundIcon,
    VertexBackgroundIcon,
    VertexBlazed,
    VertexBlazeAngle,
    VertexBlazeColor,
    // Connections
    ConnectionsRebuild,
    ConnectionsAdded,
    ConnectionsRemoved,
    ConnectionVisibility,
    ConnectionWidth,
    ConnectionColor,
    ConnectionSelected,
    ConnectionDirected,
    ConnectionDim,
    ConnectionLineStyle,
    // Labels
    NodeLabelsRebuild,
    NodeLabelText,
    NodeLabelSize,
    ConnectionLabelsRebuild,
    ConnectionLabelText,
    ConnectionLabelSize,
    // Scene-wide
    ConnectionsOpacity,
    BlazeSize,
    BlazeOpacity,
    HighlightColour,
    Camera,
}

impl VisualProperty {
    /// Property whose processing covers this one
    pub fn master(self) -> VisualProperty {
        use VisualProperty::*;
        match self {
            VerticesRebuild | VerticesAdded | VerticesRemoved | VertexVisibility => VerticesRebuild,
            VertexX | VertexY | VertexZ | VertexRadius => VertexX,
            VertexSelected | VertexDim => VertexSelected,
            VertexForegroundIcon | VertexBackgroundIcon => VertexForegroundIcon,
            VertexBlazed | VertexBlazeAngle | VertexBlazeColor => VertexBlazed,
            ConnectionsRebuild | ConnectionsAdded | ConnectionsRemoved | ConnectionVisibility
            | ConnectionWidth => ConnectionsRebuild,
            ConnectionSelected | ConnectionDirected | ConnectionDim | ConnectionLineStyle => {
                ConnectionSelected
            }
            NodeLabelsRebuild | NodeLabelText | NodeLabelSize => NodeLabelsRebuild,
            ConnectionLabelsRebuild | ConnectionLabelText | ConnectionLabelSize => {
                ConnectionLabelsRebuild
            }
            BlazeSize | BlazeOpacity => BlazeSize,
            other => other,
        }
    }

    /// Master properties made redundant when this master is processed
    pub fn trumped(self) -> &'static [VisualProperty] {
        use VisualProperty::*;
        match self {
            VerticesRebuild => &[
                VertexSelected,
                VertexX,
                VertexColor,
                VertexForegroundIcon,
                VertexBlazed,
                NodeLabelsRebuild,
            ],
            ConnectionsRebuild => &[ConnectionSelected, ConnectionColor, ConnectionLabelsRebuild],
            _ => &[],
        }
    }
}

/// One change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualChange {
    pub property: VisualProperty,
    pub changes: ChangeSet,
}

impl VisualChange {
    /// Change to specific elements; an empty index list means "all elements"
    pub fn new(property: VisualProperty, indices: &[usize]) -> Self {
        Self {
            property,
            changes: ChangeSet::from_indices(indices),
        }
    }

    /// Change to every element
    pub fn full(property: VisualProperty) -> Self {
        Self {
            property,
            changes: ChangeSet::Full,
        }
    }

    /// Change to elements `first..=last`
    pub fn range(property: VisualProperty, first: usize, last: usize) -> Self {
        Self {
            property,
            changes: ChangeSet::range(first, last),
        }
    }
}

/// Collapse a batch of changes to their masters and drop trumped ones
///
/// Masters keep the order of their first appearance; change sets of the
/// same master are merged.
pub fn consolidate(changes: &[VisualChange]) -> Vec<VisualChange> {
    let mut merged: Vec<VisualChange> = Vec::new();
    for change in changes {
        let master = change.property.master();
        match merged.iter_mut().find(|c| c.property == master) {
            Some(existing) => existing.changes = existing.changes.merge(change.changes),
            None => merged.push(VisualChange { property: master, changes: change.changes }),
        }
    }

    let trumped: Vec<VisualProperty> = merged
        .iter()
        .flat_map(|c| c.property.trumped().iter().copied())
        .collect();
    merged.retain(|c| !trumped.contains(&c.property));
    merged
}

#[cfg(test)]
#[path = "visual_change_tests.rs"]
mod tests;

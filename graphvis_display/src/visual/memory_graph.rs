/// MemoryGraph - in-memory `VisualAccess` implementation
///
/// Used by hosts without a graph database and by tests.

use glam::Vec4;

use crate::camera::Camera;
use crate::visual::{ConnectionVisual, NodeVisual, VisualAccess};

#[derive(Debug, Clone)]
pub struct MemoryGraph {
    nodes: Vec<NodeVisual>,
    connections: Vec<ConnectionVisual>,
    camera: Camera,
    highlight_colour: Vec4,
    connection_opacity: f32,
    blaze_size: f32,
    blaze_opacity: f32,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            camera: Camera::default(),
            highlight_colour: Vec4::new(1.0, 0.1, 0.1, 1.0),
            connection_opacity: 1.0,
            blaze_size: 0.3,
            blaze_opacity: 1.0,
        }
    }

    /// Append a node, returning its index
    pub fn add_node(&mut self, node: NodeVisual) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a connection, returning its index
    pub fn add_connection(&mut self, connection: ConnectionVisual) -> usize {
        debug_assert!(
            connection.low < self.nodes.len() && connection.high < self.nodes.len(),
            "connection endpoint out of range"
        );
        self.connections.push(connection);
        self.connections.len() - 1
    }

    /// Remove every connection touching `index`, then the node itself
    ///
    /// Later nodes shift down by one, like a compacting graph store.
    pub fn remove_node(&mut self, index: usize) -> Option<NodeVisual> {
        if index >= self.nodes.len() {
            return None;
        }
        self.connections.retain(|c| c.low != index && c.high != index);
        for connection in &mut self.connections {
            if connection.low > index {
                connection.low -= 1;
            }
            if connection.high > index {
                connection.high -= 1;
            }
        }
        Some(self.nodes.remove(index))
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut NodeVisual> {
        self.nodes.get_mut(index)
    }

    pub fn connection_mut(&mut self, index: usize) -> Option<&mut ConnectionVisual> {
        self.connections.get_mut(index)
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_highlight_colour(&mut self, colour: Vec4) {
        self.highlight_colour = colour;
    }

    pub fn set_connection_opacity(&mut self, opacity: f32) {
        self.connection_opacity = opacity;
    }

    pub fn set_blaze_style(&mut self, size: f32, opacity: f32) {
        self.blaze_size = size;
        self.blaze_opacity = opacity;
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualAccess for MemoryGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn node(&self, index: usize) -> NodeVisual {
        self.nodes[index].clone()
    }

    fn connection(&self, index: usize) -> ConnectionVisual {
        self.connections[index].clone()
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn highlight_colour(&self) -> Vec4 {
        self.highlight_colour
    }

    fn connection_opacity(&self) -> f32 {
        self.connection_opacity
    }

    fn blaze_size(&self) -> f32 {
        self.blaze_size
    }

    fn blaze_opacity(&self) -> f32 {
        self.blaze_opacity
    }
}

#[cfg(test)]
#[path = "memory_graph_tests.rs"]
mod tests;

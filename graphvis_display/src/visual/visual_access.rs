/// VisualAccess - read-only view of the graph's visual attributes
///
/// Implemented by the graph data layer. Only the producer thread reads it,
/// while preparing update tasks; renderables never see it.

use glam::{Vec3, Vec4};

use crate::camera::Camera;

/// Connection line style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dotted,
    Dashed,
    Diamond,
}

impl LineStyle {
    /// Value the shaders decode
    pub fn code(self) -> u32 {
        match self {
            LineStyle::Solid => 0,
            LineStyle::Dotted => 1,
            LineStyle::Dashed => 2,
            LineStyle::Diamond => 3,
        }
    }
}

/// Blaze (pointer marker) drawn next to a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blaze {
    pub angle_degrees: f32,
    pub colour: Vec4,
}

/// Visual attributes of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub position: Vec3,
    pub radius: f32,
    pub colour: Vec4,
    pub visibility: f32,
    pub selected: bool,
    pub dimmed: bool,
    pub foreground_icon: u32,
    pub background_icon: u32,
    pub blaze: Option<Blaze>,
    pub label: Option<String>,
}

impl NodeVisual {
    /// Visible, unselected node at `position` with default attributes
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            radius: 1.0,
            colour: Vec4::new(0.5, 0.5, 0.5, 1.0),
            visibility: 1.0,
            selected: false,
            dimmed: false,
            foreground_icon: 0,
            background_icon: 0,
            blaze: None,
            label: None,
        }
    }
}

/// Visual attributes of one connection
///
/// `low == high` is a loop (self-connection).
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionVisual {
    pub low: usize,
    pub high: usize,
    pub colour: Vec4,
    pub visibility: f32,
    pub selected: bool,
    pub dimmed: bool,
    pub directed: bool,
    pub width: f32,
    pub line_style: LineStyle,
    pub label: Option<String>,
}

impl ConnectionVisual {
    /// Solid, undirected connection between two nodes
    pub fn between(low: usize, high: usize) -> Self {
        Self {
            low,
            high,
            colour: Vec4::new(0.7, 0.7, 0.7, 1.0),
            visibility: 1.0,
            selected: false,
            dimmed: false,
            directed: false,
            width: 1.0,
            line_style: LineStyle::Solid,
            label: None,
        }
    }

    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

/// Read-only graph snapshot consumed by task preparation
pub trait VisualAccess {
    fn node_count(&self) -> usize;

    fn connection_count(&self) -> usize;

    /// Attributes of node `index` (`index < node_count()`)
    fn node(&self, index: usize) -> NodeVisual;

    /// Attributes of connection `index` (`index < connection_count()`)
    fn connection(&self, index: usize) -> ConnectionVisual;

    fn camera(&self) -> Camera;

    fn highlight_colour(&self) -> Vec4;

    /// Global opacity applied to every connection
    fn connection_opacity(&self) -> f32;

    fn blaze_size(&self) -> f32;

    fn blaze_opacity(&self) -> f32;
}

/// Display configuration

use crate::camera::Projection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    /// Trace every resource state transition with its caller location
    pub log_state_transitions: bool,
    /// Perspective parameters for the geometry (projection) uniforms
    pub projection: Projection,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            log_state_transitions: cfg!(debug_assertions),
            projection: Projection::default(),
        }
    }
}

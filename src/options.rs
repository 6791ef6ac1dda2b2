//! Render pass configuration

use crate::error::{EmfPlusError, EmfPlusResult};
use serde::Deserialize;

/// Options for a render pass
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Abort the pass on the first record error instead of skipping the record
    pub strict: bool,
    /// Width of the output surface
    pub width: u32,
    /// Height of the output surface
    pub height: u32,
    /// Logical DPI used until an EMF+ header record supplies one
    pub dpi: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            width: 800,
            height: 600,
            dpi: 96.0,
        }
    }
}

impl RenderOptions {
    /// Parse options from a JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> EmfPlusResult<Self> {
        serde_json::from_str(json).map_err(|e| EmfPlusError::InvalidData(format!("render options: {}", e)))
    }
}

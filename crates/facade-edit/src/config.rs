use crate::navigate::NavigationConfig;
use facade_core::intersection::PickConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub pick: PickConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Mesh that receives faces built from scratch.
    #[serde(default = "default_target_mesh")]
    pub target_mesh: String,
    /// Inner radius of the create-mode cursor cross, in pixels.
    #[serde(default = "default_cursor_radius")]
    pub cursor_radius: f64,
}

fn default_target_mesh() -> String {
    "facadeMesh".to_string()
}

fn default_cursor_radius() -> f64 {
    3.0
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            pick: PickConfig::default(),
            navigation: NavigationConfig::default(),
            target_mesh: default_target_mesh(),
            cursor_radius: default_cursor_radius(),
        }
    }
}

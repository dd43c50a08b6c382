//! Inventory of a `.blend` file as reported by the Blender entrypoint.

use serde::{Deserialize, Serialize};

use crate::scene::{EmptyDisplay, LightKind, NodeData, Projection};

/// Objects, collections, and actions found in a `.blend` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneInventory {
    /// Whether the inventory succeeded.
    pub ok: bool,
    /// Error message if not ok.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Scene objects.
    #[serde(default)]
    pub objects: Vec<InventoryObject>,
    /// Top-level collection names in scene order.
    #[serde(default)]
    pub collections: Vec<String>,
    /// Action names.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Render output extension as reported by the host (e.g. ".png").
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    /// Whether the default world background node exists.
    #[serde(default)]
    pub has_world: bool,
    /// Current scene frame.
    #[serde(default = "default_frame")]
    pub frame_current: u32,
    /// Time spent in Blender, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

fn default_file_extension() -> String {
    ".png".to_string()
}

fn default_frame() -> u32 {
    1
}

/// One object in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryObject {
    /// Object name.
    pub name: String,
    /// Blender object type (`EMPTY`, `CAMERA`, `LIGHT`, `MESH`, `ARMATURE`, ...).
    pub kind: String,
    /// Parent object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl InventoryObject {
    /// Creates an inventory object.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            parent: None,
        }
    }

    /// Maps the Blender object type onto scene node data.
    ///
    /// Type-specific settings are not inventoried; they get neutral defaults.
    pub fn node_data(&self) -> NodeData {
        match self.kind.as_str() {
            "EMPTY" => NodeData::Empty {
                display: EmptyDisplay::PlainAxes,
                size: 1.0,
            },
            "CAMERA" => NodeData::Camera {
                projection: Projection::Perspective { lens: 50.0 },
            },
            "LIGHT" => NodeData::Light {
                light: LightKind::Point,
            },
            "ARMATURE" => NodeData::Armature,
            _ => NodeData::Mesh,
        }
    }
}

impl SceneInventory {
    /// Parses an inventory report.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns true if an object with this name exists.
    pub fn has_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o.name == name)
    }
}

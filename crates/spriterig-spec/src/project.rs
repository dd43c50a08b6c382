//! Project file: catalog plus render configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CharacterEntry};
use crate::error::SpecError;
use crate::rig::{RenderSettings, RigParams};

/// Current project file version.
pub const PROJECT_VERSION: u32 = 1;

/// Default number of render directions.
pub const DEFAULT_DIRECTION_COUNT: u32 = 8;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "renders";

/// Default image file extension.
pub const DEFAULT_FILE_EXTENSION: &str = "png";

/// A spriterig project: what to render and how.
///
/// ```json
/// {
///   "project_version": 1,
///   "direction_count": 8,
///   "characters": [
///     { "id": "archer", "animations": [
///       { "export_name": "walk", "action": "walk", "start_frame": 1, "frame_count": 16 }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteProject {
    /// Schema version; must be 1.
    #[serde(default = "default_project_version")]
    pub project_version: u32,

    /// Number of evenly spaced render directions.
    #[serde(default = "default_direction_count")]
    pub direction_count: u32,

    /// Directory receiving rendered frames.
    #[serde(default = "default_output_root")]
    pub output_root: String,

    /// Image file extension used when the host does not report one.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Rig geometry overrides.
    #[serde(default)]
    pub rig: RigParams,

    /// Render output overrides.
    #[serde(default)]
    pub render: RenderSettings,

    /// Characters in render order.
    pub characters: Vec<CharacterEntry>,
}

fn default_project_version() -> u32 {
    PROJECT_VERSION
}

fn default_direction_count() -> u32 {
    DEFAULT_DIRECTION_COUNT
}

fn default_output_root() -> String {
    DEFAULT_OUTPUT_ROOT.to_string()
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

impl SpriteProject {
    /// Creates a project with default settings for the given characters.
    pub fn new(characters: Vec<CharacterEntry>) -> Self {
        Self {
            project_version: PROJECT_VERSION,
            direction_count: DEFAULT_DIRECTION_COUNT,
            output_root: default_output_root(),
            file_extension: default_file_extension(),
            rig: RigParams::default(),
            render: RenderSettings::default(),
            characters,
        }
    }

    /// Sets the direction count.
    pub fn direction_count(mut self, count: u32) -> Self {
        self.direction_count = count;
        self
    }

    /// Sets the output root.
    pub fn output_root(mut self, root: impl Into<String>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Parses a project from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a project file.
    pub fn from_file(path: &Path) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serializes the project to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the project to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the characters as a catalog.
    pub fn catalog(&self) -> Catalog {
        Catalog::from(self.characters.clone())
    }
}

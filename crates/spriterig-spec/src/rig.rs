//! Rig geometry and render output parameters.
//!
//! All angles in this module are in degrees. Conversion to the host's native
//! units happens once, at the scene boundary.

use serde::{Deserialize, Serialize};

/// A 3-component vector (location, scale, or Euler angles).
pub type Vec3 = [f64; 3];

/// Ambient/background color applied to the world background node.
pub const DEFAULT_AMBIENT_COLOR: [f64; 4] = [0.0212, 0.0212, 0.0212, 1.0];

/// Geometry of the directional rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RigParams {
    /// Name of the pivot empty.
    pub pivot_name: String,
    /// Name of the camera object.
    pub camera_name: String,
    /// Name of the light object.
    pub light_name: String,
    /// Camera offset relative to the pivot.
    pub camera_location: Vec3,
    /// Camera rotation relative to the pivot, in degrees.
    pub camera_rotation: Vec3,
    /// Orthographic view width.
    pub ortho_scale: f64,
    /// Light offset relative to the pivot.
    pub light_location: Vec3,
    /// Light rotation relative to the pivot, in degrees.
    pub light_rotation: Vec3,
    /// Pivot yaw after the rig is built, in degrees.
    pub initial_yaw: f64,
    /// Name of the reference geometry root.
    pub reference_root_name: String,
    /// Non-rendering human-scale boxes placed under the reference root.
    pub reference_parts: Vec<ReferencePart>,
}

impl Default for RigParams {
    fn default() -> Self {
        Self {
            pivot_name: "ROTATEBOX".to_string(),
            camera_name: "CAMERA".to_string(),
            light_name: "LIGHT".to_string(),
            camera_location: [0.0, -10.0, 8.5],
            camera_rotation: [60.0, 0.0, 0.0],
            ortho_scale: 7.0,
            light_location: [8.05, -11.788, 24.0],
            light_rotation: [0.0, 30.7, -55.7],
            initial_yaw: 45.0,
            reference_root_name: "_Approximate_Scale_".to_string(),
            reference_parts: ReferencePart::human(),
        }
    }
}

/// One box of the reference geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferencePart {
    /// Object name.
    pub name: String,
    /// Box scale (unit cube scaled per axis).
    pub scale: Vec3,
    /// Box center.
    pub location: Vec3,
}

impl ReferencePart {
    /// Creates a reference part.
    pub fn new(name: impl Into<String>, scale: Vec3, location: Vec3) -> Self {
        Self {
            name: name.into(),
            scale,
            location,
        }
    }

    /// Approximate height and stature of a human: head, torso, two legs.
    pub fn human() -> Vec<ReferencePart> {
        vec![
            ReferencePart::new("Human_Head", [0.2, 0.25, 0.25], [0.0, 0.0, 1.7]),
            ReferencePart::new("Human_Torso", [0.5, 0.25, 0.7], [0.0, 0.0, 1.15]),
            ReferencePart::new("Human_Leg_L", [0.15, 0.15, 0.8], [0.15, 0.0, 0.4]),
            ReferencePart::new("Human_Leg_R", [0.15, 0.15, 0.8], [-0.15, 0.0, 0.4]),
        ]
    }
}

/// Render output configuration applied when the rig is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RenderSettings {
    /// Host render engine identifier.
    pub engine: String,
    /// Render with a transparent background.
    pub transparent_background: bool,
    /// World background color (RGBA, 0-1).
    pub ambient_color: [f64; 4],
    /// Enable denoising.
    pub denoise: bool,
    /// Pixel filter width; the minimum effectively disables anti-aliasing.
    pub filter_size: f64,
    /// Output image compression, 0-100.
    pub compression: u8,
    /// Output resolution [width, height] in pixels.
    pub resolution: [u32; 2],
    /// Scene end frame.
    pub frame_end: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            engine: "BLENDER_EEVEE_NEXT".to_string(),
            transparent_background: true,
            ambient_color: DEFAULT_AMBIENT_COLOR,
            denoise: true,
            filter_size: 0.01,
            compression: 100,
            resolution: [256, 256],
            frame_end: 8,
        }
    }
}

//! Host collaborator traits.
//!
//! The rig builder and the batch driver never touch a host directly. They
//! receive an explicit scene context implementing [`Scene`] (graph, actions,
//! frames, settings) and, for rendering, [`Renderer`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use spriterig_spec::{RenderSettings, Vec3};

use crate::error::RigResult;
use crate::units::Euler;

/// Handle to a node owned by a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// How an empty is drawn in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDisplay {
    PlainAxes,
    Arrows,
}

/// Camera projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Orthographic with the given view width.
    Orthographic { scale: f64 },
    /// Perspective with the given focal length in millimetres.
    Perspective { lens: f64 },
}

/// Light type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Sun,
    Point,
    Area,
}

/// What a node is, with its type-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeData {
    Empty { display: EmptyDisplay, size: f64 },
    Camera { projection: Projection },
    Light { light: LightKind },
    Cube { size: f64, wireframe: bool },
    Armature,
    Mesh,
}

/// Render and viewport visibility, settable independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub render: bool,
    pub viewport: bool,
}

impl Visibility {
    /// Visible everywhere.
    pub const VISIBLE: Visibility = Visibility {
        render: true,
        viewport: true,
    };

    /// Hidden everywhere.
    pub const HIDDEN: Visibility = Visibility {
        render: false,
        viewport: false,
    };

    /// Drawn in the viewport but never rendered.
    pub const VIEWPORT_ONLY: Visibility = Visibility {
        render: false,
        viewport: true,
    };
}

impl Default for Visibility {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Scene graph, action binding, and frame selection collaborator.
///
/// Methods that take a [`NodeId`] fail with `NotFound` for stale handles.
pub trait Scene {
    /// Adds a node at the origin with identity rotation and unit scale.
    fn add_node(&mut self, name: &str, data: NodeData) -> RigResult<NodeId>;

    /// Removes a node. Its children are unparented, not removed.
    fn remove_node(&mut self, node: NodeId) -> RigResult<()>;

    /// Looks up a node by name.
    fn find_node(&self, name: &str) -> Option<NodeId>;

    /// Returns a node's name.
    fn node_name(&self, node: NodeId) -> Option<String>;

    /// Returns a node's direct children.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Returns a node's parent.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Sets or clears a node's parent. Transforms become parent-relative.
    fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> RigResult<()>;

    /// Sets a node's local location.
    fn set_location(&mut self, node: NodeId, location: Vec3) -> RigResult<()>;

    /// Returns a node's local location.
    fn location(&self, node: NodeId) -> Option<Vec3>;

    /// Sets a node's local rotation.
    fn set_rotation(&mut self, node: NodeId, rotation: Euler) -> RigResult<()>;

    /// Returns a node's local rotation.
    fn rotation(&self, node: NodeId) -> Option<Euler>;

    /// Sets a node's local scale.
    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> RigResult<()>;

    /// Sets a node's render/viewport visibility.
    fn set_visibility(&mut self, node: NodeId, visibility: Visibility) -> RigResult<()>;

    /// Returns a node's render/viewport visibility.
    fn visibility(&self, node: NodeId) -> Option<Visibility>;

    /// Makes a camera node the scene's active camera.
    fn set_active_camera(&mut self, camera: NodeId) -> RigResult<()>;

    /// Returns the active camera.
    fn active_camera(&self) -> Option<NodeId>;

    /// Returns true if the default world background exists.
    fn has_world(&self) -> bool;

    /// Applies output settings. Fails with `PreconditionViolation` without a world.
    fn apply_render_settings(&mut self, settings: &RenderSettings) -> RigResult<()>;

    /// Extension (without dot) of the images the host writes.
    fn file_extension(&self) -> String;

    /// Names of the top-level collections, in scene order.
    fn collections(&self) -> Vec<String>;

    /// Sets a collection's render/viewport visibility.
    fn set_collection_visibility(&mut self, name: &str, visibility: Visibility) -> RigResult<()>;

    /// Returns a collection's render/viewport visibility.
    fn collection_visibility(&self, name: &str) -> Option<Visibility>;

    /// Binds a named action to an armature's active slot.
    fn bind_action(&mut self, armature: NodeId, action: &str) -> RigResult<()>;

    /// Returns the action bound to an armature.
    fn active_action(&self, armature: NodeId) -> Option<String>;

    /// Sets the current evaluation frame (1-based).
    fn set_frame(&mut self, frame: u32) -> RigResult<()>;

    /// Returns the current evaluation frame.
    fn current_frame(&self) -> u32;

    /// Propagates pending transform changes.
    fn update(&mut self) -> RigResult<()>;
}

/// Render collaborator.
pub trait Renderer {
    /// Renders the current frame to `output`, blocking until the image is
    /// written. Intermediate directories are created as needed.
    fn render_current_frame(&mut self, output: &Path) -> RigResult<()>;
}

/// Removes a node and all of its descendants, deepest first.
pub fn remove_subtree<S: Scene + ?Sized>(scene: &mut S, node: NodeId) -> RigResult<()> {
    for child in scene.children(node) {
        remove_subtree(scene, child)?;
    }
    scene.remove_node(node)
}

/// Yaw of a node in world space, summing Z rotations up the parent chain.
///
/// Valid for the rig, where every ancestor rotates about Z only.
pub fn world_yaw_degrees<S: Scene + ?Sized>(scene: &S, node: NodeId) -> Option<f64> {
    let mut yaw = scene.rotation(node)?.yaw_degrees();
    let mut current = scene.parent(node);
    while let Some(parent) = current {
        yaw += scene.rotation(parent)?.yaw_degrees();
        current = scene.parent(parent);
    }
    Some(yaw)
}

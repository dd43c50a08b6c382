//! In-memory scene host.
//!
//! Holds a scene graph, collections, actions, and frame state without any
//! external application. Rendering records what would have been rendered.
//! Used for dry runs, for planning against a Blender inventory, and in tests.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use spriterig_spec::{Catalog, RenderSettings, Vec3};

use crate::error::{Resource, RigError, RigResult};
use crate::inventory::SceneInventory;
use crate::scene::{world_yaw_degrees, NodeData, NodeId, Renderer, Scene, Visibility};
use crate::units::Euler;

#[derive(Debug, Clone)]
struct Node {
    name: String,
    data: NodeData,
    parent: Option<NodeId>,
    location: Vec3,
    rotation: Euler,
    scale: Vec3,
    visibility: Visibility,
    action: Option<String>,
}

/// A frame captured by [`MemoryScene`]'s renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    /// Output path requested.
    pub path: PathBuf,
    /// Frame current at render time.
    pub frame: u32,
    /// World yaw of the active camera in degrees, if there is one.
    pub camera_yaw: Option<f64>,
    /// Collections visible to the renderer at render time.
    pub visible_collections: Vec<String>,
}

/// Scene host kept entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: Vec<Option<Node>>,
    collections: Vec<(String, Visibility)>,
    actions: BTreeSet<String>,
    has_world: bool,
    active_camera: Option<NodeId>,
    frame: u32,
    settings: Option<RenderSettings>,
    file_extension: String,
    update_count: usize,
    renders: Vec<RenderRecord>,
    failures: HashMap<PathBuf, u32>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Creates an empty scene with a default world and PNG output.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            collections: Vec::new(),
            actions: BTreeSet::new(),
            has_world: true,
            active_camera: None,
            frame: 1,
            settings: None,
            file_extension: "png".to_string(),
            update_count: 0,
            renders: Vec::new(),
            failures: HashMap::new(),
        }
    }

    /// Seeds a scene from a `.blend` inventory.
    pub fn from_inventory(inventory: &SceneInventory) -> RigResult<Self> {
        let mut scene = Self::new()
            .with_world(inventory.has_world)
            .with_file_extension(&inventory.file_extension);
        scene.frame = inventory.frame_current;
        for name in &inventory.collections {
            scene = scene.with_collection(name);
        }
        for action in &inventory.actions {
            scene = scene.with_action(action);
        }
        for object in &inventory.objects {
            scene.add_node(&object.name, object.node_data())?;
        }
        for object in &inventory.objects {
            if let Some(ref parent_name) = object.parent {
                let child = scene.require(&object.name)?;
                let parent = scene.require(parent_name)?;
                scene.set_parent(child, Some(parent))?;
            }
        }
        Ok(scene)
    }

    /// Seeds a scene with everything a catalog refers to: one collection and
    /// one armature per character, and every source action.
    pub fn from_catalog(catalog: &Catalog) -> RigResult<Self> {
        let mut scene = Self::new();
        for character in catalog {
            scene = scene
                .with_collection(&character.id)
                .with_armature(&character.armature_name())?;
            for animation in &character.animations {
                scene = scene.with_action(&animation.action);
            }
        }
        Ok(scene)
    }

    /// Adds a top-level collection.
    pub fn with_collection(mut self, name: &str) -> Self {
        if !self.collections.iter().any(|(n, _)| n == name) {
            self.collections.push((name.to_string(), Visibility::VISIBLE));
        }
        self
    }

    /// Adds an action.
    pub fn with_action(mut self, name: &str) -> Self {
        self.actions.insert(name.to_string());
        self
    }

    /// Adds an armature object.
    pub fn with_armature(mut self, name: &str) -> RigResult<Self> {
        if self.find_node(name).is_none() {
            self.add_node(name, NodeData::Armature)?;
        }
        Ok(self)
    }

    /// Sets whether the default world background exists.
    pub fn with_world(mut self, has_world: bool) -> Self {
        self.has_world = has_world;
        self
    }

    /// Sets the output file extension (leading dot optional).
    pub fn with_file_extension(mut self, extension: &str) -> Self {
        self.file_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Makes the next `times` renders to `path` fail.
    pub fn fail_render(mut self, path: impl Into<PathBuf>, times: u32) -> Self {
        self.failures.insert(path.into(), times);
        self
    }

    /// Frames rendered so far, in order.
    pub fn renders(&self) -> &[RenderRecord] {
        &self.renders
    }

    /// Render settings applied, if any.
    pub fn render_settings(&self) -> Option<&RenderSettings> {
        self.settings.as_ref()
    }

    /// Number of `update` calls.
    pub fn update_count(&self) -> usize {
        self.update_count
    }

    /// Node type data.
    pub fn node_data(&self, node: NodeId) -> Option<&NodeData> {
        self.get(node).map(|n| &n.data)
    }

    /// Node scale.
    pub fn scale(&self, node: NodeId) -> Option<Vec3> {
        self.get(node).map(|n| n.scale)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    fn require(&self, name: &str) -> RigResult<NodeId> {
        self.find_node(name)
            .ok_or_else(|| RigError::not_found(Resource::Node, name))
    }

    fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0).and_then(|n| n.as_ref())
    }

    fn get_mut(&mut self, node: NodeId) -> RigResult<&mut Node> {
        self.nodes
            .get_mut(node.0)
            .and_then(|n| n.as_mut())
            .ok_or_else(|| RigError::not_found(Resource::Node, format!("#{}", node.0)))
    }
}

impl Scene for MemoryScene {
    fn add_node(&mut self, name: &str, data: NodeData) -> RigResult<NodeId> {
        if self.find_node(name).is_some() {
            return Err(RigError::precondition(format!(
                "a node named '{}' already exists",
                name
            )));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            name: name.to_string(),
            data,
            parent: None,
            location: [0.0, 0.0, 0.0],
            rotation: Euler::IDENTITY,
            scale: [1.0, 1.0, 1.0],
            visibility: Visibility::VISIBLE,
            action: None,
        }));
        Ok(id)
    }

    fn remove_node(&mut self, node: NodeId) -> RigResult<()> {
        self.get_mut(node)?;
        for child in self.children(node) {
            self.get_mut(child)?.parent = None;
        }
        if self.active_camera == Some(node) {
            self.active_camera = None;
        }
        self.nodes[node.0] = None;
        Ok(())
    }

    fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().enumerate().find_map(|(i, n)| match n {
            Some(node) if node.name == name => Some(NodeId(i)),
            _ => None,
        })
    }

    fn node_name(&self, node: NodeId) -> Option<String> {
        self.get(node).map(|n| n.name.clone())
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(child) if child.parent == Some(node) => Some(NodeId(i)),
                _ => None,
            })
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> RigResult<()> {
        if let Some(p) = parent {
            if self.get(p).is_none() {
                return Err(RigError::not_found(Resource::Node, format!("#{}", p.0)));
            }
            let mut ancestor = Some(p);
            while let Some(a) = ancestor {
                if a == child {
                    return Err(RigError::invalid_argument("parenting would create a cycle"));
                }
                ancestor = self.parent(a);
            }
        }
        self.get_mut(child)?.parent = parent;
        Ok(())
    }

    fn set_location(&mut self, node: NodeId, location: Vec3) -> RigResult<()> {
        self.get_mut(node)?.location = location;
        Ok(())
    }

    fn location(&self, node: NodeId) -> Option<Vec3> {
        self.get(node).map(|n| n.location)
    }

    fn set_rotation(&mut self, node: NodeId, rotation: Euler) -> RigResult<()> {
        self.get_mut(node)?.rotation = rotation;
        Ok(())
    }

    fn rotation(&self, node: NodeId) -> Option<Euler> {
        self.get(node).map(|n| n.rotation)
    }

    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> RigResult<()> {
        self.get_mut(node)?.scale = scale;
        Ok(())
    }

    fn set_visibility(&mut self, node: NodeId, visibility: Visibility) -> RigResult<()> {
        self.get_mut(node)?.visibility = visibility;
        Ok(())
    }

    fn visibility(&self, node: NodeId) -> Option<Visibility> {
        self.get(node).map(|n| n.visibility)
    }

    fn set_active_camera(&mut self, camera: NodeId) -> RigResult<()> {
        match self.get(camera) {
            Some(Node {
                data: NodeData::Camera { .. },
                ..
            }) => {
                self.active_camera = Some(camera);
                Ok(())
            }
            Some(node) => Err(RigError::invalid_argument(format!(
                "node '{}' is not a camera",
                node.name
            ))),
            None => Err(RigError::not_found(Resource::Node, format!("#{}", camera.0))),
        }
    }

    fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    fn has_world(&self) -> bool {
        self.has_world
    }

    fn apply_render_settings(&mut self, settings: &RenderSettings) -> RigResult<()> {
        if !self.has_world {
            return Err(RigError::precondition(
                "default world background node is missing; cannot set ambient color",
            ));
        }
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn file_extension(&self) -> String {
        self.file_extension.clone()
    }

    fn collections(&self) -> Vec<String> {
        self.collections.iter().map(|(n, _)| n.clone()).collect()
    }

    fn set_collection_visibility(&mut self, name: &str, visibility: Visibility) -> RigResult<()> {
        let entry = self
            .collections
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| RigError::not_found(Resource::Collection, name))?;
        entry.1 = visibility;
        Ok(())
    }

    fn collection_visibility(&self, name: &str) -> Option<Visibility> {
        self.collections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    fn bind_action(&mut self, armature: NodeId, action: &str) -> RigResult<()> {
        if !self.actions.contains(action) {
            return Err(RigError::not_found(Resource::Action, action));
        }
        self.get_mut(armature)?.action = Some(action.to_string());
        Ok(())
    }

    fn active_action(&self, armature: NodeId) -> Option<String> {
        self.get(armature).and_then(|n| n.action.clone())
    }

    fn set_frame(&mut self, frame: u32) -> RigResult<()> {
        self.frame = frame;
        Ok(())
    }

    fn current_frame(&self) -> u32 {
        self.frame
    }

    fn update(&mut self) -> RigResult<()> {
        self.update_count += 1;
        Ok(())
    }
}

impl Renderer for MemoryScene {
    fn render_current_frame(&mut self, output: &Path) -> RigResult<()> {
        if let Some(remaining) = self.failures.get_mut(output) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RigError::collaborator_failure(output, "injected render failure"));
            }
        }
        let camera_yaw = self
            .active_camera
            .and_then(|camera| world_yaw_degrees(&*self, camera));
        let visible_collections = self
            .collections
            .iter()
            .filter(|(_, v)| v.render)
            .map(|(n, _)| n.clone())
            .collect();
        self.renders.push(RenderRecord {
            path: output.to_path_buf(),
            frame: self.frame,
            camera_yaw,
            visible_collections,
        });
        Ok(())
    }
}

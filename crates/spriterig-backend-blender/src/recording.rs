//! Scene wrapper that records every mutation as a replayable command.
//!
//! Running the rig builder or the batch driver against a
//! [`RecordingScene`] produces a [`ScenePlan`]: the exact sequence of host
//! operations, addressed by node name, that the Blender entrypoint replays.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spriterig_spec::{RenderSettings, Vec3};

use crate::driver::{OnFailure, RenderPolicy};
use crate::error::{Resource, RigError, RigResult};
use crate::scene::{NodeData, NodeId, Renderer, Scene, Visibility};
use crate::units::Euler;

/// Current plan format version.
pub const PLAN_VERSION: u32 = 1;

/// One host operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SceneCommand {
    AddNode {
        name: String,
        data: NodeData,
    },
    RemoveNode {
        name: String,
    },
    SetParent {
        child: String,
        parent: Option<String>,
    },
    SetLocation {
        name: String,
        location: Vec3,
    },
    /// Rotation in radians.
    SetRotation {
        name: String,
        rotation: Euler,
    },
    SetScale {
        name: String,
        scale: Vec3,
    },
    SetVisibility {
        name: String,
        render: bool,
        viewport: bool,
    },
    SetActiveCamera {
        name: String,
    },
    ApplyRenderSettings {
        settings: RenderSettings,
    },
    SetCollectionVisibility {
        name: String,
        render: bool,
        viewport: bool,
    },
    BindAction {
        armature: String,
        action: String,
    },
    SetFrame {
        frame: u32,
    },
    Update,
    Render {
        path: PathBuf,
    },
}

/// A recorded command sequence plus replay options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePlan {
    pub plan_version: u32,
    /// Root directory render paths are under.
    pub output_root: String,
    /// What the host does when a render fails.
    pub on_failure: OnFailure,
    /// Extra attempts per failed render.
    pub retries: u32,
    /// Save the `.blend` after replay.
    #[serde(default)]
    pub save_blend: bool,
    pub commands: Vec<SceneCommand>,
}

impl ScenePlan {
    /// Sets whether the host saves the `.blend` after replay.
    pub fn save_blend(mut self, save: bool) -> Self {
        self.save_blend = save;
        self
    }

    /// Number of render commands.
    pub fn render_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::Render { .. }))
            .count()
    }

    /// Render output paths in order.
    pub fn render_paths(&self) -> Vec<&Path> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::Render { path } => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Serializes the plan as pretty JSON.
    pub fn to_json_pretty(&self) -> RigResult<String> {
        serde_json::to_string_pretty(self).map_err(RigError::SerializeFailed)
    }
}

/// Delegates to an inner scene and records each successful mutation.
///
/// Render requests are recorded but not forwarded; they are carried out when
/// the plan is replayed.
#[derive(Debug, Clone)]
pub struct RecordingScene<S> {
    inner: S,
    commands: Vec<SceneCommand>,
}

impl<S: Scene> RecordingScene<S> {
    /// Wraps a scene.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            commands: Vec::new(),
        }
    }

    /// The wrapped scene.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[SceneCommand] {
        &self.commands
    }

    /// Finishes recording.
    pub fn into_plan(self, output_root: impl Into<String>, policy: &RenderPolicy) -> ScenePlan {
        ScenePlan {
            plan_version: PLAN_VERSION,
            output_root: output_root.into(),
            on_failure: policy.on_failure,
            retries: policy.retries,
            save_blend: false,
            commands: self.commands,
        }
    }

    /// Returns the wrapped scene, discarding the recording.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn name_of(&self, node: NodeId) -> RigResult<String> {
        self.inner
            .node_name(node)
            .ok_or_else(|| RigError::not_found(Resource::Node, format!("#{}", node.0)))
    }
}

impl<S: Scene> Scene for RecordingScene<S> {
    fn add_node(&mut self, name: &str, data: NodeData) -> RigResult<NodeId> {
        let id = self.inner.add_node(name, data.clone())?;
        self.commands.push(SceneCommand::AddNode {
            name: name.to_string(),
            data,
        });
        Ok(id)
    }

    fn remove_node(&mut self, node: NodeId) -> RigResult<()> {
        let name = self.name_of(node)?;
        self.inner.remove_node(node)?;
        self.commands.push(SceneCommand::RemoveNode { name });
        Ok(())
    }

    fn find_node(&self, name: &str) -> Option<NodeId> {
        self.inner.find_node(name)
    }

    fn node_name(&self, node: NodeId) -> Option<String> {
        self.inner.node_name(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.children(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.parent(node)
    }

    fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> RigResult<()> {
        let child_name = self.name_of(child)?;
        let parent_name = parent.map(|p| self.name_of(p)).transpose()?;
        self.inner.set_parent(child, parent)?;
        self.commands.push(SceneCommand::SetParent {
            child: child_name,
            parent: parent_name,
        });
        Ok(())
    }

    fn set_location(&mut self, node: NodeId, location: Vec3) -> RigResult<()> {
        let name = self.name_of(node)?;
        self.inner.set_location(node, location)?;
        self.commands.push(SceneCommand::SetLocation { name, location });
        Ok(())
    }

    fn location(&self, node: NodeId) -> Option<Vec3> {
        self.inner.location(node)
    }

    fn set_rotation(&mut self, node: NodeId, rotation: Euler) -> RigResult<()> {
        let name = self.name_of(node)?;
        self.inner.set_rotation(node, rotation)?;
        self.commands.push(SceneCommand::SetRotation { name, rotation });
        Ok(())
    }

    fn rotation(&self, node: NodeId) -> Option<Euler> {
        self.inner.rotation(node)
    }

    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> RigResult<()> {
        let name = self.name_of(node)?;
        self.inner.set_scale(node, scale)?;
        self.commands.push(SceneCommand::SetScale { name, scale });
        Ok(())
    }

    fn set_visibility(&mut self, node: NodeId, visibility: Visibility) -> RigResult<()> {
        let name = self.name_of(node)?;
        self.inner.set_visibility(node, visibility)?;
        self.commands.push(SceneCommand::SetVisibility {
            name,
            render: visibility.render,
            viewport: visibility.viewport,
        });
        Ok(())
    }

    fn visibility(&self, node: NodeId) -> Option<Visibility> {
        self.inner.visibility(node)
    }

    fn set_active_camera(&mut self, camera: NodeId) -> RigResult<()> {
        let name = self.name_of(camera)?;
        self.inner.set_active_camera(camera)?;
        self.commands.push(SceneCommand::SetActiveCamera { name });
        Ok(())
    }

    fn active_camera(&self) -> Option<NodeId> {
        self.inner.active_camera()
    }

    fn has_world(&self) -> bool {
        self.inner.has_world()
    }

    fn apply_render_settings(&mut self, settings: &RenderSettings) -> RigResult<()> {
        self.inner.apply_render_settings(settings)?;
        self.commands.push(SceneCommand::ApplyRenderSettings {
            settings: settings.clone(),
        });
        Ok(())
    }

    fn file_extension(&self) -> String {
        self.inner.file_extension()
    }

    fn collections(&self) -> Vec<String> {
        self.inner.collections()
    }

    fn set_collection_visibility(&mut self, name: &str, visibility: Visibility) -> RigResult<()> {
        self.inner.set_collection_visibility(name, visibility)?;
        self.commands.push(SceneCommand::SetCollectionVisibility {
            name: name.to_string(),
            render: visibility.render,
            viewport: visibility.viewport,
        });
        Ok(())
    }

    fn collection_visibility(&self, name: &str) -> Option<Visibility> {
        self.inner.collection_visibility(name)
    }

    fn bind_action(&mut self, armature: NodeId, action: &str) -> RigResult<()> {
        let name = self.name_of(armature)?;
        self.inner.bind_action(armature, action)?;
        self.commands.push(SceneCommand::BindAction {
            armature: name,
            action: action.to_string(),
        });
        Ok(())
    }

    fn active_action(&self, armature: NodeId) -> Option<String> {
        self.inner.active_action(armature)
    }

    fn set_frame(&mut self, frame: u32) -> RigResult<()> {
        self.inner.set_frame(frame)?;
        self.commands.push(SceneCommand::SetFrame { frame });
        Ok(())
    }

    fn current_frame(&self) -> u32 {
        self.inner.current_frame()
    }

    fn update(&mut self) -> RigResult<()> {
        self.inner.update()?;
        self.commands.push(SceneCommand::Update);
        Ok(())
    }
}

impl<S: Scene> Renderer for RecordingScene<S> {
    fn render_current_frame(&mut self, output: &Path) -> RigResult<()> {
        self.commands.push(SceneCommand::Render {
            path: output.to_path_buf(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScene;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_by_name() {
        let mut scene = RecordingScene::new(MemoryScene::new());
        let pivot = scene.add_node("ROTATEBOX", NodeData::Mesh).unwrap();
        scene.set_rotation(pivot, Euler::yaw(90.0)).unwrap();
        scene.set_frame(3).unwrap();
        scene.update().unwrap();

        assert_eq!(scene.commands().len(), 4);
        assert_eq!(
            scene.commands()[0],
            SceneCommand::AddNode {
                name: "ROTATEBOX".to_string(),
                data: NodeData::Mesh,
            }
        );
        assert_eq!(scene.commands()[2], SceneCommand::SetFrame { frame: 3 });
    }

    #[test]
    fn test_failed_mutations_not_recorded() {
        let mut scene = RecordingScene::new(MemoryScene::new().with_armature("armature_a").unwrap());
        let armature = scene.find_node("armature_a").unwrap();
        assert!(scene.bind_action(armature, "missing").is_err());
        assert!(scene.commands().is_empty());
    }

    #[test]
    fn test_plan_json_shape() {
        let mut scene = RecordingScene::new(MemoryScene::new());
        scene
            .render_current_frame(Path::new("renders/a/walk/00_0000.png"))
            .unwrap();
        let plan = scene
            .into_plan("renders", &RenderPolicy::default())
            .save_blend(true);
        assert_eq!(plan.render_count(), 1);

        let value: serde_json::Value =
            serde_json::from_str(&plan.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["plan_version"], 1);
        assert_eq!(value["on_failure"], "abort");
        assert_eq!(value["save_blend"], true);
        assert_eq!(value["commands"][0]["op"], "render");
        assert_eq!(value["commands"][0]["path"], "renders/a/walk/00_0000.png");
    }

    #[test]
    fn test_rotation_serialized_in_radians() {
        let cmd = SceneCommand::SetRotation {
            name: "ROTATEBOX".to_string(),
            rotation: Euler::yaw(180.0),
        };
        let value = serde_json::to_value(&cmd).unwrap();
        let z = value["rotation"][2].as_f64().unwrap();
        assert!((z - std::f64::consts::PI).abs() < 1e-9);
    }
}

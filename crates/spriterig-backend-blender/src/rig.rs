//! Directional rig construction and pivot orientation.
//!
//! The rig is a pivot empty with an orthographic camera and a sun light
//! parented to it. Rotating the pivot about Z reorients camera and light
//! rigidly around a stationary character.

use spriterig_spec::{generate_directions, CompassDirection, RenderSettings, RigParams};
use tracing::{debug, info};

use crate::error::{RigError, RigResult};
use crate::scene::{
    remove_subtree, EmptyDisplay, LightKind, NodeData, NodeId, Projection, Scene, Visibility,
};
use crate::units::Euler;

/// Display size of the pivot and reference root empties.
const EMPTY_DISPLAY_SIZE: f64 = 0.5;

/// What to do when rig nodes already exist in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingRig {
    /// Fail with `PreconditionViolation`.
    #[default]
    Reject,
    /// Remove the existing rig nodes and their children, then rebuild.
    Replace,
}

/// Handles to the non-rendering reference boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGeometry {
    pub root: NodeId,
    pub parts: Vec<NodeId>,
}

/// Handles to the nodes of a built rig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigDescriptor {
    pub pivot: NodeId,
    pub camera: NodeId,
    pub light: NodeId,
    pub reference: Option<ReferenceGeometry>,
}

/// Builds the directional rig into a scene.
#[derive(Debug, Clone)]
pub struct RigBuilder {
    params: RigParams,
    settings: RenderSettings,
    reference_geometry: bool,
    on_existing: ExistingRig,
}

impl Default for RigBuilder {
    fn default() -> Self {
        Self::new(RigParams::default())
    }
}

impl RigBuilder {
    /// Creates a builder with default render settings and reference geometry on.
    pub fn new(params: RigParams) -> Self {
        Self {
            params,
            settings: RenderSettings::default(),
            reference_geometry: true,
            on_existing: ExistingRig::default(),
        }
    }

    /// Sets the render settings applied after the rig is built.
    pub fn render_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Enables or disables the reference geometry.
    pub fn reference_geometry(mut self, enabled: bool) -> Self {
        self.reference_geometry = enabled;
        self
    }

    /// Sets the policy for rig nodes that already exist.
    pub fn on_existing(mut self, policy: ExistingRig) -> Self {
        self.on_existing = policy;
        self
    }

    /// Returns the rig parameters.
    pub fn params(&self) -> &RigParams {
        &self.params
    }

    /// Builds the rig.
    ///
    /// The world background is checked before anything is created, so a
    /// failed precondition leaves the scene untouched.
    pub fn build<S: Scene + ?Sized>(&self, scene: &mut S) -> RigResult<RigDescriptor> {
        if !scene.has_world() {
            return Err(RigError::precondition(
                "default world background node is missing; cannot set ambient color",
            ));
        }
        self.clear_existing(scene)?;

        let p = &self.params;

        let pivot = scene.add_node(
            &p.pivot_name,
            NodeData::Empty {
                display: EmptyDisplay::PlainAxes,
                size: EMPTY_DISPLAY_SIZE,
            },
        )?;

        let camera = scene.add_node(
            &p.camera_name,
            NodeData::Camera {
                projection: Projection::Orthographic {
                    scale: p.ortho_scale,
                },
            },
        )?;
        scene.set_parent(camera, Some(pivot))?;
        scene.set_location(camera, p.camera_location)?;
        scene.set_rotation(camera, Euler::from_degrees(p.camera_rotation))?;
        scene.set_active_camera(camera)?;

        let light = scene.add_node(
            &p.light_name,
            NodeData::Light {
                light: LightKind::Sun,
            },
        )?;
        scene.set_parent(light, Some(pivot))?;
        scene.set_location(light, p.light_location)?;
        scene.set_rotation(light, Euler::from_degrees(p.light_rotation))?;

        set_pivot_yaw(scene, pivot, p.initial_yaw)?;

        let reference = if self.reference_geometry {
            Some(self.build_reference(scene)?)
        } else {
            None
        };

        scene.apply_render_settings(&self.settings)?;

        info!(
            pivot = %p.pivot_name,
            reference = reference.is_some(),
            "Rig built"
        );

        Ok(RigDescriptor {
            pivot,
            camera,
            light,
            reference,
        })
    }

    fn rig_node_names(&self) -> [&str; 4] {
        [
            self.params.pivot_name.as_str(),
            self.params.camera_name.as_str(),
            self.params.light_name.as_str(),
            self.params.reference_root_name.as_str(),
        ]
    }

    fn clear_existing<S: Scene + ?Sized>(&self, scene: &mut S) -> RigResult<()> {
        let mut names: Vec<&str> = self.rig_node_names().to_vec();
        if self.reference_geometry {
            names.extend(self.params.reference_parts.iter().map(|part| part.name.as_str()));
        }

        for name in names {
            let Some(node) = scene.find_node(name) else {
                continue;
            };
            match self.on_existing {
                ExistingRig::Reject => {
                    return Err(RigError::precondition(format!(
                        "rig node '{}' already exists",
                        name
                    )));
                }
                ExistingRig::Replace => {
                    debug!(node = name, "Removing existing rig node");
                    remove_subtree(scene, node)?;
                }
            }
        }
        Ok(())
    }

    fn build_reference<S: Scene + ?Sized>(&self, scene: &mut S) -> RigResult<ReferenceGeometry> {
        let root = scene.add_node(
            &self.params.reference_root_name,
            NodeData::Empty {
                display: EmptyDisplay::Arrows,
                size: EMPTY_DISPLAY_SIZE,
            },
        )?;
        scene.set_visibility(root, Visibility::VIEWPORT_ONLY)?;

        let mut parts = Vec::with_capacity(self.params.reference_parts.len());
        for part in &self.params.reference_parts {
            let node = scene.add_node(
                &part.name,
                NodeData::Cube {
                    size: 1.0,
                    wireframe: true,
                },
            )?;
            scene.set_parent(node, Some(root))?;
            scene.set_location(node, part.location)?;
            scene.set_scale(node, part.scale)?;
            scene.set_visibility(node, Visibility::VIEWPORT_ONLY)?;
            parts.push(node);
        }

        Ok(ReferenceGeometry { root, parts })
    }
}

/// Builds the default rig with reference geometry.
pub fn build_rig<S: Scene + ?Sized>(scene: &mut S) -> RigResult<RigDescriptor> {
    RigBuilder::default().build(scene)
}

/// Sets the pivot's yaw, leaving the other axes at zero.
pub fn set_pivot_yaw<S: Scene + ?Sized>(scene: &mut S, pivot: NodeId, degrees: f64) -> RigResult<()> {
    scene.set_rotation(pivot, Euler::yaw(degrees))
}

/// Looks up the pivot by name.
pub fn find_pivot<S: Scene + ?Sized>(scene: &S, pivot_name: &str) -> RigResult<NodeId> {
    scene.find_node(pivot_name).ok_or_else(|| {
        RigError::precondition(format!(
            "pivot '{}' not found; build the rig first",
            pivot_name
        ))
    })
}

/// Points the rig at one of the eight compass directions.
///
/// Returns the yaw applied, in degrees.
pub fn select_direction<S: Scene + ?Sized>(
    scene: &mut S,
    pivot_name: &str,
    direction: CompassDirection,
) -> RigResult<f64> {
    let pivot = find_pivot(&*scene, pivot_name)?;
    let directions = generate_directions(CompassDirection::all().len() as i64)?;
    let angle = directions
        .angle(direction.index())
        .ok_or_else(|| RigError::invalid_argument(format!("direction {} out of range", direction)))?;
    set_pivot_yaw(scene, pivot, angle)?;
    scene.update()?;
    Ok(angle)
}

/// Returns true if any node of the named rig exists.
pub fn rig_exists<S: Scene + ?Sized>(scene: &S, params: &RigParams) -> bool {
    scene.find_node(&params.pivot_name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScene;
    use crate::scene::world_yaw_degrees;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_build_rig_layout() {
        let mut scene = MemoryScene::new();
        let rig = build_rig(&mut scene).unwrap();

        assert_eq!(scene.parent(rig.camera), Some(rig.pivot));
        assert_eq!(scene.parent(rig.light), Some(rig.pivot));
        assert_eq!(scene.active_camera(), Some(rig.camera));
        assert_eq!(scene.location(rig.pivot), Some([0.0, 0.0, 0.0]));
        assert_eq!(scene.location(rig.camera), Some([0.0, -10.0, 8.5]));
        assert_eq!(scene.location(rig.light), Some([8.05, -11.788, 24.0]));
        assert_eq!(
            scene.node_data(rig.camera),
            Some(&NodeData::Camera {
                projection: Projection::Orthographic { scale: 7.0 }
            })
        );
        assert_eq!(
            scene.node_data(rig.light),
            Some(&NodeData::Light {
                light: LightKind::Sun
            })
        );

        let cam = scene.rotation(rig.camera).unwrap().degrees();
        assert!(approx(cam[0], 60.0));
        let light = scene.rotation(rig.light).unwrap().degrees();
        assert!(approx(light[1], 30.7));
        assert!(approx(light[2], -55.7));

        let yaw = scene.rotation(rig.pivot).unwrap().yaw_degrees();
        assert!(approx(yaw, 45.0));
        assert_eq!(scene.render_settings(), Some(&RenderSettings::default()));
    }

    #[test]
    fn test_reference_geometry_is_viewport_only() {
        let mut scene = MemoryScene::new();
        let rig = build_rig(&mut scene).unwrap();
        let reference = rig.reference.unwrap();

        assert_eq!(reference.parts.len(), 4);
        assert_eq!(scene.visibility(reference.root), Some(Visibility::VIEWPORT_ONLY));
        for part in &reference.parts {
            assert_eq!(scene.parent(*part), Some(reference.root));
            assert_eq!(scene.visibility(*part), Some(Visibility::VIEWPORT_ONLY));
        }
        let head = scene.find_node("Human_Head").unwrap();
        assert_eq!(scene.location(head), Some([0.0, 0.0, 1.7]));
        assert_eq!(scene.scale(head), Some([0.2, 0.25, 0.25]));
    }

    #[test]
    fn test_without_reference_geometry() {
        let mut scene = MemoryScene::new();
        let rig = RigBuilder::default()
            .reference_geometry(false)
            .build(&mut scene)
            .unwrap();
        assert!(rig.reference.is_none());
        assert_eq!(scene.find_node("_Approximate_Scale_"), None);
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn test_missing_world_is_fatal() {
        let mut scene = MemoryScene::new().with_world(false);
        let err = build_rig(&mut scene).unwrap_err();
        assert!(matches!(err, RigError::PreconditionViolation { .. }));
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_rebuild_rejected_by_default() {
        let mut scene = MemoryScene::new();
        build_rig(&mut scene).unwrap();
        let before = scene.node_count();

        let err = build_rig(&mut scene).unwrap_err();
        assert!(matches!(err, RigError::PreconditionViolation { .. }));
        assert_eq!(scene.node_count(), before);
    }

    #[test]
    fn test_rebuild_replace() {
        let mut scene = MemoryScene::new();
        build_rig(&mut scene).unwrap();
        let before = scene.node_count();

        let rig = RigBuilder::default()
            .on_existing(ExistingRig::Replace)
            .build(&mut scene)
            .unwrap();
        assert_eq!(scene.node_count(), before);
        assert_eq!(scene.find_node("ROTATEBOX"), Some(rig.pivot));
        assert_eq!(scene.active_camera(), Some(rig.camera));
    }

    #[test]
    fn test_select_direction() {
        let mut scene = MemoryScene::new();
        let rig = build_rig(&mut scene).unwrap();

        let angle = select_direction(&mut scene, "ROTATEBOX", CompassDirection::NW).unwrap();
        assert!(approx(angle, 135.0));
        assert!(approx(world_yaw_degrees(&scene, rig.pivot).unwrap(), 135.0));
        assert!(approx(world_yaw_degrees(&scene, rig.camera).unwrap(), 135.0));
    }

    #[test]
    fn test_select_direction_without_rig() {
        let mut scene = MemoryScene::new();
        let err = select_direction(&mut scene, "ROTATEBOX", CompassDirection::S).unwrap_err();
        assert!(matches!(err, RigError::PreconditionViolation { .. }));
    }

    #[test]
    fn test_rig_exists() {
        let mut scene = MemoryScene::new();
        assert!(!rig_exists(&scene, &RigParams::default()));
        build_rig(&mut scene).unwrap();
        assert!(rig_exists(&scene, &RigParams::default()));
    }
}

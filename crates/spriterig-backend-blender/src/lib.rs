//! spriterig Blender Backend
//!
//! This crate builds the directional render rig and drives the batch render
//! loop against an abstract scene host, with Blender as the production host.
//!
//! # Architecture
//!
//! The engine never talks to Blender directly. It works on an explicit scene
//! context implementing [`Scene`] and [`Renderer`]:
//!
//! 1. **Inventory** - The orchestrator runs Blender on the `.blend` and reads
//!    back its objects, collections, and actions.
//! 2. **Record** - [`MemoryScene::from_inventory`] seeds an in-memory scene,
//!    wrapped in a [`RecordingScene`]. Building the rig and running the batch
//!    driver against it produces a [`ScenePlan`].
//! 3. **Replay** - The orchestrator runs Blender again with the plan; the
//!    Python entrypoint executes it command by command and renders.
//!
//! Tests and dry runs use [`MemoryScene`] directly.
//!
//! # Example
//!
//! ```
//! use spriterig_backend_blender::{build_rig, run_batch_render, BatchOptions, MemoryScene};
//! use spriterig_spec::{AnimationSpec, Catalog, CharacterEntry};
//!
//! let catalog = Catalog::new().character(
//!     CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 3)),
//! );
//! let mut scene = MemoryScene::from_catalog(&catalog).unwrap();
//! build_rig(&mut scene).unwrap();
//!
//! let options = BatchOptions::default().direction_count(2);
//! let report = run_batch_render(&mut scene, &catalog, &options).unwrap();
//! assert_eq!(report.rendered, 6);
//! ```
//!
//! # Blender Requirements
//!
//! The orchestrator searches for Blender in:
//!
//! 1. The configured path
//! 2. `BLENDER_PATH` environment variable
//! 3. System PATH
//! 4. Common installation locations (platform-specific)
//!
//! Recommended Blender version: 4.2 LTS or newer.
//!
//! # Crate Structure
//!
//! - [`scene`] - Host collaborator traits
//! - [`units`] - Degree/radian conversion
//! - [`memory`] - In-memory scene host
//! - [`recording`] - Command-recording scene and plans
//! - [`rig`] - Rig builder and direction selection
//! - [`catalog`] - Armature lookup and character isolation
//! - [`driver`] - Batch render state machine
//! - [`inventory`] - `.blend` inventory reports
//! - [`plan`] - Recording a run against an inventory
//! - [`orchestrator`] - Blender subprocess management
//! - [`error`] - Error types

pub mod catalog;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod memory;
pub mod orchestrator;
pub mod plan;
pub mod recording;
pub mod rig;
pub mod scene;
pub mod units;

pub use catalog::{activate_character_visibility, resolve_armature};
pub use driver::{
    run_batch_render, BatchEvent, BatchObserver, BatchOptions, BatchRenderDriver, BatchReport,
    DriverState, JobFailure, OnFailure, RenderPolicy, SkippedAnimation, SkippedCharacter,
};
pub use error::{Resource, RigError, RigResult};
pub use inventory::{InventoryObject, SceneInventory};
pub use memory::{MemoryScene, RenderRecord};
pub use orchestrator::{
    HostMode, Orchestrator, OrchestratorConfig, ReplayFailure, ReplayReport, DEFAULT_TIMEOUT_SECS,
    ENTRYPOINT_ENV,
};
pub use plan::{record_run, RecordedRun};
pub use recording::{RecordingScene, SceneCommand, ScenePlan, PLAN_VERSION};
pub use rig::{
    build_rig, find_pivot, rig_exists, select_direction, set_pivot_yaw, ExistingRig,
    ReferenceGeometry, RigBuilder, RigDescriptor,
};
pub use scene::{
    remove_subtree, world_yaw_degrees, EmptyDisplay, LightKind, NodeData, NodeId, Projection,
    Renderer, Scene, Visibility,
};
pub use units::{deg_to_rad, rad_to_deg, Euler};

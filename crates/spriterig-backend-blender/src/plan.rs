//! Planning a Blender run from an inventory.

use spriterig_spec::Catalog;

use crate::driver::{run_batch_render, BatchOptions, BatchReport};
use crate::error::RigResult;
use crate::inventory::SceneInventory;
use crate::memory::MemoryScene;
use crate::recording::{RecordingScene, ScenePlan};
use crate::rig::{RigBuilder, RigDescriptor};

/// A recorded plan and what the driver reported while recording it.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub plan: ScenePlan,
    /// Counts as planned. Render failures only surface on replay.
    pub report: BatchReport,
    pub rig: Option<RigDescriptor>,
}

/// Runs the engine against a scene seeded from `inventory` and records the
/// resulting host commands.
///
/// With `rig` set the rig is built first, inside the same plan. With
/// `catalog` unset only the rig is recorded.
pub fn record_run(
    inventory: &SceneInventory,
    rig: Option<&RigBuilder>,
    catalog: Option<&Catalog>,
    options: &BatchOptions,
) -> RigResult<RecordedRun> {
    let mut scene = RecordingScene::new(MemoryScene::from_inventory(inventory)?);

    let rig = match rig {
        Some(builder) => Some(builder.build(&mut scene)?),
        None => None,
    };

    let report = match catalog {
        Some(catalog) => run_batch_render(&mut scene, catalog, options)?,
        None => BatchReport::default(),
    };

    let plan = scene.into_plan(options.output_root.to_string_lossy(), &options.policy);
    Ok(RecordedRun { plan, report, rig })
}

//! Select command implementation
//!
//! Points the rig at one of the eight compass directions and saves the scene.

use anyhow::{Context, Result};
use colored::Colorize;
use spriterig_backend_blender::{
    select_direction, MemoryScene, Orchestrator, RecordingScene, RenderPolicy, RigBuilder,
};
use spriterig_spec::{CompassDirection, RigParams};
use std::path::Path;
use std::process::ExitCode;

use crate::input::load_project;

/// Run the select command
///
/// # Arguments
/// * `blend` - Path to the `.blend` file holding the rig
/// * `direction` - Compass direction to face
/// * `project_path` - Optional project supplying the pivot name
/// * `dry_run` - Apply to an in-memory rig instead of launching Blender
///
/// # Returns
/// Exit code: 0 on success
pub fn run(
    blend: &str,
    direction: CompassDirection,
    project_path: Option<&str>,
    dry_run: bool,
) -> Result<ExitCode> {
    let params = match project_path {
        Some(path) => {
            load_project(Path::new(path))
                .with_context(|| format!("Failed to load project file: {}", path))?
                .project
                .rig
        }
        None => RigParams::default(),
    };
    let pivot_name = params.pivot_name.clone();

    let yaw = if dry_run {
        let mut scene = MemoryScene::new();
        RigBuilder::new(params).build(&mut scene)?;
        select_direction(&mut scene, &pivot_name, direction)?
    } else {
        let orchestrator = Orchestrator::new();
        let blend_path = Path::new(blend);
        let inventory = orchestrator
            .inventory(blend_path)
            .with_context(|| format!("Failed to read scene: {}", blend))?;

        let mut scene = RecordingScene::new(MemoryScene::from_inventory(&inventory)?);
        let yaw = select_direction(&mut scene, &pivot_name, direction)?;
        let plan = scene
            .into_plan(String::new(), &RenderPolicy::default())
            .save_blend(true);
        orchestrator
            .replay(blend_path, &plan)
            .with_context(|| format!("Failed to rotate rig in: {}", blend))?;
        yaw
    };

    println!(
        "{} {} ({}) -> {} at {}°",
        "Direction:".cyan().bold(),
        direction,
        direction.index(),
        pivot_name,
        yaw
    );
    if dry_run {
        println!("{} (dry run, nothing saved)", "SUCCESS".green().bold());
    } else {
        println!("{} saved {}", "SUCCESS".green().bold(), blend);
    }

    Ok(ExitCode::SUCCESS)
}

//! Rig command implementation
//!
//! Builds the directional rig into a `.blend` file and saves it.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use spriterig_backend_blender::{
    record_run, BatchOptions, MemoryScene, Orchestrator, RecordingScene, RenderPolicy, RigBuilder,
};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use super::reporting;
use crate::input::{load_project, rig_builder};

/// Arguments of the rig command.
#[derive(Debug, Clone, Copy)]
pub struct RigArgs<'a> {
    pub blend: &'a str,
    pub project: Option<&'a str>,
    pub reference: bool,
    pub replace: bool,
    pub plan_out: Option<&'a str>,
    pub dry_run: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RigOutput {
    ok: bool,
    blend: String,
    dry_run: bool,
    nodes: Vec<String>,
    commands: usize,
    saved: bool,
}

/// Run the rig command
///
/// # Returns
/// Exit code: 0 on success
pub fn run(args: RigArgs<'_>) -> Result<ExitCode> {
    let project = match args.project {
        Some(path) => Some(
            load_project(Path::new(path))
                .with_context(|| format!("Failed to load project file: {}", path))?
                .project,
        ),
        None => None,
    };
    let builder = rig_builder(project.as_ref(), args.reference, args.replace);

    if !args.json {
        println!("{} {}", "Building rig:".cyan().bold(), args.blend);
    }

    let (plan, saved) = if args.dry_run {
        let mut scene = RecordingScene::new(MemoryScene::new());
        builder.build(&mut scene)?;
        (
            scene.into_plan(String::new(), &RenderPolicy::default()),
            false,
        )
    } else {
        let orchestrator = Orchestrator::new();
        let blend = Path::new(args.blend);
        let inventory = orchestrator
            .inventory(blend)
            .with_context(|| format!("Failed to read scene: {}", args.blend))?;
        let recorded = record_run(&inventory, Some(&builder), None, &BatchOptions::default())?;
        let plan = recorded.plan.save_blend(true);
        let report = orchestrator
            .replay(blend, &plan)
            .with_context(|| format!("Failed to build rig in: {}", args.blend))?;
        (plan, report.saved)
    };
    info!(commands = plan.commands.len(), "Recorded rig plan");

    if let Some(path) = args.plan_out {
        reporting::write_json(&plan, Path::new(path))?;
    }

    let nodes = rig_node_names(&builder, args.reference);
    if args.json {
        let output = RigOutput {
            ok: true,
            blend: args.blend.to_string(),
            dry_run: args.dry_run,
            nodes,
            commands: plan.commands.len(),
            saved,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for name in &nodes {
            println!("  {} {}", "+".green(), name);
        }
        if args.dry_run {
            println!(
                "{} {} command(s) recorded (dry run)",
                "SUCCESS".green().bold(),
                plan.commands.len()
            );
        } else {
            println!("{} rig saved to {}", "SUCCESS".green().bold(), args.blend);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn rig_node_names(builder: &RigBuilder, reference: bool) -> Vec<String> {
    let params = builder.params();
    let mut names = vec![
        params.pivot_name.clone(),
        params.camera_name.clone(),
        params.light_name.clone(),
    ];
    if reference {
        names.push(params.reference_root_name.clone());
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dry_run_writes_plan() {
        let dir = tempfile::tempdir().unwrap();
        let plan_path = dir.path().join("rig-plan.json");
        let plan_str = plan_path.to_string_lossy().to_string();

        let code = run(RigArgs {
            blend: "scene.blend",
            project: None,
            reference: true,
            replace: false,
            plan_out: Some(&plan_str),
            dry_run: true,
            json: true,
        })
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let plan: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
        assert_eq!(plan["plan_version"], 1);
        assert_eq!(plan["commands"][0]["op"], "add_node");
        assert_eq!(plan["commands"][0]["name"], "ROTATEBOX");
    }

    #[test]
    fn test_node_names() {
        let names = rig_node_names(&RigBuilder::default(), false);
        assert_eq!(names, vec!["ROTATEBOX", "CAMERA", "LIGHT"]);
    }
}

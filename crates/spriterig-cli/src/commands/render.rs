//! Render command implementation
//!
//! Renders every (character, animation, direction, frame) job of a project.
//! A dry run drives an in-memory scene; a real run records a plan against the
//! `.blend` inventory and replays it in Blender.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use spriterig_backend_blender::{
    record_run, BatchOptions, BatchRenderDriver, BatchReport, JobFailure, MemoryScene,
    Orchestrator, RenderPolicy, ReplayReport,
};
use spriterig_spec::{normalize_extension, validate_project, SpriteProject};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::warn;

use super::reporting::{self, ConsoleProgress, JsonValidation};
use crate::input::{batch_options, blend_dir, load_project, rig_builder, LoadedProject, Overrides};

/// Arguments of the render command.
#[derive(Debug, Clone, Copy)]
pub struct RenderArgs<'a> {
    pub project: &'a str,
    pub blend: Option<&'a str>,
    pub directions: Option<i64>,
    pub out_root: Option<&'a str>,
    pub build_rig: bool,
    pub continue_on_error: bool,
    pub retries: u32,
    pub skip_existing: bool,
    pub save: bool,
    pub dry_run: bool,
    pub plan_out: Option<&'a str>,
    pub report: Option<&'a str>,
    pub verbose: bool,
    pub json: bool,
}

impl RenderArgs<'_> {
    fn policy(&self) -> RenderPolicy {
        let policy = if self.continue_on_error {
            RenderPolicy::isolate()
        } else {
            RenderPolicy::strict()
        };
        policy.with_retries(self.retries)
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            direction_count: self.directions,
            output_root: self.out_root.map(str::to_string),
            file_extension: None,
        }
    }
}

/// Run report written with `--report` and printed with `--json`.
#[derive(Debug, Serialize)]
struct RenderOutput {
    ok: bool,
    project: String,
    project_hash: String,
    dry_run: bool,
    output_root: String,
    report: BatchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay: Option<ReplayReport>,
    duration_ms: u64,
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 if every planned job was rendered or already present, 1 otherwise
pub fn run(args: RenderArgs<'_>) -> Result<ExitCode> {
    let start = Instant::now();

    let LoadedProject {
        project,
        project_hash,
        ..
    } = load_project(Path::new(args.project))
        .with_context(|| format!("Failed to load project file: {}", args.project))?;

    let validation = validate_project(&project);
    if !validation.is_ok() {
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&JsonValidation::from(&validation))?
            );
        } else {
            println!("{} {}", "Invalid project:".red().bold(), args.project);
            reporting::print_validation(&validation);
        }
        return Ok(ExitCode::from(1));
    }

    if !args.json {
        println!("{} {}", "Rendering:".cyan().bold(), args.project);
        println!("{} {}", "Project hash:".dimmed(), &project_hash[..16]);
    }

    let (options, report, replay) = if args.dry_run {
        let options = batch_options(
            &project,
            &args.overrides(),
            args.policy(),
            args.skip_existing,
            None,
        );
        let report = render_in_memory(&project, &options, &args)?;
        (options, report, None)
    } else {
        let (options, report, replay) = render_in_blender(&project, &args)?;
        (options, report, Some(replay))
    };

    let ok = report.is_complete();
    let output = RenderOutput {
        ok,
        project: args.project.to_string(),
        project_hash,
        dry_run: args.dry_run,
        output_root: options.output_root.to_string_lossy().to_string(),
        report,
        replay,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    if let Some(path) = args.report {
        reporting::write_json(&output, Path::new(path))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let label = if args.dry_run { "Simulated:" } else { "Rendered:" };
        reporting::print_batch_report(&output.report, label);
        println!();
        if ok {
            println!(
                "{} {} -> {}",
                "SUCCESS".green().bold(),
                output.report.planned,
                output.output_root
            );
        } else {
            println!(
                "{} {} of {} job(s) done",
                "INCOMPLETE".yellow().bold(),
                output.report.rendered + output.report.skipped_existing,
                output.report.planned
            );
        }
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

/// Drives the render loop against an in-memory scene holding every
/// character the project refers to.
fn render_in_memory(
    project: &SpriteProject,
    options: &BatchOptions,
    args: &RenderArgs<'_>,
) -> Result<BatchReport> {
    let catalog = project.catalog();
    let mut scene = MemoryScene::from_catalog(&catalog)?;
    rig_builder(Some(project), true, false).build(&mut scene)?;

    let mut progress = ConsoleProgress {
        verbose: args.verbose,
    };
    let report = if args.json {
        BatchRenderDriver::new().run(&mut scene, &catalog, options)?
    } else {
        BatchRenderDriver::new()
            .with_observer(&mut progress)
            .run(&mut scene, &catalog, options)?
    };
    Ok(report)
}

/// Records the run against the `.blend` inventory and replays it in Blender.
fn render_in_blender(
    project: &SpriteProject,
    args: &RenderArgs<'_>,
) -> Result<(BatchOptions, BatchReport, ReplayReport)> {
    let blend_arg = args
        .blend
        .context("--blend is required unless --dry-run is given")?;
    let blend = Path::new(blend_arg);
    let base_dir = blend_dir(blend)?;
    let options = batch_options(
        project,
        &args.overrides(),
        args.policy(),
        args.skip_existing,
        Some(&base_dir),
    );

    let orchestrator = Orchestrator::new();
    let inventory = orchestrator
        .inventory(blend)
        .with_context(|| format!("Failed to read scene: {}", blend_arg))?;

    let extension = normalize_extension(&project.file_extension);
    if normalize_extension(&inventory.file_extension) != extension {
        warn!(
            scene = %inventory.file_extension,
            project = %extension,
            "Scene output format differs from the project extension"
        );
        if !args.json {
            println!(
                "  {} scene writes {} files; paths use .{}",
                "!".yellow(),
                inventory.file_extension,
                extension
            );
        }
    }

    let builder = rig_builder(Some(project), true, false);
    let recorded = record_run(
        &inventory,
        args.build_rig.then_some(&builder),
        Some(&project.catalog()),
        &options,
    )
    .context("Failed to plan render")?;

    let plan = recorded.plan.save_blend(args.save);
    if let Some(path) = args.plan_out {
        reporting::write_json(&plan, Path::new(path))?;
    }
    if !args.json {
        println!(
            "{} {} frame(s) in {}",
            "Replaying:".cyan().bold(),
            plan.render_count(),
            blend_arg
        );
    }

    let replay = orchestrator
        .replay(blend, &plan)
        .with_context(|| format!("Render failed in: {}", blend_arg))?;

    let report = merge_replay(recorded.report, &replay, options.policy.retries);
    Ok((options, report, replay))
}

/// Replaces the recorded render count with what Blender actually wrote.
fn merge_replay(mut report: BatchReport, replay: &ReplayReport, retries: u32) -> BatchReport {
    report.rendered = replay.rendered;
    report.failures = replay
        .failed
        .iter()
        .map(|failure| JobFailure {
            path: failure.path.clone(),
            message: failure.message.clone(),
            attempts: retries + 1,
        })
        .collect();
    if let Some(ms) = replay.duration_ms {
        report.duration_ms += ms;
    }
    report
}

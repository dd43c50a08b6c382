//! Plan command implementation
//!
//! Lists the render jobs of a project in render order.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use spriterig_spec::{plan_jobs, total_job_count, validate_project};
use std::path::Path;
use std::process::ExitCode;

use super::reporting;
use crate::input::load_project;

#[derive(Debug, Serialize)]
struct PlannedJob {
    character: String,
    export_name: String,
    action: String,
    direction: usize,
    angle: f64,
    frame: u32,
    path: String,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    project_hash: String,
    direction_count: i64,
    total: u64,
    jobs: Vec<PlannedJob>,
    truncated: bool,
}

/// Run the plan command
///
/// # Arguments
/// * `project_path` - Path to the project file
/// * `directions` - Direction count override
/// * `ext` - File extension override
/// * `limit` - Maximum number of jobs to list
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if the project is invalid
pub fn run(
    project_path: &str,
    directions: Option<i64>,
    ext: Option<&str>,
    limit: Option<usize>,
    json_output: bool,
) -> Result<ExitCode> {
    let loaded = load_project(Path::new(project_path))
        .with_context(|| format!("Failed to load project file: {}", project_path))?;
    let project = &loaded.project;

    let validation = validate_project(project);
    if !validation.is_ok() {
        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&reporting::JsonValidation::from(&validation))?
            );
        } else {
            println!("{} {}", "Invalid project:".red().bold(), project_path);
            reporting::print_validation(&validation);
        }
        return Ok(ExitCode::from(1));
    }

    let direction_count = directions.unwrap_or(project.direction_count as i64);
    let extension = ext.unwrap_or(&project.file_extension);
    let catalog = project.catalog();
    let jobs = plan_jobs(&catalog, direction_count)?;
    let total = total_job_count(&catalog, direction_count as usize);
    let shown = limit.unwrap_or(jobs.len()).min(jobs.len());

    if json_output {
        let output = PlanOutput {
            project_hash: loaded.project_hash.clone(),
            direction_count,
            total,
            jobs: jobs[..shown]
                .iter()
                .map(|job| PlannedJob {
                    character: job.character.clone(),
                    export_name: job.export_name.clone(),
                    action: job.action.clone(),
                    direction: job.direction,
                    angle: job.angle,
                    frame: job.frame,
                    path: job.output_path(extension),
                })
                .collect(),
            truncated: shown < jobs.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Plan:".cyan().bold(), project_path);
    println!(
        "{} {} direction(s), {} job(s)",
        "Total:".dimmed(),
        direction_count,
        total
    );
    for job in &jobs[..shown] {
        println!(
            "  {:>8.3}°  frame {:>4}  {}",
            job.angle,
            job.frame,
            job.output_path(extension)
        );
    }
    if shown < jobs.len() {
        println!("  {} {} more", "...".dimmed(), jobs.len() - shown);
    }

    Ok(ExitCode::SUCCESS)
}

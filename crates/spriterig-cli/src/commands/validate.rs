//! Validate command implementation
//!
//! Validates a project file without touching Blender.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use spriterig_spec::{total_job_count, validate_project};
use std::path::Path;
use std::process::ExitCode;

use super::reporting::{self, JsonValidation};
use crate::input::{load_project, LoadedProject};

#[derive(Debug, Serialize)]
struct ValidateOutput {
    project: String,
    source_hash: String,
    project_hash: String,
    #[serde(flatten)]
    validation: JsonValidation,
    /// Total jobs when the project is valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    job_count: Option<u64>,
}

/// Run the validate command
///
/// # Arguments
/// * `project_path` - Path to the project file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(project_path: &str, json_output: bool) -> Result<ExitCode> {
    let LoadedProject {
        project,
        source_hash,
        project_hash,
    } = load_project(Path::new(project_path))
        .with_context(|| format!("Failed to load project file: {}", project_path))?;

    let result = validate_project(&project);
    let job_count = result
        .is_ok()
        .then(|| total_job_count(&project.catalog(), project.direction_count as usize));

    if json_output {
        let output = ValidateOutput {
            project: project_path.to_string(),
            source_hash,
            project_hash,
            validation: JsonValidation::from(&result),
            job_count,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}", "Validating:".cyan().bold(), project_path);
        println!("{} {}", "Source:".dimmed(), &source_hash[..16]);
        reporting::print_validation(&result);

        if let Some(count) = job_count {
            println!(
                "{} {} character(s), {} direction(s), {} job(s)",
                "SUCCESS".green().bold(),
                project.characters.len(),
                project.direction_count,
                count
            );
        } else {
            println!(
                "{} {} error(s)",
                "FAILED".red().bold(),
                result.errors.len()
            );
        }
    }

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

//! Shared output helpers for commands.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use spriterig_backend_blender::{BatchEvent, BatchObserver, BatchReport};
use spriterig_spec::BackendError;
use spriterig_spec::{ValidationError, ValidationResult, ValidationWarning};
use std::path::Path;

/// A validation message in JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&ValidationError> for JsonMessage {
    fn from(e: &ValidationError) -> Self {
        Self {
            code: e.code.to_string(),
            message: e.message.clone(),
            path: e.path.clone(),
        }
    }
}

impl From<&ValidationWarning> for JsonMessage {
    fn from(w: &ValidationWarning) -> Self {
        Self {
            code: w.code.to_string(),
            message: w.message.clone(),
            path: w.path.clone(),
        }
    }
}

/// Errors and warnings of a validation run, as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct JsonValidation {
    pub ok: bool,
    pub errors: Vec<JsonMessage>,
    pub warnings: Vec<JsonMessage>,
}

impl From<&ValidationResult> for JsonValidation {
    fn from(result: &ValidationResult) -> Self {
        Self {
            ok: result.is_ok(),
            errors: result.errors.iter().map(JsonMessage::from).collect(),
            warnings: result.warnings.iter().map(JsonMessage::from).collect(),
        }
    }
}

/// Prints validation errors and warnings.
pub(crate) fn print_validation(result: &ValidationResult) {
    for error in &result.errors {
        let location = error
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "x".red(),
            error.code.to_string().red(),
            location.dimmed(),
            error.message
        );
    }
    for warning in &result.warnings {
        let location = warning
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "!".yellow(),
            warning.code.to_string().yellow(),
            location.dimmed(),
            warning.message
        );
    }
}

/// Prints a batch report summary.
pub(crate) fn print_batch_report(report: &BatchReport, label: &str) {
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} {}/{}", label, report.rendered, report.planned);
    if report.skipped_existing > 0 {
        println!("  already present: {}", report.skipped_existing);
    }
    for skipped in &report.skipped_characters {
        println!(
            "  {} character {} skipped: {}",
            "!".yellow(),
            skipped.character,
            skipped.reason
        );
    }
    for skipped in &report.skipped_animations {
        println!(
            "  {} animation {}/{} skipped: {}",
            "!".yellow(),
            skipped.character,
            skipped.export_name,
            skipped.reason
        );
    }
    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            "x".red(),
            failure.path.display(),
            failure.message
        );
    }
}

/// Serializes `value` as pretty JSON to `path`, creating parent directories.
pub(crate) fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    std::fs::write(path, json).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Prints driver progress to the terminal.
#[derive(Debug, Default)]
pub(crate) struct ConsoleProgress {
    /// Print a line per rendered frame.
    pub verbose: bool,
}

impl BatchObserver for ConsoleProgress {
    fn on_event(&mut self, event: &BatchEvent<'_>) {
        match event {
            BatchEvent::CharacterStarted { character } => {
                println!("{} {}", "Character:".cyan().bold(), character);
            }
            BatchEvent::CharacterSkipped { character, error } => {
                println!(
                    "  {} [{}] skipping {}: {}",
                    "!".yellow(),
                    error.code(),
                    character,
                    error
                );
            }
            BatchEvent::AnimationSkipped {
                export_name, error, ..
            } => {
                println!(
                    "  {} [{}] skipping {}: {}",
                    "!".yellow(),
                    error.code(),
                    export_name,
                    error
                );
            }
            BatchEvent::JobRendered { path, .. } => {
                if self.verbose {
                    println!("  {} {}", "ok".green(), path.display());
                }
            }
            BatchEvent::JobSkipped { path } => {
                if self.verbose {
                    println!("  {} {} (exists)", "--".dimmed(), path.display());
                }
            }
            BatchEvent::JobFailed {
                path,
                error,
                attempt,
            } => {
                println!(
                    "  {} {} (attempt {}): {}",
                    "x".red(),
                    path.display(),
                    attempt,
                    error
                );
            }
        }
    }
}

//! Doctor command implementation
//!
//! Checks system dependencies and configuration.

use anyhow::Result;
use colored::Colorize;
use spriterig_backend_blender::{Orchestrator, ENTRYPOINT_ENV};
use std::env;
use std::path::Path;
use std::process::{Command, ExitCode};

/// Run the doctor command
///
/// Checks:
/// - Blender installation
/// - Entrypoint override
/// - Output directory permissions
/// - Version information
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run() -> Result<ExitCode> {
    println!("{}", "spriterig Doctor".cyan().bold());
    println!("{}", "================".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} spriterig-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    match check_blender() {
        BlenderStatus::Found { path, version } => {
            println!(
                "  {} Blender {} ({})",
                "ok".green(),
                version,
                path.display()
            );
        }
        BlenderStatus::NotFound => {
            println!("  {} Blender not found", "!!".red());
            println!(
                "     {}",
                "Blender is required to build rigs and render; set BLENDER_PATH or add it to PATH."
                    .dimmed()
            );
            println!(
                "     {}",
                "Install from https://www.blender.org/download/".dimmed()
            );
            all_ok = false;
        }
        BlenderStatus::Error(e) => {
            println!("  {} Blender check failed: {}", "!!".red(), e);
            all_ok = false;
        }
    }

    match env::var(ENTRYPOINT_ENV) {
        Ok(path) if Path::new(&path).is_file() => {
            println!("  {} entrypoint override {}", "ok".green(), path);
        }
        Ok(path) => {
            println!(
                "  {} {} points to a missing file: {}",
                "!!".yellow(),
                ENTRYPOINT_ENV,
                path
            );
        }
        Err(_) => {
            println!("  {} embedded Blender entrypoint", "ok".green());
        }
    }

    println!();

    println!("{}", "Permissions:".bold());
    match env::current_dir() {
        Ok(dir) => {
            let test_file = dir.join(".spriterig_write_test");
            match std::fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = std::fs::remove_file(&test_file);
                    println!(
                        "  {} Current directory is writable ({})",
                        "ok".green(),
                        dir.display()
                    );
                }
                Err(e) => {
                    println!("  {} Cannot write to current directory: {}", "!!".red(), e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("  {} Cannot determine current directory: {}", "!!".red(), e);
            all_ok = false;
        }
    }

    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Status of Blender installation check
enum BlenderStatus {
    Found {
        path: std::path::PathBuf,
        version: String,
    },
    NotFound,
    Error(String),
}

fn parse_blender_version(output: &str) -> Option<String> {
    output
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("Blender "))
        .map(|v| v.trim().to_string())
}

/// Locates Blender the way the orchestrator does and asks for its version.
fn check_blender() -> BlenderStatus {
    let path = match Orchestrator::new().find_blender() {
        Ok(path) => path,
        Err(_) => return BlenderStatus::NotFound,
    };

    match Command::new(&path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = parse_blender_version(&stdout).unwrap_or_else(|| "unknown".to_string());
            BlenderStatus::Found { path, version }
        }
        Ok(output) => {
            BlenderStatus::Error(format!("Blender exited with status: {}", output.status))
        }
        Err(e) => BlenderStatus::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blender_version() {
        let out = "Blender 4.2.1 LTS\nBuild date: ...\n";
        assert_eq!(parse_blender_version(out).as_deref(), Some("4.2.1 LTS"));
        assert_eq!(parse_blender_version("not blender\n"), None);
    }
}

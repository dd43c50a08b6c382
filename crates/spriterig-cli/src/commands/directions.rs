//! Directions command implementation
//!
//! Prints the yaw angles of an evenly spaced direction set.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use spriterig_spec::generate_directions;
use std::process::ExitCode;

#[derive(Debug, Serialize)]
struct DirectionsOutput {
    count: usize,
    step: f64,
    angles: Vec<f64>,
}

/// Run the directions command
///
/// # Arguments
/// * `count` - Number of directions to generate
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success; a non-positive count is an error
pub fn run(count: i64, json_output: bool) -> Result<ExitCode> {
    let directions = generate_directions(count)?;

    if json_output {
        let output = DirectionsOutput {
            count: directions.len(),
            step: directions.step(),
            angles: directions.angles().to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} {} (step {})",
        "Directions:".cyan().bold(),
        directions.len(),
        format_degrees(directions.step())
    );
    for (index, angle) in directions.iter() {
        println!("  {:02}  {}", index, format_degrees(angle));
    }

    Ok(ExitCode::SUCCESS)
}

fn format_degrees(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}°", value)
    } else {
        format!("{:.4}°", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_degrees() {
        assert_eq!(format_degrees(45.0), "45°");
        assert_eq!(format_degrees(120.0), "120°");
        assert_eq!(format_degrees(51.428571), "51.4286°");
    }

    #[test]
    fn test_run_rejects_non_positive() {
        assert!(run(0, true).is_err());
        assert!(run(-3, false).is_err());
        assert!(run(4, true).is_ok());
    }
}

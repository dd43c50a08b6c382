//! Render-job enumeration and output path derivation.
//!
//! Jobs are enumerated character-major, then animation, then direction, then
//! frame. The same order is used by the batch driver, so a plan computed here
//! can be compared against what a host actually rendered.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::direction::{generate_directions, DirectionSet};
use crate::error::SpecError;

/// A single (character, animation, direction, frame) unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderJob {
    /// Character id.
    pub character: String,
    /// Animation export name.
    pub export_name: String,
    /// Source action name.
    pub action: String,
    /// Zero-based direction index.
    pub direction: usize,
    /// Pivot yaw in degrees.
    pub angle: f64,
    /// Target frame (1-based).
    pub frame: u32,
}

impl RenderJob {
    /// Zero-based frame index used in the file name.
    pub fn frame_index(&self) -> u32 {
        self.frame.saturating_sub(1)
    }

    /// Relative output path for this job.
    pub fn output_path(&self, extension: &str) -> String {
        compute_output_path(
            &self.character,
            &self.export_name,
            self.direction,
            self.frame_index(),
            extension,
        )
    }
}

/// Normalises a file extension to carry no leading dot.
pub fn normalize_extension(extension: &str) -> &str {
    extension.trim_start_matches('.')
}

/// Derives the relative output path of a rendered frame.
///
/// Layout: `{character}/{export_name}/{direction:02}_{frame:04}.{ext}`.
///
/// # Example
/// ```
/// use spriterig_spec::compute_output_path;
///
/// assert_eq!(compute_output_path("archer", "walk", 1, 2, ".png"), "archer/walk/01_0002.png");
/// ```
pub fn compute_output_path(
    character: &str,
    export_name: &str,
    direction: usize,
    frame_index: u32,
    extension: &str,
) -> String {
    let ext = normalize_extension(extension);
    if ext.is_empty() {
        format!(
            "{}/{}/{:02}_{:04}",
            character, export_name, direction, frame_index
        )
    } else {
        format!(
            "{}/{}/{:02}_{:04}.{}",
            character, export_name, direction, frame_index, ext
        )
    }
}

/// Total number of jobs for a catalog and direction count.
pub fn total_job_count(catalog: &Catalog, direction_count: usize) -> u64 {
    catalog
        .iter()
        .map(|c| c.frame_total() * direction_count as u64)
        .sum()
}

/// Enumerates every render job in driver order.
///
/// # Errors
/// Returns [`SpecError::InvalidArgument`] when `direction_count <= 0` or the
/// catalog fails [`Catalog::check`].
pub fn plan_jobs(catalog: &Catalog, direction_count: i64) -> Result<Vec<RenderJob>, SpecError> {
    let directions = generate_directions(direction_count)?;
    plan_jobs_with(catalog, &directions)
}

/// Enumerates every render job for an already generated direction set.
///
/// # Errors
/// Returns [`SpecError::InvalidArgument`] when the catalog fails [`Catalog::check`].
pub fn plan_jobs_with(
    catalog: &Catalog,
    directions: &DirectionSet,
) -> Result<Vec<RenderJob>, SpecError> {
    catalog.check()?;
    let mut jobs = Vec::new();
    for character in catalog {
        for animation in &character.animations {
            for (direction, angle) in directions.iter() {
                for frame in animation.frames() {
                    jobs.push(RenderJob {
                        character: character.id.clone(),
                        export_name: animation.export_name.clone(),
                        action: animation.action.clone(),
                        direction,
                        angle,
                        frame,
                    });
                }
            }
        }
    }
    Ok(jobs)
}

//! spriterig Project Library
//!
//! This crate provides the host-independent half of spriterig: the project
//! file format, direction sets, render-job planning, output path derivation,
//! rig parameters, validation, and hashing.
//!
//! # Overview
//!
//! A project lists characters, each with ordered animations. Rendering visits
//! every (character, animation, direction, frame) combination in a fixed
//! nested order and writes one image per combination to
//! `{character}/{export_name}/{direction:02}_{frame:04}.{ext}`.
//!
//! # Example
//!
//! ```
//! use spriterig_spec::{plan_jobs, AnimationSpec, Catalog, CharacterEntry};
//!
//! let catalog = Catalog::new().character(
//!     CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 3)),
//! );
//! let jobs = plan_jobs(&catalog, 2).unwrap();
//! assert_eq!(jobs.len(), 6);
//! assert_eq!(jobs[3].output_path("png"), "archer/walk/01_0000.png");
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Characters and animations
//! - [`direction`]: Direction sets and the compass enum
//! - [`error`]: Error and warning types
//! - [`hash`]: Canonical project hashing
//! - [`job`]: Render-job enumeration and output paths
//! - [`project`]: Project file type
//! - [`rig`]: Rig geometry and render settings
//! - [`validation`]: Project validation

pub mod catalog;
pub mod direction;
pub mod error;
pub mod hash;
pub mod job;
pub mod project;
pub mod rig;
pub mod validation;

// Re-export commonly used types at the crate root
pub use catalog::{AnimationSpec, Catalog, CharacterEntry, ARMATURE_PREFIX};
pub use direction::{generate_directions, CompassDirection, DirectionSet, COMPASS_DIRECTION_COUNT};
pub use error::{
    BackendError, ErrorCode, SpecError, ValidationError, ValidationResult, ValidationWarning,
    WarningCode,
};
pub use hash::{canonical_project_hash, canonical_value_hash};
pub use job::{
    compute_output_path, normalize_extension, plan_jobs, plan_jobs_with, total_job_count,
    RenderJob,
};
pub use project::{
    SpriteProject, DEFAULT_DIRECTION_COUNT, DEFAULT_FILE_EXTENSION, DEFAULT_OUTPUT_ROOT,
    PROJECT_VERSION,
};
pub use rig::{ReferencePart, RenderSettings, RigParams, Vec3, DEFAULT_AMBIENT_COLOR};
pub use validation::{is_valid_extension, is_valid_identifier, validate_project};

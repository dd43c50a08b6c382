//! Project validation logic.
//!
//! Validation collects every problem instead of stopping at the first one, so a
//! user fixing a project file sees all errors in a single pass.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::{AnimationSpec, CharacterEntry};
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::project::{SpriteProject, PROJECT_VERSION};

/// Identifiers become path segments: start with an alphanumeric or underscore,
/// followed by up to 63 alphanumerics, underscores, hyphens, or dots.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,63}$";

/// File extension, with or without a leading dot.
const EXTENSION_PATTERN: &str = r"^\.?[A-Za-z0-9]{1,8}$";

/// Direction indices wider than this no longer fit the two-digit field.
const MAX_PADDED_DIRECTIONS: u32 = 100;

/// Frame indices wider than this no longer fit the four-digit field.
const MAX_PADDED_FRAME_INDEX: u32 = 9999;

static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTENSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn identifier_regex() -> &'static Regex {
    IDENTIFIER_REGEX.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("invalid regex pattern"))
}

fn extension_regex() -> &'static Regex {
    EXTENSION_REGEX.get_or_init(|| Regex::new(EXTENSION_PATTERN).expect("invalid regex pattern"))
}

/// Checks whether `id` is usable as a character id or export name.
pub fn is_valid_identifier(id: &str) -> bool {
    identifier_regex().is_match(id)
}

/// Checks whether `ext` is a usable image file extension.
pub fn is_valid_extension(ext: &str) -> bool {
    extension_regex().is_match(ext)
}

/// Validates a project and returns a validation result.
///
/// # Example
/// ```
/// use spriterig_spec::{AnimationSpec, CharacterEntry, SpriteProject};
/// use spriterig_spec::validation::validate_project;
///
/// let project = SpriteProject::new(vec![
///     CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 16)),
/// ]);
/// assert!(validate_project(&project).is_ok());
/// ```
pub fn validate_project(project: &SpriteProject) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_contract(project, &mut result);
    validate_render(project, &mut result);

    if project.characters.is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::NoCharacters,
            "characters array must have at least one entry",
            "characters",
        ));
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (i, character) in project.characters.iter().enumerate() {
        if !seen_ids.insert(&character.id) {
            result.add_error(ValidationError::with_path(
                ErrorCode::DuplicateCharacterId,
                format!("duplicate character id: '{}'", character.id),
                format!("characters[{}].id", i),
            ));
        }
        validate_character(character, i, &mut result);
    }

    result
}

fn validate_contract(project: &SpriteProject, result: &mut ValidationResult) {
    if project.project_version != PROJECT_VERSION {
        result.add_error(ValidationError::with_path(
            ErrorCode::UnsupportedProjectVersion,
            format!(
                "project_version must be {}, got {}",
                PROJECT_VERSION, project.project_version
            ),
            "project_version",
        ));
    }

    if project.direction_count == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidDirectionCount,
            "direction_count must be a positive integer",
            "direction_count",
        ));
    } else if project.direction_count > MAX_PADDED_DIRECTIONS {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::WideDirectionIndex,
            format!(
                "direction_count {} exceeds the two-digit direction field; file names will not sort lexically",
                project.direction_count
            ),
            "direction_count",
        ));
    }

    if !is_valid_extension(&project.file_extension) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFileExtension,
            format!(
                "file_extension must match '{}', got '{}'",
                EXTENSION_PATTERN, project.file_extension
            ),
            "file_extension",
        ));
    }

    if project.output_root.trim().is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::UnsafeOutputRoot,
            "output_root cannot be empty",
            "output_root",
        ));
    } else if project
        .output_root
        .split(['/', '\\'])
        .any(|segment| segment == "..")
    {
        result.add_error(ValidationError::with_path(
            ErrorCode::UnsafeOutputRoot,
            format!(
                "output_root must not contain '..' segments: '{}'",
                project.output_root
            ),
            "output_root",
        ));
    }
}

fn validate_render(project: &SpriteProject, result: &mut ValidationResult) {
    let render = &project.render;
    if render.resolution[0] == 0 || render.resolution[1] == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidResolution,
            format!(
                "resolution must be non-zero, got {}x{}",
                render.resolution[0], render.resolution[1]
            ),
            "render.resolution",
        ));
    }
    if render.compression > 100 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidCompression,
            format!("compression must be 0-100, got {}", render.compression),
            "render.compression",
        ));
    }
    if !(project.rig.ortho_scale.is_finite() && project.rig.ortho_scale > 0.0) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidOrthoScale,
            format!(
                "ortho_scale must be a positive number, got {}",
                project.rig.ortho_scale
            ),
            "rig.ortho_scale",
        ));
    }
}

fn validate_character(character: &CharacterEntry, index: usize, result: &mut ValidationResult) {
    let base = format!("characters[{}]", index);

    if !is_valid_identifier(&character.id) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidCharacterId,
            format!(
                "character id must match '{}', got '{}'",
                IDENTIFIER_PATTERN, character.id
            ),
            format!("{}.id", base),
        ));
    }

    if let Some(ref armature) = character.armature {
        if armature.trim().is_empty() {
            result.add_error(ValidationError::with_path(
                ErrorCode::EmptyArmatureName,
                "armature override cannot be empty",
                format!("{}.armature", base),
            ));
        }
    }

    if character.animations.is_empty() {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::NoAnimations,
            format!("character '{}' has no animations to render", character.id),
            format!("{}.animations", base),
        ));
    }

    let mut seen_exports: HashSet<&str> = HashSet::new();
    for (i, animation) in character.animations.iter().enumerate() {
        let path = format!("{}.animations[{}]", base, i);
        if !seen_exports.insert(&animation.export_name) {
            result.add_error(ValidationError::with_path(
                ErrorCode::DuplicateExportName,
                format!(
                    "duplicate export name '{}' for character '{}'",
                    animation.export_name, character.id
                ),
                format!("{}.export_name", path),
            ));
        }
        validate_animation(animation, &path, result);
    }
}

fn validate_animation(animation: &AnimationSpec, path: &str, result: &mut ValidationResult) {
    if !is_valid_identifier(&animation.export_name) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidExportName,
            format!(
                "export name must match '{}', got '{}'",
                IDENTIFIER_PATTERN, animation.export_name
            ),
            format!("{}.export_name", path),
        ));
    }

    if animation.action.trim().is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::EmptyActionName,
            "action name cannot be empty",
            format!("{}.action", path),
        ));
    }

    if animation.start_frame == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidStartFrame,
            "start_frame is 1-based and must be at least 1",
            format!("{}.start_frame", path),
        ));
    }

    if animation.frame_count == 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFrameCount,
            "frame_count must be at least 1",
            format!("{}.frame_count", path),
        ));
        return;
    }

    match animation.end_frame() {
        None => result.add_error(ValidationError::with_path(
            ErrorCode::InvalidFrameCount,
            format!(
                "frame window starting at {} with {} frames overflows",
                animation.start_frame, animation.frame_count
            ),
            format!("{}.frame_count", path),
        )),
        Some(end) if end.saturating_sub(1) > MAX_PADDED_FRAME_INDEX => {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::WideFrameIndex,
                format!(
                    "frame index {} exceeds the four-digit frame field",
                    end.saturating_sub(1)
                ),
                format!("{}.frame_count", path),
            ))
        }
        Some(_) => {}
    }
}

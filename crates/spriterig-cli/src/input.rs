//! Project loading and command-line overrides.
//!
//! Commands read a JSON project file, hash it for provenance, and layer any
//! command-line overrides on top before handing options to the engine.

use anyhow::{Context, Result};
use spriterig_backend_blender::{BatchOptions, ExistingRig, RenderPolicy, RigBuilder};
use spriterig_spec::{canonical_project_hash, SpriteProject};
use std::path::{Path, PathBuf};

/// A project loaded from disk.
#[derive(Debug)]
pub struct LoadedProject {
    /// The parsed project.
    pub project: SpriteProject,
    /// BLAKE3 hash of the file content (hex string).
    pub source_hash: String,
    /// Hash of the canonical project JSON.
    pub project_hash: String,
}

/// Reads and parses a project file.
pub fn load_project(path: &Path) -> Result<LoadedProject> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {}", path.display()))?;
    let project = SpriteProject::from_json(&content)
        .with_context(|| format!("Failed to parse project file: {}", path.display()))?;
    let project_hash = canonical_project_hash(&project)
        .with_context(|| format!("Failed to hash project: {}", path.display()))?;

    Ok(LoadedProject {
        project,
        source_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
        project_hash,
    })
}

/// Command-line values that take precedence over the project file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub direction_count: Option<i64>,
    pub output_root: Option<String>,
    pub file_extension: Option<String>,
}

/// Builds driver options from a project and overrides.
///
/// A relative output root is resolved against `base_dir` when given (the
/// `.blend` file's directory for Blender runs).
pub fn batch_options(
    project: &SpriteProject,
    overrides: &Overrides,
    policy: RenderPolicy,
    skip_existing: bool,
    base_dir: Option<&Path>,
) -> BatchOptions {
    let output_root = overrides
        .output_root
        .clone()
        .unwrap_or_else(|| project.output_root.clone());
    let output_root = resolve_output_root(&output_root, base_dir);

    BatchOptions::default()
        .direction_count(
            overrides
                .direction_count
                .unwrap_or(project.direction_count as i64),
        )
        .output_root(output_root)
        .file_extension(
            overrides
                .file_extension
                .clone()
                .unwrap_or_else(|| project.file_extension.clone()),
        )
        .policy(policy)
        .skip_existing(skip_existing)
        .pivot_name(project.rig.pivot_name.clone())
}

/// Rig builder configured from a project's rig and render settings, or the
/// defaults when no project is given.
pub fn rig_builder(project: Option<&SpriteProject>, reference: bool, replace: bool) -> RigBuilder {
    let builder = match project {
        Some(project) => {
            RigBuilder::new(project.rig.clone()).render_settings(project.render.clone())
        }
        None => RigBuilder::default(),
    };
    builder
        .reference_geometry(reference)
        .on_existing(if replace {
            ExistingRig::Replace
        } else {
            ExistingRig::Reject
        })
}

/// Joins a relative output root onto a base directory.
pub fn resolve_output_root(output_root: &str, base_dir: Option<&Path>) -> PathBuf {
    let root = PathBuf::from(output_root);
    match base_dir {
        Some(base) if root.is_relative() => base.join(root),
        _ => root,
    }
}

/// Directory of a `.blend` file, made absolute.
pub fn blend_dir(blend: &Path) -> Result<PathBuf> {
    let blend = if blend.is_absolute() {
        blend.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to determine current directory")?
            .join(blend)
    };
    Ok(blend
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/")))
}

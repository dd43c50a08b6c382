//! Test fixtures: reference projects, scenes, and a recording observer.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use spriterig_backend_blender::{
    build_rig, BatchEvent, BatchObserver, DriverState, MemoryScene, RigError,
};
use spriterig_spec::{AnimationSpec, BackendError, Catalog, CharacterEntry, SpriteProject};

/// The production project: two characters, eight directions, and a held
/// final frame exported as its own animation.
pub const REFERENCE_PROJECT_JSON: &str = r#"{
    "project_version": 1,
    "direction_count": 8,
    "output_root": "renders",
    "characters": [
        {
            "id": "archer",
            "animations": [
                { "export_name": "walk", "action": "walk", "start_frame": 1, "frame_count": 16 },
                { "export_name": "idle", "action": "idle", "start_frame": 1, "frame_count": 16 },
                { "export_name": "attack", "action": "attack", "start_frame": 1, "frame_count": 16 },
                { "export_name": "death", "action": "death", "start_frame": 1, "frame_count": 16 },
                { "export_name": "dead", "action": "death", "start_frame": 16, "frame_count": 1 }
            ]
        },
        {
            "id": "enemy",
            "animations": [
                { "export_name": "walk", "action": "walk", "start_frame": 1, "frame_count": 16 }
            ]
        }
    ]
}"#;

/// Parses [`REFERENCE_PROJECT_JSON`].
pub fn reference_project() -> SpriteProject {
    SpriteProject::from_json(REFERENCE_PROJECT_JSON).expect("reference project should parse")
}

/// One character "archer" with a three-frame walk.
pub fn archer_catalog() -> Catalog {
    Catalog::new().character(CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 3)))
}

/// Characters `a` and `b`, each with two-frame `walk` and `idle` animations.
pub fn two_character_catalog() -> Catalog {
    let character = |id: &str| {
        CharacterEntry::new(id)
            .animation(AnimationSpec::new("walk", 1, 2))
            .animation(AnimationSpec::new("idle", 1, 2))
    };
    Catalog::new().character(character("a")).character(character("b"))
}

/// An in-memory scene holding everything `catalog` refers to, with the
/// default rig built.
pub fn rigged_scene(catalog: &Catalog) -> MemoryScene {
    let mut scene = MemoryScene::from_catalog(catalog).expect("scene should seed");
    build_rig(&mut scene).expect("rig should build");
    scene
}

/// A temporary directory holding a project file.
pub struct ProjectFixture {
    pub root: TempDir,
    pub project_path: PathBuf,
}

impl ProjectFixture {
    /// Writes `json` to `project.json` in a fresh temporary directory.
    pub fn new(json: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let project_path = root.path().join("project.json");
        fs::write(&project_path, json).expect("Failed to write project file");
        Self { root, project_path }
    }

    /// Fixture with [`REFERENCE_PROJECT_JSON`].
    pub fn reference() -> Self {
        Self::new(REFERENCE_PROJECT_JSON)
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Project file path as a string, for CLI arguments.
    pub fn project_arg(&self) -> String {
        self.project_path.to_string_lossy().to_string()
    }

    /// Creates an empty file at `rel` under the fixture root, as if a previous
    /// run had already rendered it.
    pub fn touch(&self, rel: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create output dir");
        }
        fs::write(&path, b"").expect("Failed to write output file");
        path
    }
}

/// An owned copy of a driver event.
#[derive(Debug, Clone, PartialEq)]
pub enum LoggedEvent {
    CharacterStarted(String),
    CharacterSkipped { character: String, code: String },
    AnimationSkipped { character: String, export_name: String, code: String },
    Rendered(PathBuf),
    Skipped(PathBuf),
    Failed { path: PathBuf, attempt: u32 },
}

/// Observer that keeps every event and state transition.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<LoggedEvent>,
    pub states: Vec<DriverState>,
}

impl EventLog {
    /// Paths of rendered jobs, in order.
    pub fn rendered(&self) -> Vec<&Path> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LoggedEvent::Rendered(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Number of failed attempts logged.
    pub fn failed_attempts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, LoggedEvent::Failed { .. }))
            .count()
    }
}

fn code(error: &RigError) -> String {
    error.code().to_string()
}

impl BatchObserver for EventLog {
    fn on_event(&mut self, event: &BatchEvent<'_>) {
        let logged = match event {
            BatchEvent::CharacterStarted { character } => {
                LoggedEvent::CharacterStarted(character.to_string())
            }
            BatchEvent::CharacterSkipped { character, error } => LoggedEvent::CharacterSkipped {
                character: character.to_string(),
                code: code(error),
            },
            BatchEvent::AnimationSkipped {
                character,
                export_name,
                error,
            } => LoggedEvent::AnimationSkipped {
                character: character.to_string(),
                export_name: export_name.to_string(),
                code: code(error),
            },
            BatchEvent::JobRendered { path, .. } => LoggedEvent::Rendered(path.to_path_buf()),
            BatchEvent::JobSkipped { path } => LoggedEvent::Skipped(path.to_path_buf()),
            BatchEvent::JobFailed { path, attempt, .. } => LoggedEvent::Failed {
                path: path.to_path_buf(),
                attempt: *attempt,
            },
        };
        self.events.push(logged);
    }

    fn on_state(&mut self, state: DriverState) {
        self.states.push(state);
    }
}

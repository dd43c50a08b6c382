//! Batch render driver.
//!
//! Walks the catalog character-major, then animation, then direction, then
//! frame, rotating the rig pivot and rendering one image per combination.
//! Missing armatures skip a character and missing actions skip an animation;
//! render failures follow the configured [`RenderPolicy`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use spriterig_spec::{
    compute_output_path, generate_directions, total_job_count, Catalog, RigParams,
    DEFAULT_DIRECTION_COUNT, DEFAULT_OUTPUT_ROOT,
};
use tracing::{error, info, warn};

use crate::catalog::{activate_character_visibility, resolve_armature};
use crate::error::{Resource, RigError, RigResult};
use crate::rig::{find_pivot, set_pivot_yaw};
use crate::scene::{Renderer, Scene};

/// Phase of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Idle,
    SelectingCharacter,
    SelectingAnimation,
    SelectingDirection,
    RenderingFrame,
}

/// What to do once a render has failed and its retries are used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// Stop the whole run with the render error.
    #[default]
    Abort,
    /// Record the failure and carry on with the next job.
    Continue,
}

/// Render failure handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderPolicy {
    pub on_failure: OnFailure,
    /// Extra attempts before `on_failure` applies.
    pub retries: u32,
}

impl RenderPolicy {
    /// Aborts on the first failure. This is the default.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Records failures and keeps going.
    pub fn isolate() -> Self {
        Self {
            on_failure: OnFailure::Continue,
            retries: 0,
        }
    }

    /// Sets the number of extra attempts per job.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Parameters of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Number of evenly spaced directions.
    pub direction_count: i64,
    /// Directory relative output paths are joined onto.
    pub output_root: PathBuf,
    /// Image extension; the scene's own extension when `None`.
    pub file_extension: Option<String>,
    pub policy: RenderPolicy,
    /// Skip jobs whose output file already exists.
    pub skip_existing: bool,
    /// Name of the rig pivot to rotate.
    pub pivot_name: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            direction_count: DEFAULT_DIRECTION_COUNT as i64,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            file_extension: None,
            policy: RenderPolicy::default(),
            skip_existing: false,
            pivot_name: RigParams::default().pivot_name,
        }
    }
}

impl BatchOptions {
    pub fn direction_count(mut self, n: i64) -> Self {
        self.direction_count = n;
        self
    }

    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.file_extension = Some(ext.into());
        self
    }

    pub fn policy(mut self, policy: RenderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn pivot_name(mut self, name: impl Into<String>) -> Self {
        self.pivot_name = name.into();
        self
    }
}

/// A render that failed under [`OnFailure::Continue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub path: PathBuf,
    pub message: String,
    pub attempts: u32,
}

/// A character whose pass was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCharacter {
    pub character: String,
    pub reason: String,
}

/// An animation whose pass was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedAnimation {
    pub character: String,
    pub export_name: String,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub direction_count: usize,
    /// Jobs in the full cross product.
    pub planned: u64,
    pub rendered: u64,
    pub skipped_existing: u64,
    pub failures: Vec<JobFailure>,
    pub skipped_characters: Vec<SkippedCharacter>,
    pub skipped_animations: Vec<SkippedAnimation>,
    pub duration_ms: u64,
}

impl BatchReport {
    /// True when every planned job was rendered or already present.
    pub fn is_complete(&self) -> bool {
        self.rendered + self.skipped_existing == self.planned
    }
}

/// Progress notification from the driver.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    CharacterStarted {
        character: &'a str,
    },
    CharacterSkipped {
        character: &'a str,
        error: &'a RigError,
    },
    AnimationSkipped {
        character: &'a str,
        export_name: &'a str,
        error: &'a RigError,
    },
    JobRendered {
        path: &'a Path,
        direction: usize,
        frame: u32,
    },
    JobSkipped {
        path: &'a Path,
    },
    JobFailed {
        path: &'a Path,
        error: &'a RigError,
        attempt: u32,
    },
}

/// Receives driver progress.
pub trait BatchObserver {
    fn on_event(&mut self, event: &BatchEvent<'_>);

    /// Called on every state transition.
    fn on_state(&mut self, _state: DriverState) {}
}

/// Runs the nested render loop and tracks its state.
#[derive(Default)]
pub struct BatchRenderDriver<'a> {
    state: DriverState,
    observer: Option<&'a mut dyn BatchObserver>,
}

impl<'a> BatchRenderDriver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a progress observer.
    pub fn with_observer(mut self, observer: &'a mut dyn BatchObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Current state. `Idle` outside of [`run`](Self::run).
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Renders every job of the catalog.
    ///
    /// # Errors
    /// - `InvalidArgument` for a non-positive direction count, a duplicate
    ///   character id or export name, or a frame window starting at 0 or
    ///   running past `u32::MAX`. Nothing in the scene is touched.
    /// - `PreconditionViolation` if the pivot does not exist.
    /// - The render error under [`OnFailure::Abort`].
    /// - Any other scene error.
    pub fn run<H>(
        &mut self,
        host: &mut H,
        catalog: &Catalog,
        options: &BatchOptions,
    ) -> RigResult<BatchReport>
    where
        H: Scene + Renderer + ?Sized,
    {
        let result = self.run_inner(host, catalog, options);
        self.enter(DriverState::Idle);
        result
    }

    fn run_inner<H>(
        &mut self,
        host: &mut H,
        catalog: &Catalog,
        options: &BatchOptions,
    ) -> RigResult<BatchReport>
    where
        H: Scene + Renderer + ?Sized,
    {
        let start = Instant::now();
        let directions = generate_directions(options.direction_count)?;
        catalog.check()?;
        let pivot = find_pivot(&*host, &options.pivot_name)?;
        let extension = options
            .file_extension
            .clone()
            .unwrap_or_else(|| host.file_extension());

        let mut report = BatchReport {
            direction_count: directions.len(),
            planned: total_job_count(catalog, directions.len()),
            ..BatchReport::default()
        };

        for character in catalog {
            self.enter(DriverState::SelectingCharacter);
            self.emit(BatchEvent::CharacterStarted {
                character: &character.id,
            });
            activate_character_visibility(host, &character.id)?;

            let armature = match resolve_armature(&*host, character) {
                Ok(armature) => armature,
                Err(e) if e.is_not_found(Resource::Armature) => {
                    warn!(character = %character.id, "Skipping character: {}", e);
                    self.emit(BatchEvent::CharacterSkipped {
                        character: &character.id,
                        error: &e,
                    });
                    report.skipped_characters.push(SkippedCharacter {
                        character: character.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            for animation in &character.animations {
                self.enter(DriverState::SelectingAnimation);
                if let Err(e) = host.bind_action(armature, &animation.action) {
                    if !e.is_not_found(Resource::Action) {
                        return Err(e);
                    }
                    warn!(
                        character = %character.id,
                        animation = %animation.export_name,
                        "Skipping animation: {}",
                        e
                    );
                    self.emit(BatchEvent::AnimationSkipped {
                        character: &character.id,
                        export_name: &animation.export_name,
                        error: &e,
                    });
                    report.skipped_animations.push(SkippedAnimation {
                        character: character.id.clone(),
                        export_name: animation.export_name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }

                for (direction, angle) in directions.iter() {
                    self.enter(DriverState::SelectingDirection);
                    set_pivot_yaw(host, pivot, angle)?;
                    host.update()?;

                    for frame in animation.frames() {
                        self.enter(DriverState::RenderingFrame);
                        let frame_index = frame - 1;
                        let relative = compute_output_path(
                            &character.id,
                            &animation.export_name,
                            direction,
                            frame_index,
                            &extension,
                        );
                        let path = options.output_root.join(relative);

                        if options.skip_existing && path.exists() {
                            report.skipped_existing += 1;
                            self.emit(BatchEvent::JobSkipped { path: &path });
                            continue;
                        }

                        host.set_frame(frame)?;
                        if self.render_job(host, &path, options.policy, &mut report)? {
                            info!("Rendered {} {:04}", direction, frame_index);
                            self.emit(BatchEvent::JobRendered {
                                path: &path,
                                direction,
                                frame,
                            });
                        }
                    }
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Renders one frame under the policy. Returns false if the failure was
    /// recorded and the run should continue.
    fn render_job<H>(
        &mut self,
        host: &mut H,
        path: &Path,
        policy: RenderPolicy,
        report: &mut BatchReport,
    ) -> RigResult<bool>
    where
        H: Renderer + ?Sized,
    {
        let attempts = policy.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            let err = match host.render_current_frame(path) {
                Ok(()) => {
                    report.rendered += 1;
                    return Ok(true);
                }
                Err(e) => e,
            };
            self.emit(BatchEvent::JobFailed {
                path,
                error: &err,
                attempt,
            });

            if attempt < attempts {
                warn!(path = %path.display(), attempt, "Render failed, retrying: {}", err);
                attempt += 1;
                continue;
            }

            error!(path = %path.display(), attempts, "Render failed: {}", err);
            return match policy.on_failure {
                OnFailure::Abort => Err(err),
                OnFailure::Continue => {
                    report.failures.push(JobFailure {
                        path: path.to_path_buf(),
                        message: err.to_string(),
                        attempts,
                    });
                    Ok(false)
                }
            };
        }
    }

    fn enter(&mut self, state: DriverState) {
        if self.state != state {
            self.state = state;
            if let Some(observer) = self.observer.as_deref_mut() {
                observer.on_state(state);
            }
        }
    }

    fn emit(&mut self, event: BatchEvent<'_>) {
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_event(&event);
        }
    }
}

/// Renders every job of the catalog against a host.
#[tracing::instrument(skip_all, fields(directions = options.direction_count, characters = catalog.len()))]
pub fn run_batch_render<H>(
    host: &mut H,
    catalog: &Catalog,
    options: &BatchOptions,
) -> RigResult<BatchReport>
where
    H: Scene + Renderer + ?Sized,
{
    BatchRenderDriver::new().run(host, catalog, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScene;
    use crate::rig::build_rig;
    use crate::scene::world_yaw_degrees;
    use pretty_assertions::assert_eq;
    use spriterig_spec::{plan_jobs, AnimationSpec, CharacterEntry};

    fn host_for(catalog: &Catalog) -> MemoryScene {
        let mut scene = MemoryScene::from_catalog(catalog).unwrap();
        build_rig(&mut scene).unwrap();
        scene
    }

    fn rendered_paths(scene: &MemoryScene) -> Vec<String> {
        scene
            .renders()
            .iter()
            .map(|r| r.path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn archer() -> Catalog {
        Catalog::new().character(
            CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 3)),
        )
    }

    #[test]
    fn test_archer_scenario() {
        let catalog = archer();
        let mut host = host_for(&catalog);
        let options = BatchOptions::default().direction_count(2).output_root("");

        let report = run_batch_render(&mut host, &catalog, &options).unwrap();

        assert_eq!(
            rendered_paths(&host),
            vec![
                "archer/walk/00_0000.png",
                "archer/walk/00_0001.png",
                "archer/walk/00_0002.png",
                "archer/walk/01_0000.png",
                "archer/walk/01_0001.png",
                "archer/walk/01_0002.png",
            ]
        );
        assert_eq!(report.planned, 6);
        assert_eq!(report.rendered, 6);
        assert!(report.is_complete());

        let frames: Vec<u32> = host.renders().iter().map(|r| r.frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 1, 2, 3]);
        let yaws: Vec<f64> = host.renders().iter().map(|r| r.camera_yaw.unwrap()).collect();
        for (yaw, expected) in yaws.iter().zip([0.0, 0.0, 0.0, 180.0, 180.0, 180.0]) {
            assert!((yaw - expected).abs() < 1e-9, "yaw {} != {}", yaw, expected);
        }
    }

    #[test]
    fn test_order_matches_plan() {
        let catalog = Catalog::new()
            .character(
                CharacterEntry::new("a")
                    .animation(AnimationSpec::new("walk", 1, 2))
                    .animation(AnimationSpec::new("idle", 1, 2)),
            )
            .character(
                CharacterEntry::new("b")
                    .animation(AnimationSpec::new("walk", 1, 2))
                    .animation(AnimationSpec::new("idle", 1, 2)),
            );
        let mut host = host_for(&catalog);
        let options = BatchOptions::default()
            .direction_count(2)
            .output_root("out")
            .file_extension("png");

        run_batch_render(&mut host, &catalog, &options).unwrap();

        let expected: Vec<String> = plan_jobs(&catalog, 2)
            .unwrap()
            .iter()
            .map(|job| format!("out/{}", job.output_path("png")))
            .collect();
        assert_eq!(rendered_paths(&host), expected);
        assert_eq!(expected.len(), 16);
        assert!(expected[0].starts_with("out/a/walk/00_"));
        assert!(expected[4].starts_with("out/a/idle/00_"));
        assert!(expected[8].starts_with("out/b/walk/00_"));
    }

    #[test]
    fn test_character_isolation() {
        let catalog = Catalog::new()
            .character(CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 2)))
            .character(CharacterEntry::new("enemy").animation(AnimationSpec::new("walk", 1, 2)));
        let mut host = MemoryScene::new()
            .with_collection("archer")
            .with_collection("enemy")
            .with_action("walk")
            .with_armature("armature_archer")
            .unwrap();
        build_rig(&mut host).unwrap();

        let options = BatchOptions::default().direction_count(4);
        let report = run_batch_render(&mut host, &catalog, &options).unwrap();

        assert_eq!(report.rendered, 8);
        assert_eq!(report.skipped_characters.len(), 1);
        assert_eq!(report.skipped_characters[0].character, "enemy");
        assert!(!report.is_complete());
        for record in host.renders() {
            assert!(record.path.starts_with("renders/archer"));
            assert_eq!(record.visible_collections, vec!["archer".to_string()]);
        }
    }

    #[test]
    fn test_missing_action_skips_animation() {
        let catalog = Catalog::new().character(
            CharacterEntry::new("archer")
                .animation(AnimationSpec::new("walk", 1, 2))
                .animation(AnimationSpec::new("fly", 1, 2))
                .animation(AnimationSpec::new("idle", 1, 2)),
        );
        let mut host = MemoryScene::new()
            .with_collection("archer")
            .with_action("walk")
            .with_action("idle")
            .with_armature("armature_archer")
            .unwrap();
        build_rig(&mut host).unwrap();

        let options = BatchOptions::default().direction_count(1);
        let report = run_batch_render(&mut host, &catalog, &options).unwrap();

        assert_eq!(
            rendered_paths(&host),
            vec![
                "renders/archer/walk/00_0000.png",
                "renders/archer/walk/00_0001.png",
                "renders/archer/idle/00_0000.png",
                "renders/archer/idle/00_0001.png",
            ]
        );
        assert_eq!(report.skipped_animations.len(), 1);
        assert_eq!(report.skipped_animations[0].export_name, "fly");
    }

    #[test]
    fn test_abort_on_render_failure() {
        let catalog = archer();
        let mut host = host_for(&catalog).fail_render("renders/archer/walk/00_0001.png", 1);
        let options = BatchOptions::default().direction_count(2);

        let mut driver = BatchRenderDriver::new();
        let err = driver.run(&mut host, &catalog, &options).unwrap_err();

        assert!(matches!(err, RigError::CollaboratorFailure { .. }));
        assert_eq!(host.renders().len(), 1);
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn test_continue_on_render_failure() {
        let catalog = archer();
        let mut host = host_for(&catalog).fail_render("renders/archer/walk/00_0001.png", 5);
        let options = BatchOptions::default()
            .direction_count(2)
            .policy(RenderPolicy::isolate());

        let report = run_batch_render(&mut host, &catalog, &options).unwrap();

        assert_eq!(report.rendered, 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].attempts, 1);
        assert_eq!(
            report.failures[0].path,
            PathBuf::from("renders/archer/walk/00_0001.png")
        );
    }

    #[test]
    fn test_retries_recover() {
        let catalog = archer();
        let mut host = host_for(&catalog).fail_render("renders/archer/walk/01_0002.png", 2);
        let options = BatchOptions::default()
            .direction_count(2)
            .policy(RenderPolicy::strict().with_retries(2));

        let report = run_batch_render(&mut host, &catalog, &options).unwrap();
        assert_eq!(report.rendered, 6);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_skip_existing() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("archer/walk/00_0000.png");
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"png").unwrap();

        let catalog = archer();
        let mut host = host_for(&catalog);
        let options = BatchOptions::default()
            .direction_count(2)
            .output_root(dir.path())
            .skip_existing(true);

        let report = run_batch_render(&mut host, &catalog, &options).unwrap();
        assert_eq!(report.skipped_existing, 1);
        assert_eq!(report.rendered, 5);
        assert!(report.is_complete());
        assert!(host.renders().iter().all(|r| r.path != existing));
    }

    #[test]
    fn test_invalid_direction_count() {
        let catalog = archer();
        let mut host = host_for(&catalog);
        for n in [0, -3] {
            let options = BatchOptions::default().direction_count(n);
            let err = run_batch_render(&mut host, &catalog, &options).unwrap_err();
            assert!(matches!(err, RigError::InvalidArgument { .. }));
        }
        assert!(host.renders().is_empty());
    }

    #[test]
    fn test_requires_rig() {
        let catalog = archer();
        let mut host = MemoryScene::from_catalog(&catalog).unwrap();
        let err = run_batch_render(&mut host, &catalog, &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, RigError::PreconditionViolation { .. }));
    }

    #[test]
    fn test_zero_start_frame_rejected() {
        let catalog = Catalog::new()
            .character(CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 0, 2)));
        let mut host = host_for(&catalog);
        let err = run_batch_render(&mut host, &catalog, &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, RigError::InvalidArgument { .. }));
    }

    #[test]
    fn test_duplicate_export_name_rejected_before_rendering() {
        let catalog = Catalog::new().character(
            CharacterEntry::new("archer")
                .animation(AnimationSpec::new("walk", 1, 2))
                .animation(AnimationSpec::new("run", 1, 2).exported_as("walk")),
        );
        let mut host = host_for(&catalog);
        let pivot = find_pivot(&host, "ROTATEBOX").unwrap();
        let yaw_before = world_yaw_degrees(&host, pivot);

        let err = run_batch_render(&mut host, &catalog, &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, RigError::InvalidArgument { .. }));
        assert!(host.renders().is_empty());
        assert_eq!(world_yaw_degrees(&host, pivot), yaw_before);
    }

    #[test]
    fn test_duplicate_character_rejected() {
        let catalog = Catalog::new()
            .character(CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 1)))
            .character(CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 1)));
        let mut host = host_for(&catalog);
        let err = run_batch_render(&mut host, &catalog, &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, RigError::InvalidArgument { .. }));
        assert!(host.renders().is_empty());
    }

    #[test]
    fn test_default_pivot_matches_rig() {
        assert_eq!(BatchOptions::default().pivot_name, RigParams::default().pivot_name);
    }

    #[derive(Default)]
    struct Recorder {
        states: Vec<DriverState>,
        rendered: usize,
        skipped: Vec<String>,
    }

    impl BatchObserver for Recorder {
        fn on_event(&mut self, event: &BatchEvent<'_>) {
            match event {
                BatchEvent::JobRendered { .. } => self.rendered += 1,
                BatchEvent::CharacterSkipped { character, .. } => {
                    self.skipped.push(character.to_string())
                }
                _ => {}
            }
        }

        fn on_state(&mut self, state: DriverState) {
            self.states.push(state);
        }
    }

    #[test]
    fn test_observer_sees_states_and_events() {
        let catalog = archer();
        let mut host = host_for(&catalog);
        let mut recorder = Recorder::default();

        let options = BatchOptions::default().direction_count(2);
        BatchRenderDriver::new()
            .with_observer(&mut recorder)
            .run(&mut host, &catalog, &options)
            .unwrap();

        assert_eq!(recorder.rendered, 6);
        assert_eq!(recorder.states.first(), Some(&DriverState::SelectingCharacter));
        assert_eq!(recorder.states.last(), Some(&DriverState::Idle));
        assert!(recorder.states.contains(&DriverState::SelectingAnimation));
        assert!(recorder.states.contains(&DriverState::RenderingFrame));
    }
}

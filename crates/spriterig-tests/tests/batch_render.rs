//! End-to-end batch render tests against the in-memory scene host.
//!
//! These cover the driver's ordering, isolation, failure policy, and resume
//! behaviour, plus the recorded plans that Blender replays.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use spriterig_backend_blender::{
    build_rig, record_run, run_batch_render, BatchOptions, BatchRenderDriver, DriverState,
    InventoryObject, MemoryScene, RecordingScene, RenderPolicy, Resource, RigBuilder, RigError,
    SceneCommand, SceneInventory,
};
use spriterig_spec::{plan_jobs, AnimationSpec, Catalog, CharacterEntry};
use spriterig_tests::{
    archer_catalog, reference_project, rigged_scene, two_character_catalog, EventLog,
    LoggedEvent, ProjectFixture,
};

fn rel_paths(scene: &MemoryScene, root: &Path) -> Vec<String> {
    scene
        .renders()
        .iter()
        .map(|r| {
            r.path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn archer_walk_two_directions() {
    let catalog = archer_catalog();
    let mut scene = rigged_scene(&catalog);
    let options = BatchOptions::default()
        .direction_count(2)
        .output_root("renders")
        .file_extension("png");

    let report = run_batch_render(&mut scene, &catalog, &options).unwrap();

    assert_eq!(report.planned, 6);
    assert_eq!(report.rendered, 6);
    assert!(report.is_complete());
    assert_eq!(
        rel_paths(&scene, Path::new("renders")),
        vec![
            "archer/walk/00_0000.png",
            "archer/walk/00_0001.png",
            "archer/walk/00_0002.png",
            "archer/walk/01_0000.png",
            "archer/walk/01_0001.png",
            "archer/walk/01_0002.png",
        ]
    );

    let frames: Vec<u32> = scene.renders().iter().map(|r| r.frame).collect();
    assert_eq!(frames, vec![1, 2, 3, 1, 2, 3]);

    let yaws: Vec<f64> = scene
        .renders()
        .iter()
        .map(|r| r.camera_yaw.unwrap())
        .collect();
    for (yaw, expected) in yaws.iter().zip([0.0, 0.0, 0.0, 180.0, 180.0, 180.0]) {
        assert!((yaw - expected).abs() < 1e-9, "yaw {} != {}", yaw, expected);
    }
}

#[test]
fn driver_order_matches_plan() {
    let catalog = two_character_catalog();
    let mut scene = rigged_scene(&catalog);
    let options = BatchOptions::default().direction_count(2).output_root("out");

    run_batch_render(&mut scene, &catalog, &options).unwrap();

    let expected: Vec<String> = plan_jobs(&catalog, 2)
        .unwrap()
        .iter()
        .map(|j| j.output_path("png"))
        .collect();
    let actual = rel_paths(&scene, Path::new("out"));
    assert_eq!(actual, expected);

    assert_eq!(
        &actual[..8],
        &[
            "a/walk/00_0000.png",
            "a/walk/00_0001.png",
            "a/walk/01_0000.png",
            "a/walk/01_0001.png",
            "a/idle/00_0000.png",
            "a/idle/00_0001.png",
            "a/idle/01_0000.png",
            "a/idle/01_0001.png",
        ]
    );
    assert!(actual[8..].iter().all(|p| p.starts_with("b/")));
}

#[test]
fn only_the_current_character_is_visible() {
    let catalog = two_character_catalog();
    let mut scene = rigged_scene(&catalog);

    run_batch_render(&mut scene, &catalog, &BatchOptions::default().direction_count(1)).unwrap();

    for record in scene.renders() {
        let character = record
            .path
            .strip_prefix("renders")
            .unwrap()
            .iter()
            .next()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(record.visible_collections, vec![character]);
    }
}

#[test]
fn reference_project_job_count() {
    let project = reference_project();
    let catalog = project.catalog();
    let mut scene = rigged_scene(&catalog);

    let report = run_batch_render(&mut scene, &catalog, &BatchOptions::default()).unwrap();

    assert_eq!(report.direction_count, 8);
    assert_eq!(report.planned, (16 * 4 + 1 + 16) * 8);
    assert_eq!(report.rendered, report.planned);
    assert!(scene
        .renders()
        .iter()
        .any(|r| r.path == Path::new("renders/archer/dead/07_0015.png") && r.frame == 16));
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn missing_armature_skips_only_that_character() {
    let catalog = Catalog::new()
        .character(CharacterEntry::new("archer").animation(AnimationSpec::new("walk", 1, 2)))
        .character(CharacterEntry::new("enemy").animation(AnimationSpec::new("walk", 1, 2)));
    let mut scene = MemoryScene::new()
        .with_collection("archer")
        .with_collection("enemy")
        .with_armature("armature_archer")
        .unwrap()
        .with_action("walk");
    build_rig(&mut scene).unwrap();

    let mut log = EventLog::default();
    let report = BatchRenderDriver::new()
        .with_observer(&mut log)
        .run(&mut scene, &catalog, &BatchOptions::default().direction_count(2))
        .unwrap();

    assert_eq!(report.rendered, 4);
    assert_eq!(report.planned, 8);
    assert!(!report.is_complete());
    assert_eq!(report.skipped_characters.len(), 1);
    assert_eq!(report.skipped_characters[0].character, "enemy");
    assert!(scene
        .renders()
        .iter()
        .all(|r| r.path.starts_with("renders/archer")));
    assert!(log.events.contains(&LoggedEvent::CharacterSkipped {
        character: "enemy".to_string(),
        code: "RIG_002".to_string(),
    }));
}

#[test]
fn missing_action_skips_only_that_animation() {
    let catalog = Catalog::new().character(
        CharacterEntry::new("archer")
            .animation(AnimationSpec::new("walk", 1, 2))
            .animation(AnimationSpec::new("jump", 1, 2))
            .animation(AnimationSpec::new("idle", 1, 1)),
    );
    let mut scene = MemoryScene::new()
        .with_collection("archer")
        .with_armature("armature_archer")
        .unwrap()
        .with_action("walk")
        .with_action("idle");
    build_rig(&mut scene).unwrap();

    let report =
        run_batch_render(&mut scene, &catalog, &BatchOptions::default().direction_count(2))
            .unwrap();

    assert_eq!(report.rendered, 6);
    assert_eq!(report.skipped_animations.len(), 1);
    assert_eq!(report.skipped_animations[0].export_name, "jump");
    assert!(scene
        .renders()
        .iter()
        .all(|r| !r.path.starts_with("renders/archer/jump")));
    assert!(scene
        .renders()
        .iter()
        .any(|r| r.path.starts_with("renders/archer/idle")));
}

// ============================================================================
// Failure policy
// ============================================================================

#[test]
fn abort_stops_at_first_failure() {
    let catalog = archer_catalog();
    let mut scene =
        rigged_scene(&catalog).fail_render(PathBuf::from("renders/archer/walk/00_0001.png"), 1);
    let mut log = EventLog::default();

    let mut driver = BatchRenderDriver::new().with_observer(&mut log);
    let err = driver
        .run(&mut scene, &catalog, &BatchOptions::default().direction_count(2))
        .unwrap_err();
    assert_eq!(driver.state(), DriverState::Idle);
    drop(driver);

    assert!(matches!(err, RigError::CollaboratorFailure { .. }));
    assert_eq!(scene.renders().len(), 1);
    assert_eq!(log.failed_attempts(), 1);
    assert_eq!(log.states.last(), Some(&DriverState::Idle));
}

#[test]
fn continue_records_failures_and_finishes() {
    let catalog = archer_catalog();
    let mut scene =
        rigged_scene(&catalog).fail_render(PathBuf::from("renders/archer/walk/01_0002.png"), 5);

    let options = BatchOptions::default()
        .direction_count(2)
        .policy(RenderPolicy::isolate().with_retries(1));
    let report = run_batch_render(&mut scene, &catalog, &options).unwrap();

    assert_eq!(report.rendered, 5);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].attempts, 2);
    assert_eq!(
        report.failures[0].path,
        PathBuf::from("renders/archer/walk/01_0002.png")
    );
}

#[test]
fn retries_recover_transient_failures() {
    let catalog = archer_catalog();
    let mut scene =
        rigged_scene(&catalog).fail_render(PathBuf::from("renders/archer/walk/00_0000.png"), 2);

    let options = BatchOptions::default()
        .direction_count(2)
        .policy(RenderPolicy::strict().with_retries(2));
    let report = run_batch_render(&mut scene, &catalog, &options).unwrap();

    assert!(report.is_complete());
    assert!(report.failures.is_empty());
    assert_eq!(report.rendered, 6);
}

#[test]
fn pivot_is_required() {
    let catalog = archer_catalog();
    let mut scene = MemoryScene::from_catalog(&catalog).unwrap();

    let err = run_batch_render(&mut scene, &catalog, &BatchOptions::default()).unwrap_err();
    assert!(matches!(err, RigError::PreconditionViolation { .. }));
    assert!(scene.renders().is_empty());
}

#[test]
fn invalid_direction_counts_render_nothing() {
    let catalog = archer_catalog();
    for n in [0, -3] {
        let mut scene = rigged_scene(&catalog);
        let err = run_batch_render(&mut scene, &catalog, &BatchOptions::default().direction_count(n))
            .unwrap_err();
        assert!(matches!(err, RigError::InvalidArgument { .. }));
        assert!(scene.renders().is_empty());
    }
}

// ============================================================================
// Resume
// ============================================================================

#[test]
fn skip_existing_resumes_a_partial_run() {
    let fixture = ProjectFixture::reference();
    let root = fixture.path().join("renders");
    fixture.touch("renders/archer/walk/00_0000.png");
    fixture.touch("renders/archer/walk/00_0001.png");

    let catalog = archer_catalog();
    let mut scene = rigged_scene(&catalog);
    let mut log = EventLog::default();
    let options = BatchOptions::default()
        .direction_count(2)
        .output_root(&root)
        .skip_existing(true);

    let report = BatchRenderDriver::new()
        .with_observer(&mut log)
        .run(&mut scene, &catalog, &options)
        .unwrap();

    assert_eq!(report.skipped_existing, 2);
    assert_eq!(report.rendered, 4);
    assert!(report.is_complete());
    assert_eq!(
        rel_paths(&scene, &root)[0],
        "archer/walk/00_0002.png".to_string()
    );
    assert!(log
        .events
        .contains(&LoggedEvent::Skipped(root.join("archer/walk/00_0001.png"))));
}

// ============================================================================
// Recording
// ============================================================================

fn inventory() -> SceneInventory {
    SceneInventory {
        ok: true,
        error: None,
        objects: vec![
            InventoryObject::new("armature_a", "ARMATURE"),
            InventoryObject::new("armature_b", "ARMATURE"),
        ],
        collections: vec!["a".to_string(), "b".to_string()],
        actions: vec!["walk".to_string(), "idle".to_string()],
        file_extension: ".png".to_string(),
        has_world: true,
        frame_current: 1,
        duration_ms: None,
    }
}

#[test]
fn recorded_plan_matches_driver_order() {
    let catalog = two_character_catalog();
    let options = BatchOptions::default().direction_count(2).output_root("/out");

    let run = record_run(&inventory(), Some(&RigBuilder::default()), Some(&catalog), &options)
        .unwrap();

    let expected: Vec<PathBuf> = plan_jobs(&catalog, 2)
        .unwrap()
        .iter()
        .map(|j| Path::new("/out").join(j.output_path("png")))
        .collect();
    let actual: Vec<PathBuf> = run
        .plan
        .render_paths()
        .into_iter()
        .map(Path::to_path_buf)
        .collect();
    assert_eq!(actual, expected);
    assert_eq!(run.report.planned, expected.len() as u64);
}

#[test]
fn recorded_plan_sets_frame_before_each_render() {
    let catalog = two_character_catalog();
    let mut scene = RecordingScene::new(rigged_scene(&catalog));

    run_batch_render(&mut scene, &catalog, &BatchOptions::default().direction_count(1)).unwrap();

    let commands = scene.commands();
    for (i, command) in commands.iter().enumerate() {
        if matches!(command, SceneCommand::Render { .. }) {
            assert!(
                matches!(commands[i - 1], SceneCommand::SetFrame { .. }),
                "render at {} not preceded by set_frame",
                i
            );
        }
    }
    assert!(commands.iter().any(|c| matches!(
        c,
        SceneCommand::BindAction { armature, action } if armature == "armature_b" && action == "idle"
    )));
}

#[test]
fn recorded_plan_round_trips_through_json() {
    let run = record_run(
        &inventory(),
        Some(&RigBuilder::default()),
        Some(&archer_catalog_for_inventory()),
        &BatchOptions::default().direction_count(1),
    )
    .unwrap();

    let json = run.plan.to_json_pretty().unwrap();
    let parsed: spriterig_backend_blender::ScenePlan = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, run.plan);
}

fn archer_catalog_for_inventory() -> Catalog {
    Catalog::new().character(CharacterEntry::new("a").animation(AnimationSpec::new("walk", 1, 2)))
}

#[test]
fn missing_world_fails_before_mutation() {
    let mut inventory = inventory();
    inventory.has_world = false;

    let mut scene = RecordingScene::new(MemoryScene::from_inventory(&inventory).unwrap());
    let err = RigBuilder::default().build(&mut scene).unwrap_err();
    assert!(matches!(err, RigError::PreconditionViolation { .. }));
    assert!(scene.commands().is_empty());
    assert!(!err.is_not_found(Resource::Node));
}

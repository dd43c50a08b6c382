//! Property-based tests for direction sets, job planning, and output paths.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spriterig-tests --test direction_properties
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use spriterig_spec::{
    compute_output_path, generate_directions, plan_jobs, total_job_count, AnimationSpec, Catalog,
    CharacterEntry, CompassDirection,
};

// ============================================================================
// 1. Direction sets
// ============================================================================

proptest! {
    /// Every positive count yields n evenly spaced, strictly increasing angles from 0.
    #[test]
    fn directions_are_evenly_spaced(n in 1i64..=720) {
        let set = generate_directions(n).unwrap();
        let step = 360.0 / n as f64;

        prop_assert_eq!(set.len(), n as usize);
        prop_assert_eq!(set.angles()[0], 0.0);
        prop_assert!((set.angles()[set.len() - 1] - (n - 1) as f64 * step).abs() < 1e-9);
        for pair in set.angles().windows(2) {
            prop_assert!(pair[1] > pair[0]);
            prop_assert!((pair[1] - pair[0] - step).abs() < 1e-9);
        }
        prop_assert!(set.angles().iter().all(|a| *a < 360.0));
    }

    /// Non-positive counts are rejected.
    #[test]
    fn non_positive_counts_fail(n in i64::MIN..=0) {
        let err = generate_directions(n).unwrap_err();
        prop_assert!(err.is_invalid_argument());
    }

    /// Compass keys parse only inside 0..8.
    #[test]
    fn compass_keys_are_bounded(key in -50i64..50) {
        let parsed = key.to_string().parse::<CompassDirection>();
        if (0..8).contains(&key) {
            let direction = parsed.unwrap();
            prop_assert_eq!(direction.index() as i64, key);
            prop_assert_eq!(direction.yaw_degrees(), generate_directions(8).unwrap().angles()[key as usize]);
        } else {
            prop_assert!(parsed.is_err());
        }
    }
}

#[test]
fn zero_and_negative_three_fail() {
    assert!(generate_directions(0).unwrap_err().is_invalid_argument());
    assert!(generate_directions(-3).unwrap_err().is_invalid_argument());
}

#[test]
fn compass_labels_and_garbage() {
    assert_eq!("sw".parse::<CompassDirection>().unwrap(), CompassDirection::SW);
    assert_eq!("7".parse::<CompassDirection>().unwrap(), CompassDirection::SE);
    assert!("8".parse::<CompassDirection>().is_err());
    assert!("-1".parse::<CompassDirection>().is_err());
    assert!("x".parse::<CompassDirection>().is_err());
}

// ============================================================================
// 2. Output paths and job counts
// ============================================================================

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

/// Small random catalogs with unique character ids and export names.
fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::btree_map(
        identifier(),
        prop::collection::btree_map(identifier(), (1u32..20, 1u32..6), 0..4),
        1..4,
    )
    .prop_map(|characters| {
        characters
            .into_iter()
            .fold(Catalog::new(), |catalog, (id, animations)| {
                let entry = animations.into_iter().fold(
                    CharacterEntry::new(id),
                    |entry, (export, (start, count))| {
                        entry.animation(AnimationSpec::new(export, start, count))
                    },
                );
                catalog.character(entry)
            })
    })
}

proptest! {
    /// Distinct jobs never share an output path.
    #[test]
    fn output_paths_are_injective(catalog in catalog_strategy(), n in 1i64..12) {
        let jobs = plan_jobs(&catalog, n).unwrap();
        let paths: HashSet<String> = jobs.iter().map(|j| j.output_path("png")).collect();
        prop_assert_eq!(paths.len(), jobs.len());
    }

    /// The job count is the sum of frame counts times the direction count.
    #[test]
    fn job_count_matches_sum(catalog in catalog_strategy(), n in 1usize..12) {
        let expected: u64 = catalog
            .iter()
            .flat_map(|c| c.animations.iter())
            .map(|a| a.frame_count as u64 * n as u64)
            .sum();
        prop_assert_eq!(total_job_count(&catalog, n), expected);
        prop_assert_eq!(plan_jobs(&catalog, n as i64).unwrap().len() as u64, expected);
    }

    /// Paths differing in any one component differ.
    #[test]
    fn path_components_are_distinguishing(
        direction in 0usize..100,
        frame in 0u32..10_000,
        other_direction in 0usize..100,
        other_frame in 0u32..10_000,
    ) {
        let a = compute_output_path("archer", "walk", direction, frame, "png");
        let b = compute_output_path("archer", "walk", other_direction, other_frame, "png");
        prop_assert_eq!(a == b, direction == other_direction && frame == other_frame);
    }
}

#[test]
fn held_frame_export_shares_action() {
    let catalog = Catalog::new().character(
        CharacterEntry::new("archer")
            .animation(AnimationSpec::new("death", 1, 16))
            .animation(AnimationSpec::new("death", 16, 1).exported_as("dead")),
    );
    let jobs = plan_jobs(&catalog, 8).unwrap();
    assert_eq!(jobs.len(), 16 * 8 + 8);

    let dead: Vec<_> = jobs.iter().filter(|j| j.export_name == "dead").collect();
    assert!(dead.iter().all(|j| j.action == "death" && j.frame == 16));
    assert_eq!(dead[0].output_path("png"), "archer/dead/00_0015.png");
}

//! spriterig End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the render flows:
//!
//! - Planning: project -> ordered render jobs and output paths
//! - Driving: catalog -> render calls against an in-memory scene
//! - Recording: driver run -> replayable scene plan
//! - CLI: the `spriterig` binary end to end
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all tests that need no Blender
//! cargo test -p spriterig-tests
//!
//! # Run Blender replay tests
//! SPRITERIG_RUN_BLENDER_TESTS=1 cargo test -p spriterig-tests -- --ignored
//! ```

pub mod fixtures;
pub mod harness;

pub use fixtures::{
    archer_catalog, reference_project, rigged_scene, two_character_catalog, EventLog,
    LoggedEvent, ProjectFixture, REFERENCE_PROJECT_JSON,
};
pub use harness::{
    is_blender_available, list_outputs, png_dimensions, should_run_blender_tests, CliResult,
    TestHarness,
};

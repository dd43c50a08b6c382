//! CLI argument definitions for the spriterig command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{ArgAction, Parser, Subcommand};
use spriterig_spec::CompassDirection;

/// spriterig - Directional sprite rendering from Blender scenes
#[derive(Parser)]
#[command(name = "spriterig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the yaw angles of N evenly spaced directions
    Directions {
        /// Number of directions
        #[arg(short = 'n', long, default_value_t = 8, allow_hyphen_values = true)]
        count: i64,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a project file without rendering
    Validate {
        /// Path to the project file
        #[arg(short, long)]
        project: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List every render job and output path of a project
    Plan {
        /// Path to the project file
        #[arg(short, long)]
        project: String,

        /// Override the project's direction count
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        directions: Option<i64>,

        /// Override the project's file extension
        #[arg(long)]
        ext: Option<String>,

        /// Print at most this many jobs (the total is always printed)
        #[arg(long)]
        limit: Option<usize>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Build the directional rig (pivot, camera, light) into a .blend file
    Rig {
        /// Path to the .blend file
        #[arg(short, long)]
        blend: String,

        /// Project file supplying rig and render settings
        #[arg(short, long)]
        project: Option<String>,

        /// Skip the reference-scale boxes
        #[arg(long)]
        no_reference: bool,

        /// Replace an existing rig instead of failing
        #[arg(long)]
        replace: bool,

        /// Write the scene plan JSON to this path
        #[arg(long)]
        plan_out: Option<String>,

        /// Record the plan without launching Blender
        #[arg(long)]
        dry_run: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render every character, animation, direction, and frame of a project
    Render {
        /// Path to the project file
        #[arg(short, long)]
        project: String,

        /// Path to the .blend file (not needed with --dry-run)
        #[arg(short, long, required_unless_present = "dry_run")]
        blend: Option<String>,

        /// Override the project's direction count
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        directions: Option<i64>,

        /// Override the project's output root
        #[arg(short, long)]
        out_root: Option<String>,

        /// Build the rig before rendering
        #[arg(long)]
        build_rig: bool,

        /// Record render failures and keep going instead of aborting
        #[arg(long)]
        continue_on_error: bool,

        /// Extra attempts per failed frame
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Skip frames whose output file already exists
        #[arg(long)]
        skip_existing: bool,

        /// Save the .blend after rendering
        #[arg(long)]
        save: bool,

        /// Simulate the run in memory without launching Blender
        #[arg(long)]
        dry_run: bool,

        /// Write the scene plan JSON to this path
        #[arg(long)]
        plan_out: Option<String>,

        /// Write the run report JSON to this path
        #[arg(long)]
        report: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Point the rig at one of the eight compass directions and save
    Select {
        /// Path to the .blend file
        #[arg(short, long)]
        blend: String,

        /// Direction key ("0".."7") or label (S, SW, W, NW, N, NE, E, SE)
        #[arg(short, long, allow_hyphen_values = true)]
        direction: CompassDirection,

        /// Project file supplying the pivot name
        #[arg(short, long)]
        project: Option<String>,

        /// Record the plan without launching Blender
        #[arg(long)]
        dry_run: bool,
    },

    /// Check system dependencies and configuration
    Doctor,
}

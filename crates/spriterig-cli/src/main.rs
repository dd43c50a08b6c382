//! spriterig CLI - Directional sprite rendering from Blender scenes
//!
//! This binary provides commands for planning, validating, and rendering
//! directional sprite sheets from rigged Blender characters.

use clap::Parser;
use std::process::ExitCode;

mod cli_args;

use cli_args::{Cli, Commands};
use spriterig_cli::{commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Directions { count, json } => commands::directions::run(count, json),
        Commands::Validate { project, json } => commands::validate::run(&project, json),
        Commands::Plan {
            project,
            directions,
            ext,
            limit,
            json,
        } => commands::plan::run(&project, directions, ext.as_deref(), limit, json),
        Commands::Rig {
            blend,
            project,
            no_reference,
            replace,
            plan_out,
            dry_run,
            json,
        } => commands::rig::run(commands::rig::RigArgs {
            blend: &blend,
            project: project.as_deref(),
            reference: !no_reference,
            replace,
            plan_out: plan_out.as_deref(),
            dry_run,
            json,
        }),
        Commands::Render {
            project,
            blend,
            directions,
            out_root,
            build_rig,
            continue_on_error,
            retries,
            skip_existing,
            save,
            dry_run,
            plan_out,
            report,
            json,
        } => commands::render::run(commands::render::RenderArgs {
            project: &project,
            blend: blend.as_deref(),
            directions,
            out_root: out_root.as_deref(),
            build_rig,
            continue_on_error,
            retries,
            skip_existing,
            save,
            dry_run,
            plan_out: plan_out.as_deref(),
            report: report.as_deref(),
            verbose: cli.verbose > 0,
            json,
        }),
        Commands::Select {
            blend,
            direction,
            project,
            dry_run,
        } => commands::select::run(&blend, direction, project.as_deref(), dry_run),
        Commands::Doctor => commands::doctor::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

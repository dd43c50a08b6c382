//! spriterig CLI library.
//!
//! This crate provides the command implementations behind the `spriterig`
//! binary: project loading, logging setup, and one module per subcommand.

pub mod commands;
pub mod input;
pub mod logging;

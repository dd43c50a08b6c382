//! CLI command implementations

pub mod directions;
pub mod doctor;
pub mod plan;
pub mod render;
pub mod rig;
pub mod select;
pub mod validate;

mod reporting;

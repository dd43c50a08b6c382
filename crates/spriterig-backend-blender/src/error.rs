//! Error types for rig building, batch rendering, and the Blender host.

use spriterig_spec::{BackendError, SpecError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for backend operations.
pub type RigResult<T> = Result<T, RigError>;

/// Kind of scene resource a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Scene object (node).
    Node,
    /// Character armature object.
    Armature,
    /// Animation action.
    Action,
    /// Top-level collection.
    Collection,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Resource::Node => "node",
            Resource::Armature => "armature",
            Resource::Action => "action",
            Resource::Collection => "collection",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur in the backend.
#[derive(Debug, Error)]
pub enum RigError {
    /// An argument was outside its valid domain.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A named scene resource does not exist.
    #[error("{resource} '{name}' not found")]
    NotFound { resource: Resource, name: String },

    /// The scene is not in a state the operation requires.
    #[error("Precondition violated: {message}")]
    PreconditionViolation { message: String },

    /// The render collaborator failed.
    #[error("Render failed for {path}: {message}")]
    CollaboratorFailure { path: PathBuf, message: String },

    /// Blender executable not found.
    #[error("Blender executable not found. Ensure Blender is installed and in PATH, or set BLENDER_PATH environment variable")]
    BlenderNotFound,

    /// Failed to spawn Blender process.
    #[error("Failed to spawn Blender process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Blender process timed out.
    #[error("Blender process timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Blender process exited with non-zero status.
    #[error("Blender process exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Failed to write the plan file for Blender.
    #[error("Failed to write plan file: {0}")]
    WritePlanFailed(#[source] std::io::Error),

    /// Failed to read report from Blender.
    #[error("Failed to read Blender report from {path}: {source}")]
    ReadReportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse report JSON from Blender.
    #[error("Failed to parse Blender report: {0}")]
    ParseReportFailed(#[source] serde_json::Error),

    /// Blender reported an error.
    #[error("Blender host failed: {message}")]
    HostFailed { message: String },

    /// Python entrypoint script not found.
    #[error("Python entrypoint script not found at: {path}")]
    EntrypointNotFound { path: PathBuf },

    /// Failed to serialize a plan.
    #[error("Failed to serialize plan: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RigError {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(resource: Resource, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            name: name.into(),
        }
    }

    /// Creates a new precondition violation error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            message: message.into(),
        }
    }

    /// Creates a new render collaborator failure.
    pub fn collaborator_failure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CollaboratorFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new host failed error.
    pub fn host_failed(message: impl Into<String>) -> Self {
        Self::HostFailed {
            message: message.into(),
        }
    }

    /// Returns true if this error reports a missing resource of the given kind.
    pub fn is_not_found(&self, kind: Resource) -> bool {
        matches!(self, RigError::NotFound { resource, .. } if *resource == kind)
    }
}

impl From<SpecError> for RigError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::InvalidArgument { message } => RigError::InvalidArgument { message },
            SpecError::Io(e) => RigError::Io(e),
            other => RigError::invalid_argument(other.to_string()),
        }
    }
}

impl BackendError for RigError {
    fn code(&self) -> &'static str {
        match self {
            RigError::InvalidArgument { .. } => "RIG_001",
            RigError::NotFound { .. } => "RIG_002",
            RigError::PreconditionViolation { .. } => "RIG_003",
            RigError::CollaboratorFailure { .. } => "RIG_004",
            RigError::BlenderNotFound => "RIG_005",
            RigError::SpawnFailed(_) => "RIG_006",
            RigError::Timeout { .. } => "RIG_007",
            RigError::ProcessFailed { .. } => "RIG_008",
            RigError::WritePlanFailed(_) => "RIG_009",
            RigError::ReadReportFailed { .. } => "RIG_010",
            RigError::ParseReportFailed(_) => "RIG_011",
            RigError::HostFailed { .. } => "RIG_012",
            RigError::EntrypointNotFound { .. } => "RIG_013",
            RigError::SerializeFailed(_) => "RIG_014",
            RigError::Io(_) => "RIG_015",
        }
    }

    fn category(&self) -> &'static str {
        "rig"
    }
}

//! Error types for project validation and processing.

use thiserror::Error;

/// Error codes for project validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Contract errors (E001-E009)
    /// E001: Unsupported project_version
    UnsupportedProjectVersion,
    /// E002: Direction count must be at least 1
    InvalidDirectionCount,
    /// E003: No characters declared
    NoCharacters,
    /// E004: Invalid character id format
    InvalidCharacterId,
    /// E005: Duplicate character id
    DuplicateCharacterId,
    /// E006: Invalid file extension
    InvalidFileExtension,
    /// E007: Unsafe output root
    UnsafeOutputRoot,

    // Animation errors (E010-E016)
    /// E010: Invalid export name format
    InvalidExportName,
    /// E011: Duplicate export name within one character
    DuplicateExportName,
    /// E012: Empty source action name
    EmptyActionName,
    /// E013: Start frame must be 1-based
    InvalidStartFrame,
    /// E014: Frame count must be at least 1
    InvalidFrameCount,
    /// E015: Empty armature name override
    EmptyArmatureName,

    // Render settings errors (E020-E022)
    /// E020: Resolution must be non-zero
    InvalidResolution,
    /// E021: Ortho scale must be positive
    InvalidOrthoScale,
    /// E022: Compression must be within 0-100
    InvalidCompression,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedProjectVersion => "E001",
            ErrorCode::InvalidDirectionCount => "E002",
            ErrorCode::NoCharacters => "E003",
            ErrorCode::InvalidCharacterId => "E004",
            ErrorCode::DuplicateCharacterId => "E005",
            ErrorCode::InvalidFileExtension => "E006",
            ErrorCode::UnsafeOutputRoot => "E007",
            ErrorCode::InvalidExportName => "E010",
            ErrorCode::DuplicateExportName => "E011",
            ErrorCode::EmptyActionName => "E012",
            ErrorCode::InvalidStartFrame => "E013",
            ErrorCode::InvalidFrameCount => "E014",
            ErrorCode::EmptyArmatureName => "E015",
            ErrorCode::InvalidResolution => "E020",
            ErrorCode::InvalidOrthoScale => "E021",
            ErrorCode::InvalidCompression => "E022",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for project validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Character declares no animations
    NoAnimations,
    /// W002: Direction count exceeds the two-digit filename width
    WideDirectionIndex,
    /// W003: Frame index exceeds the four-digit filename width
    WideFrameIndex,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::NoAnimations => "W001",
            WarningCode::WideDirectionIndex => "W002",
            WarningCode::WideFrameIndex => "W003",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// JSON path to the problematic field (e.g., "characters\[0\].id").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a JSON path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// JSON path to the problematic field.
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning with a JSON path.
    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Top-level error type for project operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// An argument was outside its valid domain.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Project validation failed with one or more errors.
    #[error("project validation failed with {0} error(s)")]
    ValidationFailed(usize),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpecError {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns true if this is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SpecError::InvalidArgument { .. })
    }
}

/// Result of project validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.ok = false;
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Returns true if any error carries the given code.
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        if self.ok {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

/// Common trait for backend errors.
///
/// Gives every backend error a stable code and a category so the CLI and
/// reports can surface failures uniformly.
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting (e.g. "RIG_004").
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    fn category(&self) -> &'static str;
}

//! Blender subprocess orchestrator.
//!
//! This module handles spawning Blender in background mode on a `.blend`
//! file and exchanging JSON files with the Python entrypoint: an inventory
//! report on the way in, a scene plan and a replay report on the way out.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RigError, RigResult};
use crate::inventory::SceneInventory;
use crate::recording::ScenePlan;

const EMBEDDED_ENTRYPOINT_PY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../blender/entrypoint.py"
));

/// Default timeout for Blender execution (1 hour; batch renders are long).
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Environment variable naming an entrypoint script to use instead of the embedded one.
pub const ENTRYPOINT_ENV: &str = "SPRITERIG_BLENDER_ENTRYPOINT";

/// Mode of the Blender entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Report objects, collections, and actions of the `.blend`.
    Inventory,
    /// Execute a scene plan.
    Replay,
}

impl HostMode {
    /// Returns the string identifier for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostMode::Inventory => "inventory",
            HostMode::Replay => "replay",
        }
    }
}

/// A render the host could not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Report written by the entrypoint after replaying a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of frames written.
    #[serde(default)]
    pub rendered: u64,
    #[serde(default)]
    pub failed: Vec<ReplayFailure>,
    /// Whether the `.blend` was saved.
    #[serde(default)]
    pub saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Configuration for the Blender orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Path to the Blender executable.
    pub blender_path: Option<PathBuf>,
    /// Path to the Python entrypoint script.
    pub entrypoint_path: PathBuf,
    /// Timeout for Blender execution.
    pub timeout: Duration,
    /// Whether to capture Blender's stderr.
    pub capture_output: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            blender_path: None,
            entrypoint_path: PathBuf::from("blender/entrypoint.py"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a new config with the given entrypoint path.
    pub fn with_entrypoint(entrypoint_path: impl Into<PathBuf>) -> Self {
        Self {
            entrypoint_path: entrypoint_path.into(),
            ..Default::default()
        }
    }

    /// Sets the Blender executable path.
    pub fn blender_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blender_path = Some(path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// The Blender subprocess orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

struct ResolvedEntrypoint {
    path: PathBuf,
    _tempfile: Option<tempfile::NamedTempFile>,
}

impl Orchestrator {
    /// Creates a new orchestrator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Finds the Blender executable path.
    pub fn find_blender(&self) -> RigResult<PathBuf> {
        if let Some(ref path) = self.config.blender_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        if let Ok(path) = std::env::var("BLENDER_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let blender_names = if cfg!(windows) {
            vec!["blender.exe", "blender"]
        } else {
            vec!["blender"]
        };

        for name in blender_names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths = if cfg!(windows) {
            vec![
                "C:\\Program Files\\Blender Foundation\\Blender 4.2\\blender.exe",
                "C:\\Program Files\\Blender Foundation\\Blender 4.1\\blender.exe",
                "C:\\Program Files\\Blender Foundation\\Blender\\blender.exe",
            ]
        } else if cfg!(target_os = "macos") {
            vec![
                "/Applications/Blender.app/Contents/MacOS/Blender",
                "/Applications/Blender.app/Contents/MacOS/blender",
            ]
        } else {
            vec![
                "/usr/bin/blender",
                "/usr/local/bin/blender",
                "/snap/bin/blender",
            ]
        };

        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(RigError::BlenderNotFound)
    }

    fn resolve_entrypoint(&self) -> RigResult<ResolvedEntrypoint> {
        if self.config.entrypoint_path.exists() {
            return Ok(ResolvedEntrypoint {
                path: self.config.entrypoint_path.clone(),
                _tempfile: None,
            });
        }

        if let Ok(path) = std::env::var(ENTRYPOINT_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(ResolvedEntrypoint {
                    path,
                    _tempfile: None,
                });
            }
            return Err(RigError::EntrypointNotFound { path });
        }

        let mut file = tempfile::Builder::new()
            .prefix("spriterig_blender_entrypoint_")
            .suffix(".py")
            .tempfile()?;
        file.write_all(EMBEDDED_ENTRYPOINT_PY.as_bytes())?;
        file.flush()?;

        Ok(ResolvedEntrypoint {
            path: file.path().to_path_buf(),
            _tempfile: Some(file),
        })
    }

    /// Runs Blender on a `.blend` file in the given mode.
    ///
    /// # Arguments
    ///
    /// * `mode` - Entrypoint mode
    /// * `blend` - The `.blend` file to open
    /// * `plan_path` - Plan JSON, for replay
    /// * `report_path` - Path where Blender should write its report JSON
    ///
    /// Returns the raw report contents.
    pub fn run(
        &self,
        mode: HostMode,
        blend: &Path,
        plan_path: Option<&Path>,
        report_path: &Path,
    ) -> RigResult<String> {
        let blender_path = self.find_blender()?;
        let entrypoint = self.resolve_entrypoint()?;

        // blender --background <blend> --python entrypoint.py -- --mode <mode> --report <path> [--plan <path>]
        let mut cmd = Command::new(&blender_path);
        cmd.arg("--background")
            .arg(blend)
            .arg("--python")
            .arg(&entrypoint.path)
            .arg("--")
            .arg("--mode")
            .arg(mode.as_str())
            .arg("--report")
            .arg(report_path);
        if let Some(plan) = plan_path {
            cmd.arg("--plan").arg(plan);
        }

        if self.config.capture_output {
            // stdout stays unpiped; Blender prints a line per render and a full pipe would block it.
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        debug!(blender = %blender_path.display(), mode = mode.as_str(), "Spawning Blender");
        let child = cmd.spawn().map_err(RigError::SpawnFailed)?;

        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(RigError::process_failed(exit_code, stderr));
        }

        std::fs::read_to_string(report_path).map_err(|e| RigError::ReadReportFailed {
            path: report_path.to_path_buf(),
            source: e,
        })
    }

    /// Lists what a `.blend` file contains.
    pub fn inventory(&self, blend: &Path) -> RigResult<SceneInventory> {
        let temp_dir = tempfile::tempdir()?;
        let report_path = temp_dir.path().join("inventory.json");

        let content = self.run(HostMode::Inventory, blend, None, &report_path)?;
        let inventory: SceneInventory = parse_report(&content)?;
        if !inventory.ok {
            return Err(RigError::host_failed(
                inventory
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        info!(
            objects = inventory.objects.len(),
            collections = inventory.collections.len(),
            actions = inventory.actions.len(),
            "Read scene inventory"
        );
        Ok(inventory)
    }

    /// Replays a plan inside Blender.
    ///
    /// A report with `ok == false` (an aborted replay) becomes
    /// [`RigError::HostFailed`]. Failures recorded under the continue policy
    /// are returned in the report.
    pub fn replay(&self, blend: &Path, plan: &ScenePlan) -> RigResult<ReplayReport> {
        let temp_dir = tempfile::tempdir()?;
        let plan_path = temp_dir.path().join("plan.json");
        let report_path = temp_dir.path().join("replay.json");

        let plan_json = serde_json::to_string(plan).map_err(RigError::SerializeFailed)?;
        std::fs::write(&plan_path, plan_json).map_err(RigError::WritePlanFailed)?;

        let content = self.run(HostMode::Replay, blend, Some(&plan_path), &report_path)?;
        let report: ReplayReport = parse_report(&content)?;
        if !report.ok {
            return Err(RigError::host_failed(
                report.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        info!(
            rendered = report.rendered,
            failed = report.failed.len(),
            "Replayed scene plan"
        );
        Ok(report)
    }
}

fn parse_report<T: DeserializeOwned>(content: &str) -> RigResult<T> {
    serde_json::from_str(content).map_err(RigError::ParseReportFailed)
}

/// Waits for the child, killing it after `timeout`.
///
/// Stderr is drained on a separate thread while waiting so a chatty child
/// never blocks on a full pipe.
fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> RigResult<(ExitStatus, String)> {
    let start = Instant::now();

    let stderr_reader = child
        .stderr
        .take()
        .filter(|_| capture_output)
        .map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = err.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    // The reader is detached; a surviving grandchild may still hold the pipe.
                    return Err(RigError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(RigError::SpawnFailed(e)),
        }
    };

    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    Ok((status, stderr))
}

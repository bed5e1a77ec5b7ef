//! Command line, persistent settings and resource directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use engine_net::connection::{DEFAULT_NATS_URL, NATS_URL_ENV};
use engine_scene::RequirePolicy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::EngineError;

/// Config key naming the scene a standalone run starts with.
pub const STARTUP_SCENE_KEY: &str = "startup_scene";
pub const DEFAULT_STARTUP_SCENE: &str = "main.scene";

/// How the engine is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Attached to an external editor over NATS. Frames wait for a scene.
    Editor,
    /// Loads the startup scene and plays it.
    Standalone,
}

#[derive(Debug, Parser)]
#[command(name = "engine_app", about = "2D arena engine core")]
pub struct Cli {
    #[arg(short, long, value_enum, default_value = "standalone")]
    pub mode: Mode,

    /// Resource root holding `scenes/`, `variants/` and `temp/`
    #[arg(short, long, default_value = "resources")]
    pub resources: PathBuf,

    /// Settings file; defaults to `config.json` in the resource root
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// NATS server URL
    #[arg(long, env = NATS_URL_ENV, default_value = DEFAULT_NATS_URL)]
    pub nats_url: String,

    /// Target frames per second
    #[arg(long, default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Stop after this many frames (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_frames: u64,

    /// Interval between full scene snapshots sent to the editor
    #[arg(long, default_value_t = 100)]
    pub sync_interval_ms: u64,

    /// Keep loading entities whose required components are missing
    #[arg(long)]
    pub advisory_requires: bool,
}

impl Cli {
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.resources.join("config.json"))
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            mode: self.mode,
            sync_interval: Duration::from_millis(self.sync_interval_ms),
            require_policy: if self.advisory_requires {
                RequirePolicy::Advisory
            } else {
                RequirePolicy::Enforce
            },
            mirror_backup: true,
        }
    }
}

/// Engine behavior settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub mode: Mode,
    /// Accumulated frame time between editor snapshots.
    pub sync_interval: Duration,
    pub require_policy: RequirePolicy,
    /// Also write the play-mode recovery snapshot to `temp/backup.scene`.
    pub mirror_backup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Standalone,
            sync_interval: Duration::from_millis(100),
            require_policy: RequirePolicy::Enforce,
            mirror_backup: false,
        }
    }
}

/// A persistent key-value store backed by one JSON object file.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Load the store at `path`. A missing file yields an empty store that
    /// will be created on [`ConfigStore::save`].
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] if the file exists but cannot be read,
    /// [`EngineError::Config`] if it is not a JSON object.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| EngineError::Config {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Map::new()
            }
            Err(e) => return Err(EngineError::io(path, e)),
        };
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Typed lookup. A missing key or a value of the wrong shape yields
    /// `default`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.values.get(key) else {
            return default;
        };
        match serde_json::from_value(value.clone()) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "ignoring config value of the wrong type");
                default
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the value cannot be encoded.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), EngineError> {
        let value = serde_json::to_value(value).map_err(|source| EngineError::Config {
            path: self.path.clone().unwrap_or_default(),
            source,
        })?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Write the store back to its file. A no-op for a default store.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<(), EngineError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&self.values).map_err(|source| EngineError::Config {
            path: path.clone(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        fs::write(path, text).map_err(|e| EngineError::io(path, e))
    }

    /// The scene a standalone run starts with.
    #[must_use]
    pub fn startup_scene(&self) -> String {
        self.get_or(STARTUP_SCENE_KEY, DEFAULT_STARTUP_SCENE.to_string())
    }
}

/// Maps logical resource names to directories below a root.
#[derive(Debug, Clone)]
pub struct ResourceDirs {
    root: PathBuf,
}

impl ResourceDirs {
    pub const SCENES: &'static str = "scenes";
    pub const VARIANTS: &'static str = "variants";
    pub const TEMP: &'static str = "temp";

    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the named subdirectory, created if missing.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] if the directory cannot be created.
    pub fn dir(&self, name: &str) -> Result<PathBuf, EngineError> {
        let path = self.root.join(name);
        fs::create_dir_all(&path).map_err(|e| EngineError::io(&path, e))?;
        Ok(path)
    }

    /// # Errors
    ///
    /// See [`ResourceDirs::dir`].
    pub fn scenes(&self) -> Result<PathBuf, EngineError> {
        self.dir(Self::SCENES)
    }

    /// # Errors
    ///
    /// See [`ResourceDirs::dir`].
    pub fn variants(&self) -> Result<PathBuf, EngineError> {
        self.dir(Self::VARIANTS)
    }

    /// # Errors
    ///
    /// See [`ResourceDirs::dir`].
    pub fn temp(&self) -> Result<PathBuf, EngineError> {
        self.dir(Self::TEMP)
    }
}

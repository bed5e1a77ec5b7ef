//! The engine context: world, scheduler, state machine and editor link.
//!
//! One frame drains the editor queue, runs the lifecycle passes, renders and
//! then, when an editor is attached, pushes a scene snapshot if one is due.

use std::fs;
use std::path::PathBuf;

use engine_component::{Registry, World};
use engine_net::{EditorChannel, NetError};
use engine_scene::{
    LoadReport, RequirePolicy, SaveOutcome, SceneDocument, deserialize_scene, load_scene, load_scene_file,
    serialize_scene, write_templates,
};
use tracing::{debug, error, info, warn};

use crate::config::{EngineConfig, ResourceDirs};
use crate::error::EngineError;
use crate::render::{HeadlessRenderer, Renderer};
use crate::scheduler::Scheduler;
use crate::state::EngineState;

/// File name of the on-disk copy of the play-mode recovery snapshot.
pub const BACKUP_SCENE: &str = "backup.scene";

pub struct Engine {
    pub(crate) world: World,
    pub(crate) scheduler: Scheduler,
    pub(crate) state: EngineState,
    pub(crate) config: EngineConfig,
    pub(crate) dirs: ResourceDirs,
    pub(crate) editor: Option<EditorChannel>,
    renderer: Box<dyn Renderer>,
    /// Snapshot taken on play-mode entry, consumed on exit.
    recovery: Option<SceneDocument>,
    pub(crate) scene_ready: bool,
    initial_sync_done: bool,
    since_sync: f32,
    frame: u64,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig, registry: Registry, dirs: ResourceDirs) -> Self {
        Self {
            world: World::new(registry),
            scheduler: Scheduler::new(),
            state: EngineState::Edit,
            config,
            dirs,
            editor: None,
            renderer: Box::new(HeadlessRenderer::new()),
            recovery: None,
            scene_ready: false,
            initial_sync_done: false,
            since_sync: 0.0,
            frame: 0,
        }
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Attach the editor channel. Frames run no passes until the editor has
    /// loaded a scene.
    pub fn attach_editor(&mut self, channel: EditorChannel) {
        info!(session = channel.session(), "editor attached");
        self.editor = Some(channel);
        self.scene_ready = false;
        self.initial_sync_done = false;
        self.since_sync = 0.0;
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn scene_ready(&self) -> bool {
        self.scene_ready
    }

    #[must_use]
    pub fn has_recovery_snapshot(&self) -> bool {
        self.recovery.is_some()
    }

    /// Frames that ran their lifecycle passes.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn should_exit(&self) -> bool {
        self.state == EngineState::ShuttingDown
    }

    // ── Startup ────────────────────────────────────────────────────────────

    /// Regenerate the editor's component templates.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] or [`EngineError::Scene`] if the directory cannot
    /// be prepared or written.
    pub fn write_templates(&self) -> Result<usize, EngineError> {
        let dir = self.dirs.variants()?;
        Ok(write_templates(dir, &self.world.registry)?)
    }

    /// Load `scenes/<name>` and start playing it. On failure the engine
    /// requests shutdown.
    ///
    /// # Errors
    ///
    /// Whatever prevented the scene from loading.
    pub fn start_standalone(&mut self, name: &str) -> Result<LoadReport, EngineError> {
        let result = self
            .dirs
            .scenes()
            .and_then(|dir| Ok(load_scene_file(&mut self.world, dir.join(name), self.config.require_policy)?));
        match result {
            Ok(report) => {
                self.scheduler.reset_play_flags();
                self.scene_ready = true;
                self.enter_play_mode(false);
                Ok(report)
            }
            Err(e) => {
                error!(scene = name, error = %e, "failed to load startup scene");
                self.state = EngineState::ShuttingDown;
                Err(e)
            }
        }
    }

    // ── Frame ──────────────────────────────────────────────────────────────

    /// Run one frame.
    pub fn run_frame(&mut self, dt: f32) {
        self.process_editor_messages();
        if self.should_exit() {
            return;
        }
        if self.editor.is_some() && !self.scene_ready {
            debug!("waiting for the editor to load a scene");
            return;
        }

        self.scheduler
            .run_frame(&mut self.world, self.state.runs_play_passes(), dt);
        self.renderer.render(&self.world);
        self.frame += 1;
        self.sync_editor(dt);
    }

    /// Push a scene snapshot to the editor if one is due. The first one goes
    /// out on the first frame after a scene is ready.
    fn sync_editor(&mut self, dt: f32) {
        let Some(channel) = &self.editor else {
            return;
        };
        if self.initial_sync_done {
            self.since_sync += dt;
            if self.since_sync < self.config.sync_interval.as_secs_f32() {
                return;
            }
        }
        self.since_sync = 0.0;
        self.initial_sync_done = true;

        let scene = match serde_json::to_value(serialize_scene(&self.world)) {
            Ok(scene) => scene,
            Err(e) => {
                error!(error = %e, "failed to encode scene snapshot");
                return;
            }
        };
        match channel.sync_scene(scene) {
            Ok(()) => {}
            Err(NetError::ChannelClosed) => {
                warn!("editor channel closed, detaching");
                self.editor = None;
            }
            Err(e) => error!(error = %e, "failed to send scene snapshot"),
        }
    }

    // ── Scenes ─────────────────────────────────────────────────────────────

    /// Replace the world with the scene in `text`.
    ///
    /// # Errors
    ///
    /// See [`deserialize_scene`].
    pub fn load_scene(&mut self, text: &str) -> Result<LoadReport, EngineError> {
        let report = deserialize_scene(&mut self.world, text, self.config.require_policy)?;
        self.scheduler.reset_play_flags();
        self.scene_ready = true;
        Ok(report)
    }

    /// Write the live scene to `scenes/<name>.scene`.
    ///
    /// # Errors
    ///
    /// Directory, encoding and write failures.
    pub fn export_scene(&self, name: &str) -> Result<SaveOutcome, EngineError> {
        let text = engine_scene::scene_to_string_pretty(&self.world)?;
        let dir = self.dirs.scenes()?;
        Ok(engine_scene::export_scene(dir, name, &text)?)
    }

    // ── Play mode ──────────────────────────────────────────────────────────

    /// Sweep tombstones, snapshot the scene and enter play mode. A no-op
    /// while already playing or shutting down.
    pub fn enter_play_mode(&mut self, paused: bool) {
        if self.state != EngineState::Edit {
            debug!(state = %self.state, "enter play mode ignored");
            return;
        }

        let swept = self.world.sweep_dead();
        let snapshot = serialize_scene(&self.world);
        if self.config.mirror_backup {
            self.mirror_backup(&snapshot);
        }
        self.recovery = Some(snapshot);
        self.scheduler.reset_play_flags();
        self.state = if paused {
            EngineState::PlayPaused
        } else {
            EngineState::PlayRunning
        };
        info!(paused, swept, "entered play mode");
    }

    /// Discard the played world and restore the snapshot taken on entry.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoRecoveryBuffer`] if no snapshot exists; scene errors
    /// if the snapshot fails to load.
    pub fn exit_play_mode(&mut self) -> Result<(), EngineError> {
        self.scheduler.reset_play_flags();
        if self.state.in_play_mode() {
            self.state = EngineState::Edit;
        }
        let Some(snapshot) = self.recovery.take() else {
            error!("exit play mode requested without a recovery snapshot");
            return Err(EngineError::NoRecoveryBuffer);
        };

        // The snapshot holds whatever the editor built, unmet requirements included.
        let report = load_scene(&mut self.world, snapshot, RequirePolicy::Advisory)?;
        self.world.sweep_dead();
        self.remove_backup();
        info!(entities = report.loaded.len(), "exited play mode");
        Ok(())
    }

    pub fn pause(&mut self) {
        match self.state {
            EngineState::PlayRunning => {
                self.state = EngineState::PlayPaused;
                info!("play mode paused");
            }
            state => debug!(%state, "pause ignored"),
        }
    }

    pub fn unpause(&mut self) {
        match self.state {
            EngineState::PlayPaused => {
                self.state = EngineState::PlayRunning;
                info!("play mode resumed");
            }
            state => debug!(%state, "unpause ignored"),
        }
    }

    /// Stop the frame loop after the current frame.
    pub fn request_shutdown(&mut self) {
        info!("shutdown requested");
        self.state = EngineState::ShuttingDown;
    }

    /// Leave play mode if needed and empty the world.
    pub fn shutdown(&mut self) {
        if self.state.in_play_mode()
            && let Err(e) = self.exit_play_mode()
        {
            error!(error = %e, "failed to restore scene on shutdown");
        }
        self.world.clear();
        self.editor = None;
        self.state = EngineState::ShuttingDown;
        info!(frames = self.frame, "engine shut down");
    }

    fn backup_path(&self) -> Result<PathBuf, EngineError> {
        Ok(self.dirs.temp()?.join(BACKUP_SCENE))
    }

    fn mirror_backup(&self, snapshot: &SceneDocument) {
        let result = self.backup_path().and_then(|path| {
            let text = serde_json::to_string_pretty(snapshot).map_err(engine_scene::SceneError::from)?;
            fs::write(&path, text).map_err(|e| EngineError::io(&path, e))
        });
        if let Err(e) = result {
            warn!(error = %e, "failed to mirror recovery snapshot");
        }
    }

    fn remove_backup(&self) {
        let Ok(path) = self.backup_path() else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed recovery file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove recovery file"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use engine_defaults::{Position, Velocity, default_registry};
    use engine_net::EditorMessage;
    use engine_scene::serialize_scene;

    use super::*;

    pub(crate) fn test_engine(dir: &Path) -> Engine {
        Engine::new(EngineConfig::default(), default_registry(), ResourceDirs::new(dir))
    }

    fn moving_entity(engine: &mut Engine) -> engine_component::Entity {
        let world = engine.world_mut();
        let e = world.spawn();
        world.add(e, Position::new(0.0, 0.0)).unwrap();
        world.add(e, Velocity { x: 10.0, y: 0.0 }).unwrap();
        e
    }

    #[test]
    fn test_play_round_trip_restores_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        let e = moving_entity(&mut engine);
        engine.run_frame(0.1);
        let before = serialize_scene(engine.world());

        engine.enter_play_mode(false);
        assert_eq!(engine.state(), EngineState::PlayRunning);
        for _ in 0..5 {
            engine.run_frame(0.1);
        }
        assert!(engine.world().storage.get::<Position>(e).unwrap().x > 4.0);

        engine.exit_play_mode().unwrap();
        assert_eq!(engine.state(), EngineState::Edit);
        assert_eq!(serialize_scene(engine.world()), before);
        assert!(!engine.has_recovery_snapshot());
    }

    #[test]
    fn test_play_round_trip_keeps_unmet_requirements() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        let partial = engine.world_mut().spawn();
        engine.world_mut().add(partial, Position::new(1.0, 2.0)).unwrap();
        engine.world_mut().add_by_name(partial, "Collider").unwrap();
        moving_entity(&mut engine);
        let before = serialize_scene(engine.world());

        engine.enter_play_mode(true);
        engine.exit_play_mode().unwrap();

        assert_eq!(serialize_scene(engine.world()), before);
        assert!(engine.world().storage.has_kind(partial, "Collider"));
    }

    #[test]
    fn test_play_round_trip_of_lone_unmet_requirement() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        let e = engine.world_mut().spawn();
        engine.world_mut().add_by_name(e, "Collider").unwrap();

        engine.enter_play_mode(false);
        engine.run_frame(0.1);
        engine.exit_play_mode().unwrap();

        assert_eq!(engine.world().storage.entity_count(), 1);
        assert!(engine.world().storage.has_kind(e, "Collider"));
    }

    #[test]
    fn test_removing_required_kind_survives_play_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        let e = engine.world_mut().spawn();
        engine.world_mut().add_by_name(e, "Scale").unwrap();
        engine.world_mut().add_by_name(e, "Collider").unwrap();
        engine.handle_message(EditorMessage::VariantRemoved {
            entity_id: e,
            variant_type: "Scale".to_string(),
        });
        let before = serialize_scene(engine.world());

        engine.enter_play_mode(false);
        engine.exit_play_mode().unwrap();

        assert_eq!(serialize_scene(engine.world()), before);
        assert!(engine.world().storage.has_kind(e, "Collider"));
        assert!(!engine.world().storage.has_kind(e, "Scale"));
    }

    #[test]
    fn test_exit_without_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        assert!(matches!(engine.exit_play_mode(), Err(EngineError::NoRecoveryBuffer)));
        assert_eq!(engine.state(), EngineState::Edit);
    }

    #[test]
    fn test_enter_twice_keeps_first_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        let e = moving_entity(&mut engine);
        engine.enter_play_mode(false);
        engine.run_frame(0.5);
        engine.enter_play_mode(false);
        engine.exit_play_mode().unwrap();
        assert_eq!(engine.world().storage.get::<Position>(e).unwrap().x, 0.0);
    }

    #[test]
    fn test_pause_suspends_play_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        let e = moving_entity(&mut engine);
        engine.enter_play_mode(true);
        engine.run_frame(1.0);
        assert_eq!(engine.world().storage.get::<Position>(e).unwrap().x, 0.0);
        assert!(!engine.scheduler().started());

        engine.unpause();
        engine.run_frame(1.0);
        assert_eq!(engine.world().storage.get::<Position>(e).unwrap().x, 10.0);
        assert!(engine.scheduler().started());

        engine.pause();
        engine.run_frame(1.0);
        assert_eq!(engine.world().storage.get::<Position>(e).unwrap().x, 10.0);
    }

    #[test]
    fn test_enter_sweeps_tombstones_and_mirrors_backup() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            mirror_backup: true,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config, default_registry(), ResourceDirs::new(dir.path()));
        let e = moving_entity(&mut engine);
        engine.world_mut().remove_component(e, "Velocity");
        assert_eq!(engine.world().storage.dead_count(), 1);

        engine.enter_play_mode(false);
        assert_eq!(engine.world().storage.dead_count(), 0);
        let backup = dir.path().join("temp").join(BACKUP_SCENE);
        assert!(backup.is_file());

        engine.exit_play_mode().unwrap();
        assert!(!backup.exists());
    }

    #[test]
    fn test_standalone_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        assert!(engine.start_standalone("main.scene").is_err());
        assert!(engine.should_exit());

        let scenes = dir.path().join("scenes");
        fs::create_dir_all(&scenes).unwrap();
        fs::write(
            scenes.join("main.scene"),
            r#"{"type":"scene","entities":[{"id":1,"components":[{"type":"Position","inputs":{}}]}]}"#,
        )
        .unwrap();
        let mut engine = test_engine(dir.path());
        let report = engine.start_standalone("main.scene").unwrap();
        assert_eq!(report.loaded.len(), 1);
        assert_eq!(engine.state(), EngineState::PlayRunning);
        assert!(engine.scene_ready());
    }

    #[test]
    fn test_shutdown_restores_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = test_engine(dir.path());
        moving_entity(&mut engine);
        engine.enter_play_mode(false);
        engine.shutdown();
        assert!(engine.should_exit());
        assert!(!engine.has_recovery_snapshot());
        assert_eq!(engine.world().storage.entity_count(), 0);

        engine.run_frame(0.1);
        assert_eq!(engine.frame(), 0);
    }

    #[test]
    fn test_templates_written_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        let engine = test_engine(dir.path());
        assert_eq!(engine.write_templates().unwrap(), engine.world().registry.len());
        assert!(dir.path().join("variants/Collider.variant").is_file());
    }
}

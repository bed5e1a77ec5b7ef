//! # engine_app
//!
//! Runs the engine core. In standalone mode the startup scene is loaded from
//! `scenes/` and played. In editor mode the engine waits for the editor to
//! send a scene over NATS and streams snapshots back.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line and read the settings file.
//! 2. Register the default component kinds.
//! 3. Editor mode: write component templates, connect to NATS and start the
//!    bridge task. Standalone mode: load the startup scene.
//! 4. Run the fixed-timestep frame loop on a blocking thread.

mod config;
mod editor;
mod engine;
mod error;
mod render;
mod scheduler;
mod state;
mod tick;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{Cli, ConfigStore, Mode, ResourceDirs};
use engine::Engine;
use engine_defaults::default_registry;
use engine_net::{EditorChannel, NatsConnection, run_bridge};
use tick::{TickConfig, TickLoop};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!(mode = ?cli.mode, resources = %cli.resources.display(), "engine starting");

    let store = ConfigStore::load(cli.config_path())?;
    let dirs = ResourceDirs::new(&cli.resources);
    let mut engine = Engine::new(cli.engine_config(), default_registry(), dirs);

    match cli.mode {
        Mode::Editor => {
            if let Err(e) = engine.write_templates() {
                error!(error = %e, "failed to write component templates");
            }
            let connection = NatsConnection::connect_to(&cli.nats_url).await?;
            let (channel, endpoint) = EditorChannel::in_process();
            engine.attach_editor(channel);
            tokio::spawn(async move {
                if let Err(e) = run_bridge(connection, endpoint).await {
                    error!(error = %e, "editor bridge failed");
                }
            });
        }
        Mode::Standalone => {
            let scene = store.startup_scene();
            if let Err(e) = engine.start_standalone(&scene) {
                error!(scene, error = %e, "cannot start without a scene");
            }
        }
    }

    let tick_config = TickConfig {
        frame_rate: cli.frame_rate,
        max_frames: cli.max_frames,
    };
    let engine = tokio::task::spawn_blocking(move || {
        let mut tick_loop = TickLoop::new(tick_config);
        tick_loop.run(&mut engine);
        engine.shutdown();
        engine
    })
    .await?;

    info!(frames = engine.frame(), "engine stopped");
    Ok(())
}

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use ultraviolet::Vec2;

use gso_sim::bodies::DEFAULT_POOL_SIZE;
use gso_sim::render::{parse_color, RenderTracker};
use gso_sim::{
    ConnectionManager, LocalSimulation, RemoteConfig, ServerConfig, SimulationHandle, SimulationService,
    SimulationSettings, SpawnRequest,
};

const FRAME_TIME: Duration = Duration::from_millis(16);
const PALETTE: [&str; 4] = ["#ffd27f", "#7fb2ff", "#ff7f7f", "#c2ff7f"];

#[derive(Parser, Debug)]
struct Args {
    /// JSON settings file; environment variables override it
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation in-process with random spawns
    Local {
        #[arg(short, long, default_value_t = 60)]
        bodies: usize,
        #[arg(short = 't', long, default_value_t = 10)]
        seconds: u64,
    },
    /// Host the authoritative simulation
    Serve {
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        address: String,
        #[arg(long, default_value_t = 50)]
        max_clients: usize,
        #[arg(long, default_value_t = 512)]
        max_bodies: usize,
    },
    /// Follow a remote simulation, spawning one body per second
    Connect {
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        address: String,
        #[arg(short = 't', long, default_value_t = 30)]
        seconds: u64,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<SimulationSettings> {
    let settings = match path {
        Some(path) => SimulationSettings::from_json_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => SimulationSettings::default(),
    };
    let settings = settings.with_env_overrides()?;
    settings.validate()?;
    Ok(settings)
}

fn random_spawn(spread: f32) -> SpawnRequest {
    let pos = Vec2::new(fastrand::f32() * 2.0 - 1.0, fastrand::f32() * 2.0 - 1.0) * spread;
    // tangential
    let vel = Vec2::new(-pos.y, pos.x) * (0.05 * fastrand::f32());
    SpawnRequest::new(pos, vel, 0.25 + fastrand::f32())
        .with_color(parse_color(PALETTE[fastrand::usize(..PALETTE.len())]))
        .with_texture(fastrand::u8(..4))
}

/// Drives `sim` at a fixed frame time, reporting once per second.
fn run(sim: &mut SimulationHandle, seconds: u64, spawn_every_second: bool) {
    let mut tracker = RenderTracker::new();
    let started = Instant::now();
    let mut last_report = Instant::now();

    while started.elapsed() < Duration::from_secs(seconds) {
        let frame_start = Instant::now();
        sim.tick(FRAME_TIME.as_secs_f32());

        if sim.take_status_changed() {
            info!("status changed, ready: {}", sim.is_ready());
        }

        let delta = tracker.apply(&sim.read_bodies());
        if !delta.created.is_empty() || !delta.destroyed.is_empty() {
            info!("+{} -{} bodies", delta.created.len(), delta.destroyed.len());
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            last_report = Instant::now();
            info!("players: {}, bodies: {}", sim.player_count(), sim.object_count());
            if let Some(err) = sim.try_get_connection_error() {
                info!("{}", err);
            }
            if spawn_every_second && sim.is_ready() {
                sim.add_body(random_spawn(20.0));
            }
        }

        thread::sleep(FRAME_TIME.saturating_sub(frame_start.elapsed()));
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = load_settings(args.settings.as_ref())?;

    match args.command {
        Command::Local { bodies, seconds } => {
            let mut sim = SimulationHandle::Local(LocalSimulation::new(settings, DEFAULT_POOL_SIZE)?);
            sim.activate();
            for _ in 0..bodies {
                if !sim.is_ready() {
                    break;
                }
                sim.add_body(random_spawn(settings.bounds * 0.5));
            }
            run(&mut sim, seconds, false);
            sim.deactivate();
        }
        Command::Serve { address, max_clients, max_bodies } => {
            let config = ServerConfig {
                address,
                max_clients,
                max_bodies,
                ..Default::default()
            };
            gso_sim::server::serve(config, settings)?;
        }
        Command::Connect { address, seconds } => {
            let config = RemoteConfig {
                address,
                ..Default::default()
            };
            let mut sim = SimulationHandle::Remote(ConnectionManager::connect_tcp(config));
            sim.activate();
            run(&mut sim, seconds, true);
            sim.deactivate();
        }
    }

    Ok(())
}

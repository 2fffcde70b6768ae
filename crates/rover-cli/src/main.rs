//! `rover-cli` – terrain-mapping rover command line.
//!
//! This binary wires the rover stack together and runs it against the
//! simulated camera.  It:
//!
//! 1. Loads `~/.rover/config.toml`, writing the defaults there on first run.
//! 2. Runs the [`PerceptionLoop`] at the configured rate, spinning the
//!    simulated pose by `yaw_rate_deg` every tick.
//! 3. Stops on **Ctrl-C** or after `max_ticks`, then prints a summary of the
//!    world map.

mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use rover_hal::sim::SimCamera;
use rover_perception::{Channel, WorldGrid};
use rover_runtime::{LoopStats, PerceptionLoop, init_tracing, tick_period};
use rover_types::{NavigationSummary, Pose};
use tokio::sync::watch;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    // Hold the guard until exit so pending spans are flushed.
    let _telemetry = init_tracing("rover");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after the current frame …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the run will only stop at max_ticks");
    }

    let cfg = load_or_init_config();

    // ── Perception loop ───────────────────────────────────────────────────
    let camera = build_camera(&cfg);
    let mut perception = match PerceptionLoop::new(cfg.perception.clone(), Box::new(camera)) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to build perception pipeline");
            println!("{}: {}", "Perception error".red(), e);
            std::process::exit(1);
        }
    };

    let (pose_tx, pose_rx) = watch::channel(cfg.runtime.start_pose);
    let (summary_tx, summary_rx) = watch::channel(None);

    // Spin the simulated pose in place at the loop rate.
    let yaw_rate = cfg.runtime.yaw_rate_deg;
    let tick_hz = cfg.runtime.tick_hz;
    let spin_shutdown = shutdown.clone();
    let spinner = tokio::spawn(async move {
        // An unusable rate is reported by the loop itself.
        let Ok(period) = tick_period(tick_hz) else {
            return;
        };
        if yaw_rate == 0.0 {
            return;
        }
        let mut ticker = tokio::time::interval(period);
        while !spin_shutdown.load(Ordering::SeqCst) {
            ticker.tick().await;
            pose_tx.send_modify(|pose| spin(pose, yaw_rate));
            if pose_tx.is_closed() {
                break;
            }
        }
    });

    println!(
        "  Running at {} Hz{} from pose ({}, {}, {}°)\n",
        cfg.runtime.tick_hz.to_string().bold(),
        cfg.runtime
            .max_ticks
            .map(|n| format!(" for {n} ticks"))
            .unwrap_or_default(),
        cfg.runtime.start_pose.x,
        cfg.runtime.start_pose.y,
        cfg.runtime.start_pose.yaw_deg,
    );

    let result = perception
        .run(
            pose_rx,
            summary_tx,
            shutdown.clone(),
            cfg.runtime.tick_hz,
            cfg.runtime.max_ticks,
        )
        .await;
    shutdown.store(true, Ordering::SeqCst);
    spinner.abort();

    match result {
        Ok(stats) => {
            let grid = perception.grid();
            let grid = grid.lock().unwrap_or_else(|e| e.into_inner());
            let last = summary_rx.borrow().clone();
            print_report(&stats, &grid, last.as_ref());
        }
        Err(e) => {
            error!(error = %e, "perception loop failed");
            println!("{}: {}", "Runtime error".red(), e);
            std::process::exit(1);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn load_or_init_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

fn build_camera(cfg: &config::Config) -> SimCamera {
    let camera = SimCamera::new(
        cfg.camera.id.clone(),
        cfg.perception.frame_width as u32,
        cfg.perception.frame_height as u32,
    )
    .with_horizon(cfg.camera.horizon);
    match cfg.camera.target {
        Some(t) => camera.with_target(t.row, t.col, t.size),
        None => camera,
    }
}

/// Turn in place by `rate_deg`, keeping the heading in [0, 360).
fn spin(pose: &mut Pose, rate_deg: f64) {
    pose.yaw_deg = (pose.yaw_deg + rate_deg).rem_euclid(360.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ____                       "#.bold().cyan());
    println!("{}", r#"  / __ \____ _   _____  _____ "#.bold().cyan());
    println!("{}", r#" / /_/ / __ \ | / / _ \/ ___/ "#.bold().cyan());
    println!("{}", r#"/ _, _/ /_/ / |/ /  __/ /     "#.bold().cyan());
    println!("{}", r#"/_/ |_|\____/|___/\___/_/     "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Rover".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Camera terrain mapping");
    println!();
}

fn print_report(stats: &LoopStats, grid: &WorldGrid, last: Option<&NavigationSummary>) {
    println!();
    println!(
        "  Frames: {} processed, {} skipped",
        stats.frames_processed.to_string().green(),
        if stats.frames_skipped > 0 {
            stats.frames_skipped.to_string().yellow()
        } else {
            stats.frames_skipped.to_string().normal()
        }
    );
    println!("  World map ({0}×{0} cells):", grid.size());
    for ch in Channel::ALL {
        let label = match ch {
            Channel::Obstacle => "obstacle ".red(),
            Channel::Target => "target   ".yellow(),
            Channel::Navigable => "navigable".blue(),
        };
        println!(
            "    {label}  {:>10} hits  {:>6} cells",
            grid.total(ch),
            grid.touched_cells(ch)
        );
    }
    if let Some(summary) = last {
        let bearing = summary
            .mean_bearing()
            .map(|rad| format!("{:+.1}°", rad.to_degrees()))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  Last frame: {} navigable px, mean bearing {}, {} target px",
            summary.nav_dists.len(),
            bearing.bold(),
            summary.target_pixels
        );
    }
    println!();
}

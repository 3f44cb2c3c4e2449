//! planetwalk - headless walk, drive and fly session on a small planet.
//!
//! Runs a scripted key sequence through the same input path a window would
//! feed, ticks the simulation at a fixed rate and logs RON snapshots of the
//! player.

mod config;
mod world;

use anyhow::{Context, Result};
use config::GameConfig;
use engine_core::Time;
use input::{ElementState, InputState, KeyCode};
use locomotion::Controls;
use scene::SceneLayer;
use std::time::Duration;
use world::{Population, Simulation};

/// One scripted input event.
#[derive(Debug, Clone, Copy)]
enum Action {
    Hold(KeyCode),
    Release(KeyCode),
    /// Press and release within one frame.
    Tap(KeyCode),
    /// Raw mouse counts.
    Look(f64, f64),
}

/// Script for the demo session: walk to the car, drive, get out, visit the ship.
const SCRIPT: &[(f32, Action)] = &[
    (1.0, Action::Look(-200.0, 0.0)),
    (1.5, Action::Hold(KeyCode::KeyW)),
    (3.0, Action::Release(KeyCode::KeyW)),
    (3.2, Action::Tap(KeyCode::KeyE)),
    (3.5, Action::Tap(KeyCode::KeyC)),
    (4.0, Action::Hold(KeyCode::KeyW)),
    (7.0, Action::Release(KeyCode::KeyW)),
    (8.5, Action::Tap(KeyCode::KeyE)),
    (9.0, Action::Tap(KeyCode::KeyC)),
    (9.5, Action::Tap(KeyCode::KeyC)),
    (10.0, Action::Hold(KeyCode::ShiftLeft)),
    (10.0, Action::Hold(KeyCode::KeyW)),
    (13.0, Action::Tap(KeyCode::Space)),
    (16.0, Action::Release(KeyCode::KeyW)),
    (16.0, Action::Release(KeyCode::ShiftLeft)),
    (16.5, Action::Tap(KeyCode::KeyE)),
    (18.0, Action::Tap(KeyCode::KeyF)),
    (19.0, Action::Tap(KeyCode::KeyE)),
    (20.0, Action::Hold(KeyCode::KeyS)),
    (22.0, Action::Release(KeyCode::KeyS)),
];

fn apply(input: &mut InputState, action: Action) {
    match action {
        Action::Hold(key) => input.process_keyboard(key, ElementState::Pressed),
        Action::Release(key) => input.process_keyboard(key, ElementState::Released),
        Action::Tap(key) => {
            input.process_keyboard(key, ElementState::Pressed);
            input.process_keyboard(key, ElementState::Released);
        }
        Action::Look(dx, dy) => input.process_mouse_motion((dx, dy)),
    }
}

/// Controls for the first fixed tick of a frame.
fn controls(input: &InputState, sensitivity: f32) -> Controls {
    Controls {
        intent: input.intent(),
        look: input.look_delta(sensitivity),
        toggle_door: input.is_door_toggle_pressed(),
        cycle_camera: input.is_camera_toggle_pressed(),
    }
}

fn log_snapshot(sim: &Simulation, pop: &Population, elapsed: f32) -> Result<()> {
    let Some(snap) = sim.snapshot(pop.player) else {
        return Ok(());
    };
    let text = ron::to_string(&snap).context("serializing player snapshot")?;
    let vehicle = sim
        .agent(pop.player)
        .and_then(|a| a.vehicle())
        .map(|v| match v {
            v if v == pop.car => "car",
            v if v == pop.airplane => "airplane",
            v if v == pop.spaceship => "spaceship",
            _ => "vehicle",
        })
        .unwrap_or("on foot");
    log::info!("t={:5.2}s [{}] {}", elapsed, vehicle, text);
    Ok(())
}

fn run(config: &GameConfig) -> Result<()> {
    let (mut sim, pop) = world::populate(config);
    let mut input = InputState::new();
    input.set_cursor_locked(true);

    let mut time = Time::with_fixed_rate(config.fixed_rate);
    // Frames deliberately longer than a tick so the accumulator drains in bursts.
    let frame = Duration::from_secs_f64(1.5 / config.fixed_rate.max(1.0));
    let mut script = SCRIPT.iter().peekable();
    let mut next_snapshot = 0.0;

    while time.elapsed_seconds() < config.session_seconds {
        // Mouse motion queued last frame becomes this frame's look delta.
        input.begin_frame();
        let now = time.elapsed_seconds();
        while let Some((_, action)) = script.next_if(|(at, _)| *at <= now) {
            log::debug!("script: {:?}", action);
            apply(&mut input, *action);
        }

        time.advance(frame);
        let mut first = controls(&input, config.sensitivity);
        while time.should_fixed_update() {
            sim.set_controls(pop.player, first);
            sim.tick(time.fixed_timestep_seconds());
            // Held keys carry over to catch-up ticks; presses and look do not.
            first.consume_presses();
        }

        if time.elapsed_seconds() >= next_snapshot {
            log_snapshot(&sim, &pop, time.elapsed_seconds())?;
            next_snapshot += config.snapshot_interval.max(0.1);
        }
    }

    log::info!(
        "Session finished after {} ticks; camera {:?} at {:?}",
        time.tick_count(),
        sim.scene.camera().mode,
        sim.scene.camera().position()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    if std::env::args().any(|a| a == "--write-config") {
        config.save();
        log::info!("Wrote config.ron");
    }

    log::info!("Starting planetwalk (seed {}, {} Hz)", config.seed, config.fixed_rate);
    run(&config).context("simulation session failed")
}

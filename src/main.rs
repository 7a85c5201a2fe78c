//! Marble Maze headless runner
//!
//! Loads levels and tunables, lets the autopilot play at the fixed timestep,
//! and reports the outcome. Optionally dumps the final session as JSON and
//! the board geometry as OBJ.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use marble_maze::Config;
use marble_maze::consts::{MAX_FRAME_DT, SIM_DT};
use marble_maze::mesh::{ObjGroup, colors, export_obj, marker_placements, primitives};
use marble_maze::sim::{Autopilot, FixedStep, GamePhase, LevelManager, Session, TickInput, tick};

#[derive(Parser, Debug)]
#[command(about = "Play marble maze levels with the autopilot", version)]
struct Args {
    /// Directory of `*.txt` level files (built-in levels when omitted)
    #[arg(long)]
    levels: Option<PathBuf>,
    /// JSON tunables file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Zero-based level to start on
    #[arg(long, default_value_t = 0)]
    level: usize,
    /// Simulated seconds allowed per level
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// Simulated display frame time in seconds, split into fixed ticks
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f32,
    /// Continue to the next level after each win
    #[arg(long)]
    campaign: bool,
    /// Print the final session snapshot as JSON
    #[arg(long)]
    json: bool,
    /// Write the final level's board and ball to an OBJ file (plus a sibling .mtl)
    #[arg(long)]
    export_obj: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let levels = match &args.levels {
        Some(dir) => LevelManager::load_dir(dir, &config),
        None => LevelManager::builtin(&config),
    };
    log::info!("Marble Maze starting with {} level(s)", levels.len());

    let mut session = Session::new(levels, config).context("starting session")?;
    if args.level != 0 && !session.select_level(args.level) {
        anyhow::bail!(
            "level {} out of range (0..{})",
            args.level,
            session.levels().len()
        );
    }

    let frame_dt = args.frame_dt.clamp(SIM_DT, MAX_FRAME_DT);
    let frames_per_level = (args.seconds.max(0.0) / frame_dt) as u64;
    loop {
        let phase = play_level(&mut session, frames_per_level, frame_dt);
        let number = session.level_index() + 1;
        match phase {
            GamePhase::Won => println!("Level {number}: cleared in {:.2}s", session.elapsed),
            GamePhase::Failed => println!("Level {number}: ball lost after {:.2}s", session.elapsed),
            GamePhase::Playing => println!("Level {number}: out of time"),
        }

        if !(args.campaign && phase == GamePhase::Won) {
            break;
        }
        let advance = TickInput {
            next_level: true,
            ..Default::default()
        };
        tick(&mut session, &advance, 0.0);
        if session.phase != GamePhase::Playing {
            log::info!("All levels cleared");
            break;
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&session.snapshot())?;
        println!("{json}");
    }

    if let Some(path) = &args.export_obj {
        let level = session.current_level();
        let parts = session.board.parts(&marker_placements(level));
        let ball = primitives::sphere(session.config.ball_mesh_radius, 32, 16)
            .translated(session.ball.pos);
        let mut groups: Vec<ObjGroup> = parts
            .iter()
            .map(|(part, mesh)| ObjGroup {
                name: part.name(),
                albedo: part.albedo(),
                mesh,
            })
            .collect();
        groups.push(ObjGroup {
            name: "ball",
            albedo: colors::BALL,
            mesh: &ball,
        });
        export_obj(path, &groups)?;
    }

    Ok(())
}

/// Steer once per frame until the level ends or the frame budget runs out
fn play_level(session: &mut Session, max_frames: u64, frame_dt: f32) -> GamePhase {
    let pilot = Autopilot::new(session.current_level());
    let mut stepper = FixedStep::new();
    for _ in 0..max_frames {
        let input = TickInput {
            tilt: pilot.steer(session.current_level(), &session.ball),
            ..Default::default()
        };
        stepper.advance(session, &input, frame_dt);
        if session.phase != GamePhase::Playing {
            break;
        }
    }
    session.phase
}

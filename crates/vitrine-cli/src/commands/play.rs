//! `vitrine play`: headless playback

use super::util::{add_animations, load_model};
use anyhow::{bail, Result};
use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use vitrine_animation::MixerCommand;
use vitrine_runtime::FrameClock;

#[derive(Args)]
pub struct PlayArgs {
    /// Path or http(s) URL of a .glb/.gltf file
    pub source: String,

    /// Animation to play (repeatable; defaults to all)
    #[arg(long = "animation", short = 'a')]
    pub select: Vec<String>,

    /// Seconds to simulate
    #[arg(long, default_value = "2.0")]
    pub seconds: f64,

    /// Frames per second
    #[arg(long, default_value = "10")]
    pub fps: u32,

    /// Play once instead of looping
    #[arg(long)]
    pub no_loop: bool,

    /// Pause after this many seconds
    #[arg(long)]
    pub pause_at: Option<f64>,

    /// Animation, e.g. hop:duration=1;position=0,1,0 (repeatable)
    #[arg(long = "add")]
    pub animations: Vec<String>,

    /// Animation descriptor file (.anim.toml)
    #[arg(long)]
    pub animation_file: Option<PathBuf>,

    /// Run at wall-clock speed instead of fixed steps
    #[arg(long)]
    pub realtime: bool,
}

pub fn run(args: PlayArgs) -> Result<()> {
    let (_, mut controller) = load_model(&args.source)?;
    if let Some(path) = &args.animation_file {
        controller.load_animations(path)?;
    }
    add_animations(&mut controller, &args.animations)?;

    let available = controller.available_animations();
    let selected: BTreeSet<String> = if args.select.is_empty() {
        available.iter().cloned().collect()
    } else {
        args.select.iter().cloned().collect()
    };
    if selected.is_empty() {
        bail!("No animations to play; add one with --add or --animation-file");
    }
    if let Some(unknown) = selected.iter().find(|n| !available.contains(n)) {
        bail!(
            "Unknown animation '{}'. Available: {}",
            unknown,
            available.join(", ")
        );
    }
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }

    println!(
        "Playing {} ({})",
        selected.iter().cloned().collect::<Vec<_>>().join(", "),
        if args.no_loop { "once" } else { "loop" }
    );
    controller.command(MixerCommand::SetLoop(!args.no_loop));
    controller.command(MixerCommand::SelectTracks(selected));
    controller.command(MixerCommand::Play);

    let step = 1.0 / args.fps as f64;
    let frames = (args.seconds * args.fps as f64).ceil() as u64;
    let mut clock = FrameClock::new();
    clock.tick();
    let mut time = 0.0;
    let mut paused = false;

    for _ in 0..frames {
        let dt = if args.realtime {
            std::thread::sleep(Duration::from_secs_f64(step));
            clock.tick()
        } else {
            step
        };
        if let Some(at) = args.pause_at {
            if !paused && time >= at {
                controller.command(MixerCommand::Pause);
                paused = true;
                println!("-- paused at {:.2}s", time);
            }
        }
        controller.frame(dt);
        time += dt;

        if let Some(root) = controller.root() {
            let t = &root.transform;
            println!(
                "t={:>6.2}  position=({:.3}, {:.3}, {:.3})  scale=({:.3}, {:.3}, {:.3})  rotation=({:.3}, {:.3}, {:.3}, {:.3})",
                time,
                t.position.x,
                t.position.y,
                t.position.z,
                t.scale.x,
                t.scale.y,
                t.scale.z,
                t.rotation[0],
                t.rotation[1],
                t.rotation[2],
                t.rotation[3]
            );
        }
    }
    Ok(())
}

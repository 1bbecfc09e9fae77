//! `vitrine lights`: edit a light rig file

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use vitrine_scene::{LightId, LightKind, LightRig, LightUpdate};

const DEFAULT_LIGHTS_FILE: &str = ".vitrine/lights.toml";

#[derive(Subcommand)]
pub enum LightsCommands {
    /// Print the rig
    Show {
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },

    /// Back to a single white directional light
    Reset {
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },

    /// Add a light: directional, point or spot
    Add {
        kind: String,
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },

    /// Change one property, e.g. `set 2 intensity 3.5`
    Set {
        id: u32,
        key: String,
        value: String,
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },

    /// Remove a light
    Remove {
        id: u32,
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },

    /// Turn shadows on or off
    Shadows {
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },

    /// Set tone-mapping exposure (0..10)
    Exposure {
        value: f32,
        #[arg(long, default_value = DEFAULT_LIGHTS_FILE)]
        file: PathBuf,
    },
}

pub fn run(cmd: LightsCommands) -> Result<()> {
    match cmd {
        LightsCommands::Show { file } => {
            print_rig(&load(&file)?);
            Ok(())
        }
        LightsCommands::Reset { file } => {
            let mut rig = load(&file)?;
            rig.reset();
            save(&rig, &file)
        }
        LightsCommands::Add { kind, file } => {
            let kind: LightKind = kind.parse()?;
            let mut rig = load(&file)?;
            let id = rig.add(kind);
            println!("Added light {}", id);
            save(&rig, &file)
        }
        LightsCommands::Set {
            id,
            key,
            value,
            file,
        } => {
            let mut rig = load(&file)?;
            let update = LightUpdate::parse(&key, &value)?;
            rig.update(LightId(id), update)
                .with_context(|| format!("Failed to set {} on light {}", key, id))?;
            save(&rig, &file)
        }
        LightsCommands::Remove { id, file } => {
            let mut rig = load(&file)?;
            if rig.remove(LightId(id)).is_none() {
                bail!("No light with id {}", id);
            }
            save(&rig, &file)
        }
        LightsCommands::Shadows { file } => {
            let mut rig = load(&file)?;
            let on = rig.toggle_shadows();
            println!("Shadows {}", if on { "on" } else { "off" });
            save(&rig, &file)
        }
        LightsCommands::Exposure { value, file } => {
            let mut rig = load(&file)?;
            rig.set_exposure(value)?;
            save(&rig, &file)
        }
    }
}

fn load(file: &Path) -> Result<LightRig> {
    if file.exists() {
        LightRig::load(file).with_context(|| format!("Failed to load {}", file.display()))
    } else {
        Ok(LightRig::default())
    }
}

fn save(rig: &LightRig, file: &Path) -> Result<()> {
    rig.save(file)
        .with_context(|| format!("Failed to save {}", file.display()))?;
    print_rig(rig);
    Ok(())
}

fn kind_name(kind: LightKind) -> &'static str {
    match kind {
        LightKind::Directional => "directional",
        LightKind::Point => "point",
        LightKind::Spot => "spot",
    }
}

fn print_rig(rig: &LightRig) {
    println!(
        "shadows: {}  exposure: {:.2}",
        if rig.shadows_enabled { "on" } else { "off" },
        rig.exposure
    );
    for light in &rig.lights {
        let mut line = format!(
            "  [{}] {:<11} {} intensity={:.2} position=({}, {}, {}) shadow={:.2}",
            light.id,
            kind_name(light.kind),
            light.color.to_hex_string(),
            light.intensity,
            light.position[0],
            light.position[1],
            light.position[2],
            light.shadow_intensity
        );
        if light.kind != LightKind::Directional {
            line.push_str(&format!(" distance={:.1}", light.distance));
        }
        if light.kind == LightKind::Spot {
            line.push_str(&format!(
                " angle={:.3} penumbra={:.2}",
                light.angle, light.penumbra
            ));
        }
        println!("{}", line);
    }
}

//! Helpers shared by the commands

use anyhow::{bail, Context, Result};
use vitrine_animation::AnimationDescriptor;
use vitrine_import::ImportSource;
use vitrine_runtime::{ModelController, VitrineConfig};
use vitrine_scene::{NodePatch, SceneNode};

/// Load config and import `source` synchronously
pub fn load_model(source: &str) -> Result<(VitrineConfig, ModelController)> {
    let config = VitrineConfig::load().context("Failed to load config")?;
    let mut controller = ModelController::from_config(&config)?;
    let source = ImportSource::parse(source)?;
    controller
        .import_now(source)
        .with_context(|| "Failed to import model")?;
    Ok((config, controller))
}

/// `Node:key=value`
pub fn parse_edit(arg: &str) -> Result<(String, NodePatch)> {
    let Some((node, assignment)) = arg.split_once(':') else {
        bail!("edit '{}' should look like Node:key=value", arg);
    };
    let Some((key, value)) = assignment.split_once('=') else {
        bail!("edit '{}' should look like Node:key=value", arg);
    };
    let patch = NodePatch::parse(key, value)?;
    Ok((node.trim().to_string(), patch))
}

pub fn apply_edits(controller: &mut ModelController, edits: &[String]) -> Result<()> {
    for arg in edits {
        let (node, patch) = parse_edit(arg)?;
        controller
            .edit_by_name(&node, patch)
            .with_context(|| format!("Failed to apply '{}'", arg))?;
    }
    Ok(())
}

/// `name:duration=1.5;position=0,1,0;scale=1,1,1;rotation=0,90,0`
pub fn parse_animation(arg: &str) -> Result<(String, AnimationDescriptor)> {
    let Some((name, fields)) = arg.split_once(':') else {
        bail!("animation '{}' should look like name:duration=1.5;position=0,1,0", arg);
    };
    let mut duration = None;
    let mut descriptor = AnimationDescriptor::new(0.0);
    for field in fields.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        let Some((key, value)) = field.split_once('=') else {
            bail!("expected key=value in '{}'", field);
        };
        match key.trim() {
            "duration" => duration = Some(value.trim().parse::<f64>()?),
            "position" => descriptor.position = parse_triple(value)?,
            "scale" => descriptor.scale = parse_triple(value)?,
            "rotation" => descriptor.rotation = parse_triple(value)?,
            other => bail!("unknown animation field '{}'", other),
        }
    }
    let Some(duration) = duration else {
        bail!("animation '{}' needs a duration", name);
    };
    descriptor.duration = duration;
    Ok((name.trim().to_string(), descriptor))
}

fn parse_triple(value: &str) -> Result<[f32; 3]> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<f32>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => bail!("expected x,y,z, got '{}'", value),
    }
}

pub fn add_animations(controller: &mut ModelController, args: &[String]) -> Result<()> {
    for arg in args {
        let (name, descriptor) = parse_animation(arg)?;
        controller
            .add_animation(&name, descriptor)
            .with_context(|| format!("Invalid animation '{}'", name))?;
    }
    Ok(())
}

/// Indented node tree with geometry and material summaries
pub fn format_tree(root: &SceneNode) -> String {
    let mut out = String::new();
    root.walk(&mut |node, depth| {
        let mut line = format!("{}{}", "  ".repeat(depth), node.name);
        let mut details = Vec::new();
        if let Some(geometry) = &node.geometry {
            details.push(geometry.kind().to_string());
        }
        if let Some(material) = &node.material {
            details.push(format!(
                "{} {}",
                material.kind(),
                material.props.color.to_hex_string()
            ));
        }
        if !node.visible {
            details.push("hidden".to_string());
        }
        if !details.is_empty() {
            line.push_str(&format!(" [{}]", details.join(", ")));
        }
        out.push_str(&line);
        out.push('\n');
    });
    out
}

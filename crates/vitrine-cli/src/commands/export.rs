//! `vitrine export`

use super::util::{add_animations, apply_edits, load_model};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use vitrine_export::{ExportSink, LocalFileSink};

#[derive(Args)]
pub struct ExportArgs {
    /// Path or http(s) URL of a .glb/.gltf file
    pub source: String,

    /// Output directory (defaults to [export] output_dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File name (defaults to Exported.glb / Exported.gltf)
    #[arg(long)]
    pub name: Option<String>,

    /// Write pretty-printed glTF JSON instead of GLB
    #[arg(long)]
    pub json: bool,

    /// Leave textures out
    #[arg(long)]
    pub no_images: bool,

    /// Skip hidden nodes
    #[arg(long)]
    pub only_visible: bool,

    /// Downscale textures larger than this
    #[arg(long)]
    pub max_texture_size: Option<u32>,

    /// Node edit, e.g. Body:color=#ff0000 (repeatable)
    #[arg(long = "set")]
    pub edits: Vec<String>,

    /// Animation, e.g. hop:duration=1;position=0,1,0 (repeatable)
    #[arg(long = "add")]
    pub animations: Vec<String>,

    /// Animation descriptor file (.anim.toml)
    #[arg(long)]
    pub animation_file: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let (config, mut controller) = load_model(&args.source)?;

    apply_edits(&mut controller, &args.edits)?;
    if let Some(path) = &args.animation_file {
        controller.load_animations(path)?;
    }
    add_animations(&mut controller, &args.animations)?;

    let mut options = config.export.options.clone();
    if args.json {
        options.binary = false;
    }
    if args.no_images {
        options.embed_images = false;
    }
    if args.only_visible {
        options.only_visible = true;
    }
    if let Some(size) = args.max_texture_size {
        options.max_texture_size = size;
    }

    let output = controller.export(&options).context("Export failed")?;
    let dir = args.output.unwrap_or(config.export.output_dir);
    let mut sink = LocalFileSink::new(dir);
    if let Some(name) = args.name.or(config.export.file_name) {
        sink = sink.with_file_name(name);
    }
    let location = sink.deliver(&output)?;

    let report = &output.report;
    println!("Exported {}", location);
    println!(
        "  {} nodes, {} meshes, {} materials, {} textures, {} animations",
        report.node_count,
        report.mesh_count,
        report.material_count,
        report.texture_count,
        report.animation_count
    );
    println!("  {}", output.hash);
    for dropped in &report.dropped_tracks {
        println!(
            "  dropped {} track of missing node '{}' in '{}'",
            dropped.property.path(),
            dropped.node_name,
            dropped.clip
        );
    }
    for clip in &report.dropped_clips {
        println!("  dropped empty animation '{}'", clip);
    }
    Ok(())
}

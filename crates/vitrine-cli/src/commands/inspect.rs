//! `vitrine inspect`

use super::util::{format_tree, load_model};
use anyhow::Result;
use vitrine_animation::ClipOrigin;

pub fn run(source: &str) -> Result<()> {
    let (_, controller) = load_model(source)?;

    if let Some(meta) = controller.meta() {
        println!("{} ({})", meta.name, meta.format);
        println!("  hash:      {}", meta.hash);
        println!("  size:      {} bytes", meta.byte_len);
        println!("  nodes:     {}", meta.node_count);
        println!("  meshes:    {} ({} vertices)", meta.mesh_count, meta.vertex_count);
        println!("  materials: {}", meta.material_count);
        println!("  textures:  {}", meta.texture_count);
    }

    if let Some(root) = controller.root() {
        println!();
        print!("{}", format_tree(root));
    }

    let embedded = controller.library().embedded();
    if embedded.is_empty() {
        println!("\nNo embedded animations");
    } else {
        println!("\nAnimations:");
        for clip in embedded {
            let origin = match clip.origin {
                ClipOrigin::Embedded => "embedded",
                ClipOrigin::Synthesized => "synthesized",
            };
            println!(
                "  {} ({:.2}s, {} tracks, {})",
                clip.name,
                clip.duration,
                clip.tracks.len(),
                origin
            );
        }
    }
    Ok(())
}

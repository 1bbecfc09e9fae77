//! Vitrine CLI - inspect, edit, animate and export glTF models

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cloud, config, export, inspect, lights, play};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Headless glTF model viewer and editor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a model's node tree, materials and animations
    Inspect {
        /// Path or http(s) URL of a .glb/.gltf file
        source: String,
    },

    /// Edit a model and export it as GLB or glTF JSON
    Export(export::ExportArgs),

    /// Play animations headlessly and print the root transform
    Play(play::PlayArgs),

    /// Edit the light rig
    #[command(subcommand)]
    Lights(lights::LightsCommands),

    /// Cloud storage operations
    #[command(subcommand)]
    Cloud(cloud::CloudCommands),

    /// Print the resolved configuration
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { source } => inspect::run(&source),
        Commands::Export(args) => export::run(args),
        Commands::Play(args) => play::run(args),
        Commands::Lights(cmd) => lights::run(cmd),
        Commands::Cloud(cmd) => cloud::run(cmd),
        Commands::Config => config::run(),
    }
}

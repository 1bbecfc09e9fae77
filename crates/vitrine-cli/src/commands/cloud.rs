//! `vitrine cloud`: list, watch, push and pull models

use super::util::{apply_edits, load_model};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use vitrine_cloud::{cloud_export_options, CloudListing, CloudSink, HttpObjectStore, ObjectStore};
use vitrine_runtime::VitrineConfig;

#[derive(Subcommand)]
pub enum CloudCommands {
    /// List stored models
    List,

    /// Re-list on the configured interval and print changes
    Watch {
        /// Stop after this many refreshes
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Export a model into the bucket
    Push {
        /// Path or http(s) URL of a .glb/.gltf file
        source: String,

        /// Object name (defaults to <unix_millis>_scene)
        #[arg(long)]
        name: Option<String>,

        /// Upload glTF JSON instead of GLB
        #[arg(long)]
        json: bool,

        /// Node edit, e.g. Body:color=#ff0000 (repeatable)
        #[arg(long = "set")]
        edits: Vec<String>,
    },

    /// Download a stored model
    Pull {
        /// File name as shown by `cloud list`
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

pub fn run(cmd: CloudCommands) -> Result<()> {
    match cmd {
        CloudCommands::List => {
            let (_, mut listing) = open_listing()?;
            listing.refresh();
            print_models(&listing);
            Ok(())
        }
        CloudCommands::Watch { iterations } => {
            let (_, mut listing) = open_listing()?;
            let mut refreshes = 0;
            loop {
                if listing.poll(Instant::now()) {
                    print_models(&listing);
                }
                refreshes += 1;
                if iterations.is_some_and(|max| refreshes >= max) {
                    return Ok(());
                }
                std::thread::sleep(listing.interval());
            }
        }
        CloudCommands::Push {
            source,
            name,
            json,
            edits,
        } => {
            let (config, mut controller) = load_model(&source)?;
            apply_edits(&mut controller, &edits)?;
            let store = open_store(&config)?;
            let mut sink = CloudSink::new(store, config.storage.folder());
            if let Some(name) = name {
                sink = sink.with_name(name);
            }
            let mut options = cloud_export_options();
            options.binary = !json;
            let object = controller
                .export_to(&sink, &options)
                .context("Upload failed")?;
            println!("Uploaded {}", object);
            Ok(())
        }
        CloudCommands::Pull { name, output } => {
            let (store, mut listing) = open_listing()?;
            listing.refresh();
            let Some(model) = listing.find(&name) else {
                bail!("No model named '{}' in the bucket", name);
            };
            let bytes = store.download(&model.download_url)?;
            std::fs::create_dir_all(&output)?;
            let path = output.join(&model.name);
            std::fs::write(&path, &bytes)?;
            println!("Downloaded {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
    }
}

fn open_store(config: &VitrineConfig) -> Result<Arc<dyn ObjectStore>> {
    let store = HttpObjectStore::from_config(&config.storage)?;
    Ok(Arc::new(store))
}

fn open_listing() -> Result<(Arc<dyn ObjectStore>, CloudListing)> {
    let config = VitrineConfig::load().context("Failed to load config")?;
    let store = open_store(&config)?;
    let listing = CloudListing::new(
        Arc::clone(&store),
        config.storage.folder(),
        config.storage.poll_interval(),
    );
    Ok((store, listing))
}

fn print_models(listing: &CloudListing) {
    if listing.models().is_empty() {
        println!("No models found");
        return;
    }
    for model in listing.models() {
        println!("{}\t{}", model.name, model.download_url);
    }
}

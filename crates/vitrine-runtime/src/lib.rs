//! Vitrine Runtime - the editing loop around one loaded model
//!
//! - `ModelController` - owns the scene session, animation library, mixer and
//!   selection; applies background imports by ticket and writes animation
//!   poses each frame
//! - `ImportQueue` - worker-thread decoding with results polled by the owner
//! - `FrameClock` - wall-clock frame deltas
//! - `VitrineConfig` - layered TOML config (global, project, environment)

mod clock;
pub mod config;
mod controller;
mod import_queue;

pub use clock::FrameClock;
pub use config::{ExportConfig, ImportConfig, VitrineConfig};
pub use controller::{FrameReport, ImportEvent, ModelController};
pub use import_queue::{ImportCompletion, ImportQueue};

//! CLI command implementations

pub mod cloud;
pub mod config;
pub mod export;
pub mod inspect;
pub mod lights;
pub mod play;
pub mod util;

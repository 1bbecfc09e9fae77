//! Vitrine Core - Foundational types for the Vitrine model editor
//!
//! This crate provides the core types that all other Vitrine crates depend on:
//! - `NodeId` - Unique scene node identifiers
//! - `ContentHash` - SHA-256 based content hashing
//! - `Transform`, `Vec3`, `Color` - Spatial and color types
//! - Error types and Result alias

mod error;
mod hash;
mod id;
mod types;

pub use error::{Result, VitrineError};
pub use hash::ContentHash;
pub use id::NodeId;
pub use types::{quat_from_euler_degrees, Color, Transform, Vec3};

//! Vitrine Scene - the editable scene graph
//!
//! This crate owns everything the editing panels touch: scene nodes,
//! material and geometry variants, node patches, the light rig and the
//! hover/selection state. All node mutation goes through `SceneSession`.

pub mod extras;
pub mod geometry;
pub mod light;
pub mod material;
mod node;
mod patch;
pub mod selection;
mod session;

pub use extras::{MaterialExtras, NodeExtras};
pub use geometry::{Geometry, GeometryKind, MeshData};
pub use light::{Light, LightId, LightKind, LightRig, LightUpdate};
pub use material::{convert, Material, MaterialKind, MaterialProps, Shading, Side, Texture};
pub use node::SceneNode;
pub use patch::NodePatch;
pub use selection::SelectionController;
pub use session::{ReplaceTicket, SceneSession};

//! Node edits issued by the editing panels

use crate::geometry::{Geometry, GeometryKind};
use crate::material::{convert, Material, MaterialKind, Side};
use crate::node::SceneNode;
use vitrine_core::{quat_from_euler_degrees, Color, Result, Vec3, VitrineError};

/// One edit applied to one node through `SceneSession::mutate`
#[derive(Debug, Clone, PartialEq)]
pub enum NodePatch {
    Color(Color),
    /// Change the material kind, see [`convert`]
    Material(MaterialKind),
    Wireframe(bool),
    Transparent(bool),
    /// 0..=1
    Opacity(f32),
    DepthTest(bool),
    DepthWrite(bool),
    AlphaHash(bool),
    Side(Side),
    FlatShading(bool),
    VertexColors(bool),
    /// Replace the geometry with a default-sized primitive
    Geometry(GeometryKind),
    /// Uniform scale
    Size(f32),
    Translation(Vec3),
    /// Quaternion [x, y, z, w]
    Rotation([f32; 4]),
    Scale(Vec3),
    Visible(bool),
    Rename(String),
}

const PATCH_KEYS: &[&str] = &[
    "color",
    "material",
    "wireframe",
    "transparent",
    "opacity",
    "depth_test",
    "depth_write",
    "alpha_hash",
    "side",
    "flat_shading",
    "vertex_colors",
    "geometry",
    "size",
    "position",
    "rotation",
    "scale",
    "visible",
    "name",
];

impl NodePatch {
    /// Parse a `key=value` style edit.
    ///
    /// Keys are matched ignoring case, `_` and `-` (`depthTest`,
    /// `depth_test` and `depth-test` are the same key). `rotation` takes
    /// Euler degrees `x,y,z`; `position` and `scale` take `x,y,z`.
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let value = value.trim();

        let patch = match normalized.as_str() {
            "color" => NodePatch::Color(Color::parse_hex(value)?),
            "material" | "type" => NodePatch::Material(value.parse()?),
            "wireframe" => NodePatch::Wireframe(parse_bool(key, value)?),
            "transparent" => NodePatch::Transparent(parse_bool(key, value)?),
            "opacity" => NodePatch::Opacity(parse_f32(key, value)?),
            "depthtest" => NodePatch::DepthTest(parse_bool(key, value)?),
            "depthwrite" => NodePatch::DepthWrite(parse_bool(key, value)?),
            "alphahash" => NodePatch::AlphaHash(parse_bool(key, value)?),
            "side" => NodePatch::Side(value.parse()?),
            "flatshading" => NodePatch::FlatShading(parse_bool(key, value)?),
            "vertexcolors" => NodePatch::VertexColors(parse_bool(key, value)?),
            "geometry" => NodePatch::Geometry(value.parse()?),
            "size" => NodePatch::Size(parse_f32(key, value)?),
            "position" | "translation" => NodePatch::Translation(parse_vec3(key, value)?),
            "rotation" => {
                let degrees = parse_vec3(key, value)?.to_array();
                NodePatch::Rotation(quat_from_euler_degrees(degrees).to_array())
            }
            "scale" => NodePatch::Scale(parse_vec3(key, value)?),
            "visible" => NodePatch::Visible(parse_bool(key, value)?),
            "name" => NodePatch::Rename(value.to_string()),
            _ => {
                return Err(VitrineError::InvalidEnumValue {
                    value: key.to_string(),
                    allowed: PATCH_KEYS.iter().map(|k| k.to_string()).collect(),
                })
            }
        };
        Ok(patch)
    }

    pub(crate) fn apply(self, node: &mut SceneNode) -> Result<()> {
        match self {
            NodePatch::Material(kind) => {
                let material = material_of(node)?;
                let converted = convert(material, kind);
                node.material = Some(converted);
            }
            NodePatch::Color(color) => material_mut(node)?.props.color = color,
            NodePatch::Wireframe(on) => material_mut(node)?.props.wireframe = on,
            NodePatch::Transparent(on) => material_mut(node)?.props.transparent = on,
            NodePatch::Opacity(opacity) => {
                VitrineError::check_range("opacity", opacity as f64, 0.0, 1.0)?;
                material_mut(node)?.props.opacity = opacity;
            }
            NodePatch::DepthTest(on) => material_mut(node)?.props.depth_test = on,
            NodePatch::DepthWrite(on) => material_mut(node)?.props.depth_write = on,
            NodePatch::AlphaHash(on) => material_mut(node)?.props.alpha_hash = on,
            NodePatch::Side(side) => material_mut(node)?.props.side = side,
            NodePatch::FlatShading(on) => {
                let material = material_mut(node)?;
                if on && !material.kind().supports_flat_shading() {
                    return Err(VitrineError::Validation(format!(
                        "{} does not support flat shading",
                        material.kind()
                    )));
                }
                material.props.flat_shading = on;
            }
            NodePatch::VertexColors(on) => material_mut(node)?.props.vertex_colors = on,
            NodePatch::Geometry(kind) => node.geometry = Some(Geometry::primitive(kind)?),
            NodePatch::Size(size) => {
                if !size.is_finite() || size <= 0.0 {
                    return Err(VitrineError::Validation(format!(
                        "size must be positive, got {}",
                        size
                    )));
                }
                node.transform.scale = Vec3::splat(size);
            }
            NodePatch::Translation(position) => node.transform.position = position,
            NodePatch::Rotation(q) => node.transform.rotation = q,
            NodePatch::Scale(scale) => node.transform.scale = scale,
            NodePatch::Visible(visible) => node.visible = visible,
            NodePatch::Rename(name) => {
                if name.trim().is_empty() {
                    return Err(VitrineError::Validation(
                        "node name cannot be empty".to_string(),
                    ));
                }
                node.name = name;
            }
        }
        Ok(())
    }
}

fn material_of(node: &SceneNode) -> Result<&Material> {
    node.material.as_ref().ok_or_else(|| no_material(node))
}

fn material_mut(node: &mut SceneNode) -> Result<&mut Material> {
    match node.material.as_mut() {
        Some(material) => Ok(material),
        None => Err(VitrineError::Validation(format!(
            "node '{}' has no material",
            node.name
        ))),
    }
}

fn no_material(node: &SceneNode) -> VitrineError {
    VitrineError::Validation(format!("node '{}' has no material", node.name))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(VitrineError::Validation(format!(
            "{} expects a boolean, got '{}'",
            key, value
        ))),
    }
}

pub(crate) fn parse_f32(key: &str, value: &str) -> Result<f32> {
    value
        .parse::<f32>()
        .map_err(|_| VitrineError::Validation(format!("{} expects a number, got '{}'", key, value)))
}

pub(crate) fn parse_vec3(key: &str, value: &str) -> Result<Vec3> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(VitrineError::Validation(format!(
            "{} expects x,y,z, got '{}'",
            key, value
        )));
    }
    Ok(Vec3::new(
        parse_f32(key, parts[0])?,
        parse_f32(key, parts[1])?,
        parse_f32(key, parts[2])?,
    ))
}
